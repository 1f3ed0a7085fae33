use derive_more::Display;
use error_stack::{Report, ResultExt};
use serde::Deserialize;
use std::cmp::Ordering;
use std::error::Error;
use std::str::FromStr;

#[derive(Debug, Display)]
#[display("Invalid Java version")]
pub struct JavaVersionParsingError;

impl Error for JavaVersionParsingError {}

/// A Java version as reported by a `release` file or a package index, either in the old
/// `1.8.0_292-b10` scheme or the JEP 223/322 `17.0.2+8` scheme. Parsing is not strict.
///
/// Comparison ignores optional trailing data such as `-LTS`, and the leading `1.` of the old
/// scheme.
#[derive(Debug, Clone, Display)]
#[display("{text}")]
pub struct JavaVersion {
    /// Version numbers with the old-scheme `1.` removed, so the first is always the major.
    numbers: Vec<u32>,
    pre_release: PreRelease,
    build: Option<u32>,
    text: String,
}

impl JavaVersion {
    pub fn major(&self) -> u32 {
        self.numbers[0]
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        let len = self.numbers.len().max(other.numbers.len());
        let padded = |v: &JavaVersion| {
            (0..len)
                .map(|i| v.numbers.get(i).copied().unwrap_or(0))
                .collect::<Vec<_>>()
        };
        padded(self)
            .cmp(&padded(other))
            .then_with(|| self.pre_release.cmp(&other.pre_release))
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl PartialEq for JavaVersion {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for JavaVersion {}

impl PartialOrd for JavaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JavaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

fn parse_numeric_part(v: &str, name: &str) -> Result<u32, Report<JavaVersionParsingError>> {
    v.parse::<u32>()
        .change_context(JavaVersionParsingError)
        .attach_with(|| format!("Failed to parse {}", name))
        .attach_with(|| format!("value: {}", v))
}

impl FromStr for JavaVersion {
    type Err = Report<JavaVersionParsingError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vnum, extra) = match s.find(['+', '-', '_']) {
            Some(i) => {
                let (v, e) = s.split_at(i);
                (v, Some(e))
            }
            None => (s, None),
        };
        let mut numbers = vnum
            .split('.')
            .map(|p| parse_numeric_part(p, "version number"))
            .collect::<Result<Vec<_>, _>>()
            .attach_with(|| format!("version: {}", s))?;
        if numbers[0] == 0 {
            return Err(Report::new(JavaVersionParsingError)
                .attach(format!("Major version cannot be 0: {}", s)));
        }
        if numbers[0] == 1 && numbers.len() > 1 {
            numbers.remove(0);
        }

        let mut pre_release = PreRelease::None;
        let mut build = None;
        let mut rest = extra.unwrap_or("");
        if let Some(update_and_rest) = rest.strip_prefix('_') {
            // Old scheme: _UPDATE(-bBUILD)?
            let update = up_to(update_and_rest, '-');
            numbers.push(parse_numeric_part(update, "update")?);
            rest = &update_and_rest[update.len()..];
        }
        if let Some(pre_and_rest) = rest.strip_prefix('-') {
            // -PRE(+BUILD)?(-OPT)? or old scheme -bBUILD
            let pre_maybe_build = up_to(pre_and_rest, '-');
            let (pre, maybe_build) = match pre_maybe_build.split_once('+') {
                Some((pre, build)) => (pre, Some(build)),
                None => (pre_maybe_build, None),
            };
            match pre.strip_prefix('b').map(|b| b.parse::<u32>()) {
                Some(Ok(old_build)) => build = Some(old_build),
                _ => pre_release = PreRelease::from_str(pre).expect("never fails"),
            }
            if let Some(b) = maybe_build.filter(|b| !b.is_empty()) {
                build = Some(parse_numeric_part(b, "build")?);
            }
        } else if let Some(build_and_rest) = rest.strip_prefix('+') {
            // +BUILD(-OPT)? or +-OPT
            let b = up_to(build_and_rest, '-');
            if !b.is_empty() {
                build = Some(parse_numeric_part(b, "build")?);
            }
        }

        Ok(JavaVersion {
            numbers,
            pre_release,
            build,
            text: s.to_string(),
        })
    }
}

impl<'de> Deserialize<'de> for JavaVersion {
    fn deserialize<D>(deserializer: D) -> Result<JavaVersion, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Pre-release information. Ordered Other < Numeric < None.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum PreRelease {
    Other(String),
    Numeric(u32),
    None,
}

impl FromStr for PreRelease {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty()
            && s.chars().all(|c| c.is_ascii_digit())
            && (s == "0" || !s.starts_with('0'))
        {
            Ok(s.parse::<u32>()
                .map(PreRelease::Numeric)
                .unwrap_or_else(|_| PreRelease::Other(s.to_string())))
        } else {
            Ok(PreRelease::Other(s.to_string()))
        }
    }
}

/// The part of `s` before the first `delimiter`, or all of it.
fn up_to(s: &str, delimiter: char) -> &str {
    s.split_once(delimiter).map_or(s, |(head, _)| head)
}
