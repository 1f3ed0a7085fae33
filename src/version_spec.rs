use derive_more::Display;
use std::str::FromStr;
use thiserror::Error;

/// A validated, normalized Java version requirement.
///
/// The first comma-separated element is one of:
/// - `N+`: major version `N` or newer,
/// - `N`: exactly major version `N`, never auto-updated,
/// - an opaque installation id.
///
/// Elements after the first comma are kept verbatim.
#[derive(Debug, Clone, Display, Eq, PartialEq, Hash)]
#[display("{_0}")]
pub struct VersionSpec(String);

#[derive(Debug, Error, Eq, PartialEq)]
pub enum InvalidVersionSpec {
    #[error(
        "Invalid version '{input}', should be a number optionally followed by a plus sign \
         or preceded by an exclamation mark, or an installation id"
    )]
    Malformed { input: String },
}

/// One element of a [VersionSpec], interpreted for matching.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SpecTerm {
    AtLeast(u32),
    Exact(u32),
    Id(String),
}

impl VersionSpec {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every element, primary first.
    pub fn terms(&self) -> impl Iterator<Item = SpecTerm> + '_ {
        self.0.split(',').map(SpecTerm::from_normalized)
    }
}

impl SpecTerm {
    /// Interprets an already-normalized element. Never fails: anything that is not a version
    /// is an id.
    fn from_normalized(s: &str) -> SpecTerm {
        if let Some(major) = s.strip_suffix('+').and_then(parse_integer) {
            SpecTerm::AtLeast(major)
        } else if let Some(major) = parse_integer(s) {
            SpecTerm::Exact(major)
        } else if let Some(major) = s.strip_prefix('!').and_then(parse_integer) {
            SpecTerm::Exact(major)
        } else {
            SpecTerm::Id(s.to_string())
        }
    }
}

impl FromStr for VersionSpec {
    type Err = InvalidVersionSpec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_version_or_id(s)
    }
}

/// Normalizes a raw version requirement, rejecting anything that is neither a version nor an id.
pub fn validate_version_or_id(raw: &str) -> Result<VersionSpec, InvalidVersionSpec> {
    let mut parts = raw.split(',').map(str::to_string).collect::<Vec<_>>();
    let v = parts[0].as_str();
    let first = if v.strip_suffix('+').is_some_and(is_integer) {
        v.to_string()
    } else if let Some(pinned) = v.strip_prefix('!').filter(|p| is_integer(p)) {
        pinned.to_string()
    } else if is_integer(v) {
        format!("{}+", v)
    } else if parts.len() == 1 && is_id(v) {
        v.to_string()
    } else {
        return Err(InvalidVersionSpec::Malformed {
            input: raw.to_string(),
        });
    };
    parts[0] = first;
    Ok(VersionSpec(parts.join(",")))
}

/// A non-negative decimal literal that fits in an `i32`. Signs are not accepted.
pub fn is_integer(s: &str) -> bool {
    parse_integer(s).is_some()
}

fn parse_integer(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<i32>().ok().map(|i| i as u32)
}

/// Matches `[A-Za-z0-9_.-]+`.
pub fn is_id(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
