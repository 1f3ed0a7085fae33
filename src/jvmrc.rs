//! Lookup of the effective Java version when none was given on the command line.

use crate::error::ESResult;
use crate::version_spec::{validate_version_or_id, InvalidVersionSpec, VersionSpec};
use derive_more::Display;
use directories::BaseDirs;
use error_stack::{Report, ResultExt};
use itertools::Itertools;
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const JVMRC_FILE_NAME: &str = ".jvmrc";

const JAVA_KEY: &str = "java";

#[derive(Debug, Display)]
#[display("Error reading .jvmrc file")]
pub struct ConfigReadError;

impl Error for ConfigReadError {}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum JvmrcSyntaxError {
    #[error("Line {line}: expected 'key=value', got '{content}'")]
    MissingSeparator { line: usize, content: String },
}

/// Resolves the version to use, from the command line or a `.jvmrc` file in the current
/// directory or the home directory, in that order.
pub fn resolve_effective_spec(
    explicit: Option<&VersionSpec>,
) -> ESResult<Option<VersionSpec>, ConfigReadError> {
    if let Some(explicit) = explicit {
        return Ok(Some(explicit.clone()));
    }
    let cwd = std::env::current_dir()
        .change_context(ConfigReadError)
        .attach("Could not determine the current directory")?;
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    resolve_effective_spec_in(None, &cwd, home.as_deref())
}

pub fn resolve_effective_spec_in(
    explicit: Option<&VersionSpec>,
    cwd: &Path,
    home: Option<&Path>,
) -> ESResult<Option<VersionSpec>, ConfigReadError> {
    if let Some(explicit) = explicit {
        return Ok(Some(explicit.clone()));
    }
    let Some(path) = find_jvmrc(cwd, home) else {
        debug!("No {} file found", JVMRC_FILE_NAME);
        return Ok(None);
    };
    debug!("Reading {}", path.display());
    let contents = std::fs::read_to_string(&path)
        .change_context(ConfigReadError)
        .attach_with(|| format!("Could not read {}", path.display()))?;
    let properties = parse_properties(&contents)
        .change_context(ConfigReadError)
        .attach_with(|| format!("Could not parse {}", path.display()))?;
    properties
        .get(JAVA_KEY)
        .map(|raw| {
            validate_version_or_id(raw)
                .change_context(ConfigReadError)
                .attach_with(|| format!("Invalid '{}' value in {}", JAVA_KEY, path.display()))
        })
        .transpose()
}

/// One-line account of why reading `.jvmrc` failed, outermost cause first.
pub fn describe(report: &Report<ConfigReadError>) -> String {
    report
        .frames()
        .filter_map(|frame| {
            if let Some(s) = frame.downcast_ref::<String>() {
                Some(s.clone())
            } else if let Some(s) = frame.downcast_ref::<&'static str>() {
                Some(s.to_string())
            } else if let Some(e) = frame.downcast_ref::<std::io::Error>() {
                Some(e.to_string())
            } else if let Some(e) = frame.downcast_ref::<JvmrcSyntaxError>() {
                Some(e.to_string())
            } else {
                frame
                    .downcast_ref::<InvalidVersionSpec>()
                    .map(ToString::to_string)
            }
        })
        .join(": ")
}

fn find_jvmrc(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    std::iter::once(cwd)
        .chain(home)
        .map(|dir| dir.join(JVMRC_FILE_NAME))
        .find(|path| path.exists())
}

/// Parses flat `key=value` (or `key: value`) text. `#` and `!` start comment lines.
pub fn parse_properties(contents: &str) -> Result<HashMap<String, String>, JvmrcSyntaxError> {
    let mut properties = HashMap::new();
    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        let Some(sep) = trimmed.find(['=', ':']) else {
            return Err(JvmrcSyntaxError::MissingSeparator {
                line: index + 1,
                content: trimmed.to_string(),
            });
        };
        let (key, value) = trimmed.split_at(sep);
        properties.insert(key.trim_end().to_string(), value[1..].trim().to_string());
    }
    Ok(properties)
}
