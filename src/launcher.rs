//! Running a command with a particular JDK on its environment.

use crate::error::ESResult;
use derive_more::Display;
use error_stack::ResultExt;
use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Exit code reported when the child ended without an exit code, e.g. killed by a signal.
pub const INTERRUPTED_EXIT_CODE: i32 = 254;

const JAVA_HOME: &str = "JAVA_HOME";
const PATH: &str = "PATH";

#[cfg(windows)]
const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_SEPARATOR: &str = ":";

#[derive(Debug, Display)]
#[display("Failed to launch command")]
pub struct LaunchError;

impl Error for LaunchError {}

/// The key in `env` equal to `name` ignoring case, or `name` itself.
pub fn find_key(env: &[(OsString, OsString)], name: &str) -> OsString {
    env.iter()
        .map(|(key, _)| key)
        .find(|key| key.to_string_lossy().eq_ignore_ascii_case(name))
        .cloned()
        .unwrap_or_else(|| OsString::from(name))
}

/// The `JAVA_HOME` and `PATH` entries needed to use the JDK at `jdk_home`, keyed the way `env`
/// already spells them.
pub fn java_env_overrides(jdk_home: &Path, env: &[(OsString, OsString)]) -> [(OsString, OsString); 2] {
    let path_key = find_key(env, PATH);
    let mut path = jdk_home.join("bin").into_os_string();
    if let Some((_, current)) = env.iter().find(|(key, _)| key == &path_key) {
        path.push(PATH_SEPARATOR);
        path.push(current);
    }
    [
        (find_key(env, JAVA_HOME), jdk_home.as_os_str().to_os_string()),
        (path_key, path),
    ]
}

/// A copy of `env` with the [java_env_overrides] applied in place.
pub fn child_environment(jdk_home: &Path, env: Vec<(OsString, OsString)>) -> Vec<(OsString, OsString)> {
    let overrides = java_env_overrides(jdk_home, &env);
    let mut env = env;
    for (key, value) in overrides {
        match env.iter_mut().find(|(k, _)| k == &key) {
            Some(entry) => entry.1 = value,
            None => env.push((key, value)),
        }
    }
    env
}

/// Looks up a bare command name in `bin_dir`. Anything with a path separator is left alone.
pub fn resolve_command(command: &OsStr, bin_dir: &Path) -> Option<PathBuf> {
    let mut components = Path::new(command).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => which::which_in(command, Some(bin_dir), bin_dir).ok(),
        _ => None,
    }
}

/// Runs `command_line` with inherited stdio and `env` as its whole environment, returning its
/// exit code.
pub fn launch(command_line: &[OsString], env: Vec<(OsString, OsString)>) -> ESResult<i32, LaunchError> {
    let Some((program, args)) = command_line.split_first() else {
        return Ok(0);
    };
    debug!("Launching {:?} with arguments {:?}", program, args);
    let mut child = Command::new(program)
        .args(args)
        .env_clear()
        .envs(env)
        .spawn()
        .change_context(LaunchError)
        .attach_with(|| format!("Command: {}", program.to_string_lossy()))?;
    let status = child.wait().change_context(LaunchError)?;
    Ok(status.code().unwrap_or_else(|| {
        debug!("Child did not exit normally: {}", status);
        INTERRUPTED_EXIT_CODE
    }))
}

/// A shell statement that sets `key` to `value`.
pub fn shell_assignment(key: &OsStr, value: &OsStr) -> String {
    let key = key.to_string_lossy();
    let value = value.to_string_lossy();
    if cfg!(windows) {
        format!("set {}={}", key, value)
    } else {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            if matches!(c, '"' | '\\' | '$' | '`') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        format!("export {}=\"{}\"", key, escaped)
    }
}
