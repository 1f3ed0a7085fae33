use std::io::BufRead;
use std::path::Path;
use tracing::debug;

/// Reads `JAVA_VERSION` from the `release` file of the JDK at `home`. `Ok(None)` if the file
/// exists but has no version.
pub(crate) fn read_release_java_version(home: &Path) -> std::io::Result<Option<String>> {
    let file = std::fs::File::open(home.join("release"))?;
    extract_java_version(std::io::BufReader::new(file).lines())
}

pub(crate) fn extract_java_version<E>(
    mut lines: impl Iterator<Item = Result<String, E>>,
) -> Result<Option<String>, E> {
    lines
        .find_map(|line_result| -> Option<Result<String, E>> {
            let line = match line_result {
                Ok(l) => l,
                Err(e) => return Some(Err(e)),
            };
            let (key, value) = line.trim().split_once('=')?;
            if key.trim() != "JAVA_VERSION" {
                return None;
            }
            debug!("Found release line: {}", line);
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some(Ok(value.to_string()))
        })
        .transpose()
}
