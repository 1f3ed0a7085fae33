use crate::error::{ESResult, JvmError};
use directories::ProjectDirs;
use error_stack::ResultExt;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::LazyLock;

pub static PROJECT_DIRS: LazyLock<ProjectDirs> = LazyLock::new(|| {
    ProjectDirs::from("org", "codejive", "jvm").expect("Could not determine project directories")
});

static CONFIG_PATH: LazyLock<PathBuf> =
    LazyLock::new(|| PROJECT_DIRS.preference_dir().join("config.toml"));

/// Overrides [JvmConfig::install_dir] when set.
const INSTALL_DIR_ENV: &str = "JVM_INSTALL_DIR";

#[derive(Debug, Clone, Deserialize)]
pub struct JvmConfig {
    /// Where managed JDKs are installed. Defaults to a `jdks` directory in the data directory.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
    /// The distributions to use when looking for downloadable JDKs, in priority order. Must be
    /// valid Foojay distributions.
    #[serde(default = "default_distributions")]
    pub distributions: Vec<String>,
    /// Architecture to force when downloading a JDK. If not set, the system's architecture will be
    /// used if it can be mapped.
    #[serde(default)]
    pub forced_architecture: Option<String>,
    /// OS to force when downloading a JDK. If not set, the system's OS will be used if it can be
    /// mapped.
    #[serde(default)]
    pub forced_os: Option<String>,
    /// The libc to request on Linux.
    #[serde(default = "default_libc")]
    pub forced_libc: String,
}

impl JvmConfig {
    pub(super) fn load() -> ESResult<JvmConfig, JvmError> {
        std::fs::create_dir_all(PROJECT_DIRS.preference_dir())
            .change_context(JvmError::Unexpected)
            .attach_with(|| {
                format!(
                    "Could not create config directory at {:?}",
                    PROJECT_DIRS.preference_dir()
                )
            })?;
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&*CONFIG_PATH)
            .change_context(JvmError::Unexpected)
            .attach_with(|| format!("Could not open config file at {:?}", *CONFIG_PATH))?;
        let contents = std::fs::read_to_string(&*CONFIG_PATH)
            .change_context(JvmError::Unexpected)
            .attach_with(|| format!("Could not read config file at {:?}", *CONFIG_PATH))?;
        Self::parse(&contents)
            .change_context(JvmError::Unexpected)
            .attach_with(|| format!("Could not parse config file at {:?}", *CONFIG_PATH))
    }

    pub(crate) fn parse(contents: &str) -> Result<JvmConfig, toml::de::Error> {
        let mut config: JvmConfig = toml::from_str(contents)?;
        if config.distributions.is_empty() {
            config.distributions = default_distributions();
        }
        Ok(config)
    }

    /// The root directory of managed JDK installations.
    pub fn install_dir(&self) -> PathBuf {
        if let Some(dir) = std::env::var_os(INSTALL_DIR_ENV).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        self.install_dir
            .clone()
            .unwrap_or_else(|| PROJECT_DIRS.data_dir().join("jdks"))
    }
}

fn default_distributions() -> Vec<String> {
    vec!["temurin".to_string()]
}

fn default_libc() -> String {
    "glibc".to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = JvmConfig::parse("").unwrap();
        assert_eq!(None, config.install_dir);
        assert_eq!(vec!["temurin".to_string()], config.distributions);
        assert_eq!("glibc", config.forced_libc);
    }

    #[test]
    fn test_parse_config() {
        let config = JvmConfig::parse(
            r#"
            install_dir = "/opt/jdks"
            distributions = ["zulu", "temurin"]
            forced_os = "linux-musl"
            "#,
        )
        .unwrap();
        assert_eq!(Some(PathBuf::from("/opt/jdks")), config.install_dir);
        assert_eq!(
            vec!["zulu".to_string(), "temurin".to_string()],
            config.distributions
        );
        assert_eq!(Some("linux-musl".to_string()), config.forced_os);
        assert_eq!(None, config.forced_architecture);
    }

    #[test]
    fn test_empty_distributions_fall_back() {
        let config = JvmConfig::parse("distributions = []").unwrap();
        assert_eq!(vec!["temurin".to_string()], config.distributions);
    }
}
