//! Discovery, installation and removal of JDKs.
//!
//! Commands only talk to the [JdkManager] trait; [local::LocalJdkManager] is the implementation
//! used by the binary.

pub mod local;

#[cfg(test)]
pub mod fake;

use crate::error::ESResult;
use crate::java_version::JavaVersion;
use crate::version_spec::{SpecTerm, VersionSpec};
use derive_more::Display;
use error_stack::Report;
use std::cmp::Ordering;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The version installed when nothing was requested and nothing is installed yet.
pub const DEFAULT_JAVA_VERSION: &str = "21+";

#[derive(Debug, Display)]
pub enum JdkManagerError {
    #[display("Failed to discover JDKs")]
    Discovery,
    #[display("Failed to install JDK")]
    Install,
    #[display("Failed to uninstall JDK")]
    Uninstall,
    #[display("No matching JDK is available for installation")]
    NotAvailable,
}

impl Error for JdkManagerError {}

/// A JDK, either installed or available for installation.
#[derive(Debug, Clone, Display, Eq, PartialEq)]
#[display("{id} ({version}, {provider})")]
pub struct Jdk {
    pub version: JavaVersion,
    pub id: String,
    pub provider: String,
    pub home: PathBuf,
}

impl Jdk {
    pub fn major_version(&self) -> u32 {
        self.version.major()
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }

    fn matches(&self, term: &SpecTerm) -> bool {
        match term {
            SpecTerm::AtLeast(major) => self.major_version() >= *major,
            SpecTerm::Exact(major) => self.major_version() == *major,
            SpecTerm::Id(id) => &self.id == id,
        }
    }
}

impl PartialOrd for Jdk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Jdk {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.provider.cmp(&other.provider))
            .then_with(|| self.home.cmp(&other.home))
    }
}

/// A source of JDKs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Provider {
    pub name: String,
    pub description: String,
}

/// Restricts which providers' JDKs a lookup may return.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JdkPredicate {
    All,
    /// Only JDKs this tool installed itself, and may therefore replace with a newer build.
    CanUpdate,
}

pub trait JdkManager {
    /// Every installed JDK, in no particular order.
    fn list_installed_jdks(&self) -> ESResult<Vec<Jdk>, JdkManagerError>;

    /// Every JDK that can be installed, in no particular order.
    fn list_available_jdks(&self) -> ESResult<Vec<Jdk>, JdkManagerError>;

    fn list_providers(&self, install_root: &Path) -> Vec<Provider>;

    /// Installs (or re-installs the latest build of) `jdk`, returning the installed JDK.
    fn install(&self, jdk: &Jdk) -> ESResult<Jdk, JdkManagerError>;

    fn uninstall_jdk(&self, jdk: &Jdk) -> ESResult<(), JdkManagerError>;

    fn can_update(&self, jdk: &Jdk) -> bool;

    fn get_installed_jdk(
        &self,
        spec: Option<&VersionSpec>,
        predicate: JdkPredicate,
    ) -> ESResult<Option<Jdk>, JdkManagerError> {
        let installed = self.list_installed_jdks()?;
        Ok(select_jdk(self.filter(installed, predicate), spec))
    }

    fn get_jdk(
        &self,
        spec: Option<&VersionSpec>,
        predicate: JdkPredicate,
    ) -> ESResult<Option<Jdk>, JdkManagerError> {
        let available = self.list_available_jdks()?;
        Ok(select_jdk(self.filter(available, predicate), spec))
    }

    fn get_or_install_jdk(&self, spec: Option<&VersionSpec>) -> ESResult<Jdk, JdkManagerError> {
        if let Some(jdk) = self.get_installed_jdk(spec, JdkPredicate::All)? {
            return Ok(jdk);
        }
        let default_spec;
        let spec = match spec {
            Some(spec) => spec,
            None => {
                default_spec =
                    VersionSpec::from_str(DEFAULT_JAVA_VERSION).expect("default is valid");
                &default_spec
            }
        };
        let Some(available) = self.get_jdk(Some(spec), JdkPredicate::CanUpdate)? else {
            return Err(Report::new(JdkManagerError::NotAvailable)
                .attach(format!("Requested version: {}", spec)));
        };
        self.install(&available)
    }

    fn filter(&self, jdks: Vec<Jdk>, predicate: JdkPredicate) -> Vec<Jdk> {
        match predicate {
            JdkPredicate::All => jdks,
            JdkPredicate::CanUpdate => jdks.into_iter().filter(|j| self.can_update(j)).collect(),
        }
    }
}

/// Picks the JDK `spec` asks for. Each comma-separated element is tried in turn; within one
/// element the lowest matching major wins, then the newest build. Without a spec the newest JDK
/// wins.
pub fn select_jdk(jdks: Vec<Jdk>, spec: Option<&VersionSpec>) -> Option<Jdk> {
    let Some(spec) = spec else {
        return jdks.into_iter().max();
    };
    spec.terms().find_map(|term| {
        jdks.iter()
            .filter(|jdk| jdk.matches(&term))
            .min_by(|a, b| {
                a.major_version()
                    .cmp(&b.major_version())
                    .then_with(|| b.cmp(a))
            })
            .cloned()
    })
}

#[cfg(test)]
pub(crate) fn test_jdk(version: &str, id: &str, provider: &str) -> Jdk {
    Jdk {
        version: version.parse().unwrap(),
        id: id.to_string(),
        provider: provider.to_string(),
        home: PathBuf::from("/jdks").join(id),
    }
}
