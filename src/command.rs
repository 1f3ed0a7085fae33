use crate::config::JvmConfig;
use crate::error::{ESResult, JvmError, UserMessage};
use crate::jdk_manager::{Jdk, JdkManager, JdkManagerError};
use crate::jvmrc::{describe, resolve_effective_spec};
use crate::version_spec::VersionSpec;
use clap::Args;
use enum_dispatch::enum_dispatch;
use error_stack::ResultExt;

pub(super) mod env;
pub(super) mod install;
pub(super) mod list_available;
pub(super) mod list_installed;
pub(super) mod list_providers;
pub(super) mod reserved;
pub(super) mod run;
pub(super) mod uninstall;

/// Exit code of a command that did what was asked.
pub const SUCCESS: i32 = 0;

#[enum_dispatch]
pub trait JvmCommand {
    /// Runs the command, returning the process exit code.
    fn run(self, context: Context) -> ESResult<i32, JvmError>;
}

pub struct Context {
    pub config: JvmConfig,
    pub jdk_manager: Box<dyn JdkManager>,
    /// Only errors are printed.
    pub quiet: bool,
}

/// Java version given as an optional positional argument.
#[derive(Debug, Args)]
pub struct JavaVersionParam {
    /// Java version to use.
    #[clap(value_name = "version")]
    version: Option<VersionSpec>,
}

impl JavaVersionParam {
    pub fn effective_spec(&self, quiet: bool) -> Option<VersionSpec> {
        effective_spec(self.version.as_ref(), quiet)
    }
}

/// Java version given with `-j`.
#[derive(Debug, Args)]
pub struct JavaVersionOption {
    /// Java version to use.
    #[clap(short, long = "java", value_name = "version")]
    java: Option<VersionSpec>,
}

impl JavaVersionOption {
    pub fn effective_spec(&self, quiet: bool) -> Option<VersionSpec> {
        effective_spec(self.java.as_ref(), quiet)
    }
}

/// The version given on the command line, else the one from `.jvmrc`. A broken `.jvmrc` is
/// reported (unless quiet) and treated as absent.
pub fn effective_spec(explicit: Option<&VersionSpec>, quiet: bool) -> Option<VersionSpec> {
    match resolve_effective_spec(explicit) {
        Ok(spec) => spec,
        Err(report) => {
            if !quiet {
                eprintln!("Error reading .jvmrc file: {}", describe(&report));
            }
            tracing::debug!("{:?}", report);
            None
        }
    }
}

/// `spec` for messages.
pub fn spec_label(spec: Option<&VersionSpec>) -> &str {
    spec.map_or("<default>", VersionSpec::as_str)
}

/// Finds the JDK for `spec`, installing it when needed.
pub fn get_or_install_jdk(context: &Context, spec: Option<&VersionSpec>) -> ESResult<Jdk, JvmError> {
    context
        .jdk_manager
        .get_or_install_jdk(spec)
        .map_err(|report| {
            if matches!(report.current_context(), JdkManagerError::NotAvailable) {
                let message = format!(
                    "No Java version matching {} is installed or available for installation",
                    spec_label(spec)
                );
                report
                    .change_context(JvmError::UserError)
                    .attach_opaque(UserMessage { message })
            } else {
                report.change_context(JvmError::Unexpected)
            }
        })
        .attach("Failed to find or install a JDK")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Context;
    use crate::config::JvmConfig;
    use crate::jdk_manager::fake::FakeJdkManager;

    pub fn context(fake: &FakeJdkManager) -> Context {
        Context {
            config: JvmConfig::parse("").unwrap(),
            jdk_manager: Box::new(fake.clone()),
            quiet: true,
        }
    }
}
