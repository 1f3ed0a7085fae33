use crate::command::{spec_label, Context, JvmCommand, SUCCESS};
use crate::error::{ESResult, JvmError};
use crate::jdk_manager::JdkPredicate;
use crate::tui::jdk_color;
use crate::version_spec::VersionSpec;
use clap::Args;
use error_stack::ResultExt;
use owo_colors::{OwoColorize, Stream};

pub const NOT_INSTALLED: i32 = 1;

/// Uninstall a Java JDK.
#[derive(Debug, Args)]
pub struct Uninstall {
    /// Java version to uninstall. `.jvmrc` files are not consulted.
    #[clap(value_name = "version")]
    version: Option<VersionSpec>,
}

impl JvmCommand for Uninstall {
    fn run(self, context: Context) -> ESResult<i32, JvmError> {
        let spec_text = spec_label(self.version.as_ref());
        let installed = context
            .jdk_manager
            .get_installed_jdk(self.version.as_ref(), JdkPredicate::CanUpdate)
            .change_context(JvmError::Unexpected)
            .attach("Failed to get installed JDKs")?;
        let Some(jdk) = installed else {
            // Printed even when quiet.
            eprintln!("Java version not installed: {}", spec_text);
            return Ok(NOT_INSTALLED);
        };

        context
            .jdk_manager
            .uninstall_jdk(&jdk)
            .change_context(JvmError::Unexpected)
            .attach_with(|| format!("Failed to uninstall {}", jdk))?;
        if !context.quiet {
            eprintln!(
                "Successfully uninstalled Java version {}",
                spec_text.if_supports_color(Stream::Stderr, |s| s.color(jdk_color()))
            );
        }
        Ok(SUCCESS)
    }
}
