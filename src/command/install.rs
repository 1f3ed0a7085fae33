use crate::command::{spec_label, Context, JavaVersionParam, JvmCommand, SUCCESS};
use crate::error::{ESResult, JvmError};
use crate::jdk_manager::JdkPredicate;
use crate::tui::jdk_color;
use clap::Args;
use error_stack::ResultExt;
use owo_colors::{OwoColorize, Stream};

/// A matching JDK is already installed and `--force` was not given.
pub const ALREADY_INSTALLED: i32 = 1;
/// Nothing matching can be installed.
pub const NOT_AVAILABLE: i32 = 2;

/// Install a Java JDK.
#[derive(Debug, Args)]
pub struct Install {
    /// Force installation even when already installed.
    #[clap(short, long)]
    force: bool,
    #[clap(flatten)]
    version: JavaVersionParam,
}

impl JvmCommand for Install {
    fn run(self, context: Context) -> ESResult<i32, JvmError> {
        let spec = self.version.effective_spec(context.quiet);
        let spec_text = spec_label(spec.as_ref());
        let manager = &context.jdk_manager;

        let installed = manager
            .get_installed_jdk(spec.as_ref(), JdkPredicate::CanUpdate)
            .change_context(JvmError::Unexpected)
            .attach("Failed to get installed JDKs")?;
        let jdk = match installed {
            Some(jdk) if !self.force => {
                if !context.quiet {
                    eprintln!(
                        "Java version is already installed: {}",
                        jdk.if_supports_color(Stream::Stderr, |s| s.color(jdk_color()))
                    );
                    eprintln!("Use --force to install anyway");
                }
                return Ok(ALREADY_INSTALLED);
            }
            Some(jdk) => jdk,
            None => {
                let available = manager
                    .get_jdk(spec.as_ref(), JdkPredicate::CanUpdate)
                    .change_context(JvmError::Unexpected)
                    .attach("Failed to get available JDKs")?;
                let Some(jdk) = available else {
                    if !context.quiet {
                        eprintln!(
                            "Java version is not available for installation: {}",
                            spec_text
                        );
                    }
                    return Ok(NOT_AVAILABLE);
                };
                jdk
            }
        };

        manager
            .install(&jdk)
            .change_context(JvmError::Unexpected)
            .attach_with(|| format!("Failed to install {}", jdk))?;
        if !context.quiet {
            eprintln!(
                "{}",
                installed_message(spec_text)
                    .if_supports_color(Stream::Stderr, |s| s.color(jdk_color()))
            );
        }
        Ok(SUCCESS)
    }
}

fn installed_message(spec_text: &str) -> String {
    format!("Successfully installed Java version {}", spec_text)
}
