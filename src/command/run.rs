use crate::command::{get_or_install_jdk, Context, JavaVersionOption, JvmCommand, SUCCESS};
use crate::error::{ESResult, JvmError};
use crate::launcher::{child_environment, launch, resolve_command};
use clap::Args;
use error_stack::ResultExt;
use std::ffi::OsString;
use tracing::debug;

/// Run a command making sure the correct Java version is used.
#[derive(Debug, Args)]
pub struct Run {
    #[clap(flatten)]
    java: JavaVersionOption,
    /// Command to run, followed by its arguments.
    #[clap(
        value_name = "command",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<OsString>,
}

impl JvmCommand for Run {
    fn run(self, context: Context) -> ESResult<i32, JvmError> {
        let mut command_line = self.command;
        if command_line.is_empty() {
            return Ok(SUCCESS);
        }
        let spec = self.java.effective_spec(context.quiet);
        let jdk = get_or_install_jdk(&context, spec.as_ref())?;

        if let Some(resolved) = resolve_command(&command_line[0], &jdk.bin_dir()) {
            debug!("Using {} from {}", resolved.display(), jdk);
            command_line[0] = resolved.into_os_string();
        }
        let env = child_environment(&jdk.home, std::env::vars_os().collect());
        launch(&command_line, env)
            .change_context(JvmError::Unexpected)
            .attach_with(|| format!("Failed to run {}", command_line[0].to_string_lossy()))
    }
}
