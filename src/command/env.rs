use crate::command::{get_or_install_jdk, Context, JavaVersionOption, JvmCommand, SUCCESS};
use crate::error::{ESResult, JvmError};
use crate::launcher::{java_env_overrides, shell_assignment};
use clap::Args;
use std::ffi::OsString;

/// Print the required environment variables for a Java installation.
#[derive(Debug, Args)]
pub struct Env {
    #[clap(flatten)]
    java: JavaVersionOption,
}

impl JvmCommand for Env {
    fn run(self, context: Context) -> ESResult<i32, JvmError> {
        let spec = self.java.effective_spec(context.quiet);
        let jdk = get_or_install_jdk(&context, spec.as_ref())?;

        let env = std::env::vars_os().collect::<Vec<(OsString, OsString)>>();
        for (key, value) in java_env_overrides(&jdk.home, &env) {
            println!("{}", shell_assignment(&key, &value));
        }
        Ok(SUCCESS)
    }
}
