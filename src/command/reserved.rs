//! Commands that accept their arguments and change nothing.

use crate::command::{Context, JvmCommand, SUCCESS};
use crate::error::{ESResult, JvmError};
use clap::Args;
use tracing::debug;

/// Manage the default Java version.
#[derive(Debug, Args)]
pub struct ManageDefault {}

/// Link an existing Java installation.
#[derive(Debug, Args)]
pub struct Link {}

/// Unlink a previously linked Java installation.
#[derive(Debug, Args)]
pub struct Unlink {}

macro_rules! reserved_command {
    ($($command:ident),*) => {
        $(
            impl JvmCommand for $command {
                fn run(self, _context: Context) -> ESResult<i32, JvmError> {
                    debug!("'{}' does not change anything yet", stringify!($command));
                    Ok(SUCCESS)
                }
            }
        )*
    };
}

reserved_command!(ManageDefault, Link, Unlink);
