use crate::command::{Context, JvmCommand, SUCCESS};
use crate::error::{ESResult, JvmError};
use crate::tui::print_table;
use clap::Args;
use error_stack::ResultExt;

/// List the Java versions available for installation.
#[derive(Debug, Args)]
pub struct ListAvailable {}

impl JvmCommand for ListAvailable {
    fn run(self, context: Context) -> ESResult<i32, JvmError> {
        let mut available = context
            .jdk_manager
            .list_available_jdks()
            .change_context(JvmError::Unexpected)
            .attach("Failed to get available JDKs")?;
        available.sort_by(|a, b| b.cmp(a));

        let rows = available
            .into_iter()
            .map(|jdk| {
                vec![
                    jdk.major_version().to_string(),
                    jdk.version.to_string(),
                    jdk.id,
                    jdk.provider,
                ]
            })
            .collect::<Vec<_>>();
        print_table(&["V", "Version", "Id", "Provider"], &rows);

        Ok(SUCCESS)
    }
}
