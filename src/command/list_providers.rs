use crate::command::{Context, JvmCommand, SUCCESS};
use crate::error::{ESResult, JvmError};
use crate::tui::print_table;
use clap::Args;

/// List the available JDK providers.
#[derive(Debug, Args)]
pub struct ListProviders {}

impl JvmCommand for ListProviders {
    fn run(self, context: Context) -> ESResult<i32, JvmError> {
        let rows = context
            .jdk_manager
            .list_providers(&context.config.install_dir())
            .into_iter()
            .map(|provider| vec![provider.name, provider.description])
            .collect::<Vec<_>>();
        print_table(&["Provider", "Description"], &rows);
        Ok(SUCCESS)
    }
}
