use crate::command::{get_or_install_jdk, Context, JvmCommand, SUCCESS};
use crate::error::{ESResult, JvmError};
use crate::tui::print_table;
use crate::version_spec::VersionSpec;
use clap::Args;
use error_stack::ResultExt;
use std::str::FromStr;

/// Installed when nothing this new is present yet.
const MINIMUM_JAVA_VERSION: &str = "11+";

/// List the installed Java versions.
#[derive(Debug, Args)]
pub struct ListInstalled {}

impl JvmCommand for ListInstalled {
    fn run(self, context: Context) -> ESResult<i32, JvmError> {
        let minimum = VersionSpec::from_str(MINIMUM_JAVA_VERSION)
            .change_context(JvmError::Unexpected)?;
        get_or_install_jdk(&context, Some(&minimum))?;

        let mut installed = context
            .jdk_manager
            .list_installed_jdks()
            .change_context(JvmError::Unexpected)
            .attach("Failed to get installed JDKs")?;
        installed.sort_by(|a, b| b.cmp(a));

        let rows = installed
            .into_iter()
            .map(|jdk| {
                vec![
                    jdk.major_version().to_string(),
                    jdk.version.to_string(),
                    jdk.id,
                    jdk.provider,
                    jdk.home.display().to_string(),
                ]
            })
            .collect::<Vec<_>>();
        print_table(&["V", "Version", "Id", "Provider", "Home"], &rows);

        Ok(SUCCESS)
    }
}
