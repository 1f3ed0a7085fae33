use crate::command::env::Env;
use crate::command::install::Install;
use crate::command::list_available::ListAvailable;
use crate::command::list_installed::ListInstalled;
use crate::command::list_providers::ListProviders;
use crate::command::reserved::{Link, ManageDefault, Unlink};
use crate::command::run::Run;
use crate::command::uninstall::Uninstall;
use crate::command::{Context, JvmCommand};
use crate::config::JvmConfig;
use crate::error::{ESResult, JvmError, UserMessage};
use crate::jdk_manager::local::LocalJdkManager;
use clap::{Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use owo_colors::{OwoColorize, Stream};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod checksum_verifier;
mod command;
mod config;
mod error;
mod foojay;
mod http_client;
mod java_version;
mod jdk_manager;
mod jvmrc;
mod launcher;
mod progress;
mod release_file_parser;
mod tui;
mod version_spec;

/// Command line tool for installing and managing Java versions.
#[derive(Debug, Parser)]
#[clap(name = "jvm", version)]
struct Jvm {
    /// Only print when an error occurs.
    #[clap(long, global = true)]
    quiet: bool,
    /// Log more, repeat for even more.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[clap(subcommand)]
    command: JvmSubcommand,
}

#[enum_dispatch(JvmCommand)]
#[derive(Debug, Subcommand)]
enum JvmSubcommand {
    #[clap(name = "list", visible_alias = "l")]
    ListInstalled,
    #[clap(name = "list-available", visible_alias = "a")]
    ListAvailable,
    #[clap(name = "list-providers", visible_alias = "P")]
    ListProviders,
    #[clap(visible_alias = "i")]
    Install,
    #[clap(visible_alias = "u")]
    Uninstall,
    #[clap(name = "default", visible_alias = "d")]
    ManageDefault,
    #[clap(visible_alias = "L")]
    Link,
    #[clap(visible_alias = "U")]
    Unlink,
    #[clap(visible_alias = "e")]
    Env,
    #[clap(visible_alias = "r")]
    Run,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let args = Jvm::parse();
    init_tracing(args.verbose);

    let result = JvmConfig::load().and_then(|config| {
        let jdk_manager = Box::new(LocalJdkManager::new(config.clone(), args.quiet));
        args.command.run(Context {
            config,
            jdk_manager,
            quiet: args.quiet,
        })
    });
    match result {
        Ok(code) => std::process::exit(code),
        Err(report) => {
            match report.current_context() {
                JvmError::UserError => {
                    let messages = report
                        .frames()
                        .filter_map(|frame| frame.downcast_ref::<UserMessage>())
                        .collect::<Vec<_>>();
                    if messages.is_empty() {
                        eprintln!("{:?}", report);
                    }
                    for message in messages {
                        eprintln!(
                            "{}",
                            message
                                .message
                                .if_supports_color(Stream::Stderr, |s| s.red())
                        );
                    }
                }
                JvmError::Unexpected => {
                    eprintln!("{:?}", report);
                }
            }
            ExitCode::FAILURE
        }
    }
}
