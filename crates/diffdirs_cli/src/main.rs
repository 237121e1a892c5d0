//! diffdirs-bootstrap
//!
//! Installs the diffdirs native module: downloads a prebuilt artifact for the
//! running host, or builds it from source when no artifact is available.

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use commands::info::run_info;
use commands::install::run_install;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    // Progress events at trace level (the final "Done") show with --verbose.
    let filter = if cli.verbose {
        EnvFilter::new("debug,diffdirs_bootstrap=trace")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(failed) => {
            if failed {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match &cli.command {
        Commands::Install {
            target,
            download,
            format,
        } => run_install(cli.config.as_deref(), target, *download, *format),
        Commands::Info { target, format } => {
            run_info(cli.config.as_deref(), target, *format)?;
            Ok(false)
        }
    }
}
