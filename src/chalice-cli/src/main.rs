//! Chalice CLI - main entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use chalice_cli::cli::{Cli, dispatch_command};
use chalice_cli::logging::{init_logging, resolve_level};
use chalice_common::ChaliceConfig;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ChaliceConfig::load(cli.config.as_deref()).context("failed to load config")?;

    let filter = resolve_level(cli.log_level, cli.verbose, &config.logging.level);
    let _guard = init_logging(&filter, cli.log_file.as_deref())?;
    tracing::debug!(filter = %filter, "Logging initialized");

    dispatch_command(cli, config).await
}
