//! Command dispatch.

use std::process::ExitCode;

use anyhow::Result;
use chalice_common::ChaliceConfig;

use super::args::*;
use crate::{exec_cmd, mcp_cmd, policy_cmd, tools_cmd};

/// Route a parsed command line to its handler.
pub async fn dispatch_command(cli: Cli, config: ChaliceConfig) -> Result<ExitCode> {
    match cli.command {
        Commands::Tools(cmd) => tools_cmd::run(cmd, &config).await,
        Commands::Mcp(cmd) => mcp_cmd::run(cmd, &config).await,
        Commands::Exec(args) => exec_cmd::run(args, &config).await,
        Commands::Policy(cmd) => policy_cmd::run(cmd, &config),
    }
}
