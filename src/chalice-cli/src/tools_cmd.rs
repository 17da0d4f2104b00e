//! `chalice tools`: the flat tool registry.

use std::process::ExitCode;

use anyhow::Result;
use chalice_common::ChaliceConfig;
use chalice_servers::{default_client, default_registry};
use chalice_tools::ToolRegistry;

use crate::cli::{CallArgs, ToolsCommand};
use crate::output::{parse_args_json, print_payload};

pub async fn run(cmd: ToolsCommand, config: &ChaliceConfig) -> Result<ExitCode> {
    let client = default_client(config);
    let registry = default_registry(config, &client);

    match cmd {
        ToolsCommand::List { json } => list(&registry, json),
        ToolsCommand::Schema => {
            println!("{}", serde_json::to_string_pretty(&registry.openai_tools())?);
            Ok(ExitCode::SUCCESS)
        }
        ToolsCommand::Call(args) => call(&registry, args).await,
    }
}

fn list(registry: &ToolRegistry, json: bool) -> Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
        return Ok(ExitCode::SUCCESS);
    }

    let tools = registry.list();
    let width = tools.iter().map(|t| t.name().len()).max().unwrap_or(0);
    for tool in tools {
        println!("{:<width$}  {}", tool.name(), first_line(tool.description()));
    }
    Ok(ExitCode::SUCCESS)
}

async fn call(registry: &ToolRegistry, args: CallArgs) -> Result<ExitCode> {
    let arguments = parse_args_json(args.args.as_deref())?;
    let payload = registry.dispatch_json(&args.name, arguments).await;
    print_payload(&payload)
}

pub(crate) fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
