//! `chalice mcp`: browse and call the discovery servers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chalice_common::{AppDirs, ChaliceConfig};
use chalice_mcp::{DiscoveryClient, Generator};
use chalice_servers::default_client;
use serde_json::json;

use crate::cli::{McpCallArgs, McpCommand, SearchArgs};
use crate::output::{parse_args_json, print_payload};
use crate::tools_cmd::first_line;

pub async fn run(cmd: McpCommand, config: &ChaliceConfig) -> Result<ExitCode> {
    let client = default_client(config);

    match cmd {
        McpCommand::Servers { json } => servers(&client, json),
        McpCommand::Manifest { server } => match client.get_server_manifest(&server) {
            Ok(manifest) => print_payload(&serde_json::to_value(manifest)?),
            Err(err) => print_payload(&err.to_payload()),
        },
        McpCommand::Search(args) => search(&client, args),
        McpCommand::Show { server, tool } => match client.get_tool_definition(&server, &tool) {
            Ok(definition) => print_payload(&serde_json::to_value(definition)?),
            Err(err) => print_payload(&err.to_payload()),
        },
        McpCommand::Call(args) => call(&client, args).await,
        McpCommand::Generate { output } => generate(client, output),
    }
}

fn servers(client: &DiscoveryClient, json: bool) -> Result<ExitCode> {
    let manifests = client.manifests();
    if json {
        let list: Vec<_> = manifests
            .iter()
            .map(|m| {
                json!({
                    "name": m.name,
                    "description": m.description,
                    "tool_count": m.tools.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(ExitCode::SUCCESS);
    }

    let width = manifests.iter().map(|m| m.name.len()).max().unwrap_or(0);
    for manifest in manifests {
        println!(
            "{:<width$}  {:>2} tools  {}",
            manifest.name,
            manifest.tools.len(),
            first_line(&manifest.description)
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn search(client: &DiscoveryClient, args: SearchArgs) -> Result<ExitCode> {
    match client.search_tools(&args.query, args.server.as_deref(), args.detail) {
        Ok(results) => print_payload(&serde_json::to_value(results)?),
        Err(err) => print_payload(&err.to_payload()),
    }
}

async fn call(client: &DiscoveryClient, args: McpCallArgs) -> Result<ExitCode> {
    let arguments = parse_args_json(args.args.as_deref())?;
    let payload = client.call_tool_json(&args.server, &args.tool, arguments).await;
    print_payload(&payload)
}

fn generate(client: std::sync::Arc<DiscoveryClient>, output: Option<PathBuf>) -> Result<ExitCode> {
    let output = match output {
        Some(dir) => dir,
        None => AppDirs::new()
            .map(|dirs| dirs.stubs_dir)
            .context("could not determine home directory; pass --output")?,
    };

    let report = Generator::new(client)
        .generate(&output)
        .with_context(|| format!("failed to generate stubs in {}", output.display()))?;
    println!(
        "Wrote {} files for {} tools on {} servers to {}",
        report.files.len(),
        report.tools,
        report.servers,
        report.output_dir.display()
    );
    Ok(ExitCode::SUCCESS)
}
