//! End-to-end checks of command dispatch.

use chalice_cli::{Cli, dispatch_command};
use chalice_common::ChaliceConfig;
use clap::Parser;

#[tokio::test]
async fn test_mcp_generate_writes_tree() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("stubs");
    let cli = Cli::try_parse_from([
        "chalice",
        "mcp",
        "generate",
        "--output",
        out.to_str().unwrap(),
    ])
    .unwrap();

    dispatch_command(cli, ChaliceConfig::default()).await.unwrap();

    assert!(out.join("README.md").is_file());
    assert!(out.join("index.json").is_file());
    assert!(out.join("git").join("commit.json").is_file());
    assert!(out.join("execution").join("index.json").is_file());
}

#[tokio::test]
async fn test_tools_call_bad_args_json_is_an_error() {
    let cli = Cli::try_parse_from([
        "chalice",
        "tools",
        "call",
        "git_status",
        "--args",
        "not json",
    ])
    .unwrap();

    let err = dispatch_command(cli, ChaliceConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("--args is not valid JSON"));
}

#[tokio::test]
async fn test_exec_requires_source() {
    let cli = Cli::try_parse_from(["chalice", "exec", "python"]).unwrap();
    let err = dispatch_command(cli, ChaliceConfig::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no source given"));
}
