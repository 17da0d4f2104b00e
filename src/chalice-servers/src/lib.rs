//! Built-in tool servers and the default wiring.
//!
//! | Server | Tools |
//! |--------|-------|
//! | `execution` | python, javascript, bash |
//! | `filesystem` | read_file, write_file, list_directory, create_directory, delete_path, move_path, file_exists |
//! | `git` | status, diff, commit, branch, log, push, pull |
//! | `system` | command, packages, processes |
//! | `api` | http, graphql, webhook |
//!
//! [`default_client`] registers all of them; [`default_registry`] exposes a
//! flat, prefixed subset plus the discovery meta-tools for function calling.

pub mod api;
pub mod execution;
pub mod filesystem;
pub mod git;
mod process;
pub mod system;

use std::sync::Arc;

use chalice_common::ChaliceConfig;
use chalice_exec::{EngineConfig, ExecutionEngine};
use chalice_execpolicy::{PolicyConfig, SafetyPolicy};
use chalice_mcp::{DiscoveryClient, meta_tools};
use chalice_tools::{AliasedTool, ToolRegistry, ValidationMode};
use tracing::{debug, warn};

pub use api::api_server;
pub use execution::{execution_payload, execution_server};
pub use filesystem::filesystem_server;
pub use git::git_server;
pub use process::{ProgramOutput, run_program};
pub use system::system_server;

/// Flat registry names and the server tool each one re-exposes.
pub const FLAT_TOOLS: &[(&str, &str, &str)] = &[
    ("execute_python", execution::SERVER_NAME, "python"),
    ("execute_javascript", execution::SERVER_NAME, "javascript"),
    ("execute_bash", execution::SERVER_NAME, "bash"),
    ("git_status", git::SERVER_NAME, "status"),
    ("git_diff", git::SERVER_NAME, "diff"),
    ("git_commit", git::SERVER_NAME, "commit"),
    ("git_branch", git::SERVER_NAME, "branch"),
    ("git_log", git::SERVER_NAME, "log"),
    ("git_push", git::SERVER_NAME, "push"),
    ("git_pull", git::SERVER_NAME, "pull"),
    ("http_request", api::SERVER_NAME, "http"),
    ("run_command", system::SERVER_NAME, "command"),
];

pub fn validation_mode(config: &ChaliceConfig) -> ValidationMode {
    if config.tools.strict_parameter_types {
        ValidationMode::Strict
    } else {
        ValidationMode::Presence
    }
}

pub fn safety_policy(config: &ChaliceConfig) -> SafetyPolicy {
    SafetyPolicy::with_config(&PolicyConfig {
        deny: config.policy.deny.clone(),
        allow: config.policy.allow.clone(),
        dangerous_patterns: config.policy.dangerous_patterns.clone(),
    })
}

pub fn execution_engine(config: &ChaliceConfig, policy: Arc<SafetyPolicy>) -> ExecutionEngine {
    ExecutionEngine::new(EngineConfig::from(&config.exec), policy)
}

/// A discovery client with every built-in server registered.
pub fn default_client(config: &ChaliceConfig) -> Arc<DiscoveryClient> {
    let policy = Arc::new(safety_policy(config));
    let engine = Arc::new(execution_engine(config, policy.clone()));

    let client = DiscoveryClient::with_validation(validation_mode(config));
    client.register_server(execution_server(engine));
    client.register_server(filesystem_server());
    client.register_server(git_server());
    client.register_server(system_server(policy));
    client.register_server(api_server());
    debug!(servers = ?client.list_servers(), "Built default discovery client");
    Arc::new(client)
}

/// Flat registry over `client`: the [`FLAT_TOOLS`] aliases followed by the
/// discovery meta-tools.
pub fn default_registry(config: &ChaliceConfig, client: &Arc<DiscoveryClient>) -> ToolRegistry {
    let registry = ToolRegistry::with_validation(validation_mode(config));

    for (alias, server, tool) in FLAT_TOOLS {
        let Some(inner) = client
            .get_server(server)
            .and_then(|s| s.get_tool(tool).cloned())
        else {
            warn!(alias, server, tool, "Flat tool target missing, skipping");
            continue;
        };
        registry.register(Arc::new(AliasedTool::new(*alias, inner)));
    }
    for tool in meta_tools(client) {
        registry.register(tool);
    }
    registry
}
