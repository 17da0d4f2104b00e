//! The discovery client: the single entry point over every server.

use std::sync::Arc;

use chalice_tools::{ToolError, ValidationMode, args_from_value, into_payload, invoke_tool};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::server::DiscoveryServer;
use crate::types::{DetailLevel, ServerManifest, ToolDefinitionPayload, ToolSearchResult};

/// Owns the discovery servers for the life of the process.
///
/// Servers are looked up under a read lock and the `Arc` is cloned out, so
/// registration never waits on a running tool.
#[derive(Default)]
pub struct DiscoveryClient {
    servers: RwLock<IndexMap<String, Arc<DiscoveryServer>>>,
    mode: ValidationMode,
}

impl std::fmt::Debug for DiscoveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryClient")
            .field("servers", &self.list_servers())
            .field("mode", &self.mode)
            .finish()
    }
}

impl DiscoveryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validation(mode: ValidationMode) -> Self {
        Self {
            servers: RwLock::default(),
            mode,
        }
    }

    /// Register a server. Last write wins.
    pub fn register_server(&self, server: DiscoveryServer) {
        let name = server.name().to_string();
        let tools = server.tool_count();
        if self
            .servers
            .write()
            .insert(name.clone(), Arc::new(server))
            .is_some()
        {
            info!(server = %name, tools, "Replaced discovery server");
        } else {
            debug!(server = %name, tools, "Registered discovery server");
        }
    }

    pub fn unregister_server(&self, name: &str) -> Option<Arc<DiscoveryServer>> {
        self.servers.write().shift_remove(name)
    }

    pub fn get_server(&self, name: &str) -> Option<Arc<DiscoveryServer>> {
        self.servers.read().get(name).cloned()
    }

    /// Server names in registration order.
    pub fn list_servers(&self) -> Vec<String> {
        self.servers.read().keys().cloned().collect()
    }

    fn snapshot(&self) -> Vec<Arc<DiscoveryServer>> {
        self.servers.read().values().cloned().collect()
    }

    fn require_server(&self, name: &str) -> Result<Arc<DiscoveryServer>, ToolError> {
        self.get_server(name)
            .ok_or_else(|| ToolError::ServerNotFound {
                server: name.to_string(),
            })
    }

    /// Resolve `server`, then `tool`, validate and run it.
    pub async fn call_tool(&self, server: &str, tool: &str, args: Value) -> Result<Value, ToolError> {
        let target = self.require_server(server)?;
        let Some(handle) = target.get_tool(tool).cloned() else {
            return Err(ToolError::ToolNotOnServer {
                server: server.to_string(),
                tool: tool.to_string(),
            });
        };
        let args = args_from_value(args)?;

        let result = invoke_tool(handle.as_ref(), args, self.mode).await;
        if let Err(err) = &result {
            warn!(server, tool, error = %err, "Discovery call failed");
        }
        result
    }

    /// [`Self::call_tool`] flattened into a JSON payload. Never fails.
    pub async fn call_tool_json(&self, server: &str, tool: &str, args: Value) -> Value {
        into_payload(self.call_tool(server, tool, args).await)
    }

    /// Case-insensitive substring search over tool names and descriptions.
    ///
    /// Results follow server then tool insertion order. An unknown `server`
    /// filter is an error rather than an empty result.
    pub fn search_tools(
        &self,
        query: &str,
        server: Option<&str>,
        detail: DetailLevel,
    ) -> Result<Vec<ToolSearchResult>, ToolError> {
        let needle = query.to_lowercase();
        let servers = match server {
            Some(name) => vec![self.require_server(name)?],
            None => self.snapshot(),
        };

        let results: Vec<ToolSearchResult> = servers
            .iter()
            .flat_map(|server| server.search(&needle, detail))
            .collect();
        debug!(query, ?server, hits = results.len(), "Searched tools");
        Ok(results)
    }

    pub fn get_server_manifest(&self, server: &str) -> Result<ServerManifest, ToolError> {
        Ok(self.require_server(server)?.manifest())
    }

    /// Every server's manifest, in registration order.
    pub fn manifests(&self) -> Vec<ServerManifest> {
        self.snapshot().iter().map(|s| s.manifest()).collect()
    }

    pub fn get_tool_definition(
        &self,
        server: &str,
        tool: &str,
    ) -> Result<ToolDefinitionPayload, ToolError> {
        let target = self.require_server(server)?;
        let handle = target
            .get_tool(tool)
            .ok_or_else(|| ToolError::ToolNotOnServer {
                server: server.to_string(),
                tool: tool.to_string(),
            })?;
        Ok(target.definition(handle.as_ref()))
    }
}
