//! A named group of related tools.

use std::sync::Arc;

use chalice_tools::Tool;
use indexmap::IndexMap;

use crate::types::{DetailLevel, ServerManifest, ToolDefinitionPayload, ToolSearchResult, ToolSummary};

/// A discovery server: a name, a description and the tools it owns.
///
/// Built once, then handed to a [`crate::DiscoveryClient`]; never mutated
/// after registration.
pub struct DiscoveryServer {
    name: String,
    description: String,
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for DiscoveryServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryServer")
            .field("name", &self.name)
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DiscoveryServer {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tools: IndexMap::new(),
        }
    }

    /// Add a tool, replacing any tool of the same name.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.add_tool(tool);
        self
    }

    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn get_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Tools in insertion order.
    pub fn tools(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn manifest(&self) -> ServerManifest {
        ServerManifest {
            name: self.name.clone(),
            description: self.description.clone(),
            tools: self
                .tools()
                .map(|tool| ToolSummary {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                })
                .collect(),
        }
    }

    pub fn definition(&self, tool: &dyn Tool) -> ToolDefinitionPayload {
        ToolDefinitionPayload {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters().to_value(),
            returns: tool.returns().to_string(),
            server: self.name.clone(),
        }
    }

    /// Tools whose name or description contains `needle` (already lowercased).
    pub(crate) fn search(&self, needle: &str, detail: DetailLevel) -> Vec<ToolSearchResult> {
        self.tools()
            .filter(|tool| {
                tool.name().to_lowercase().contains(needle)
                    || tool.description().to_lowercase().contains(needle)
            })
            .map(|tool| {
                let mut result = ToolSearchResult {
                    server: self.name.clone(),
                    tool: tool.name().to_string(),
                    description: None,
                    parameters: None,
                    returns: None,
                };
                if detail != DetailLevel::NameOnly {
                    result.description = Some(tool.description().to_string());
                }
                if detail == DetailLevel::Full {
                    result.parameters = Some(tool.parameters().to_value());
                    result.returns = Some(tool.returns().to_string());
                }
                result
            })
            .collect()
    }
}
