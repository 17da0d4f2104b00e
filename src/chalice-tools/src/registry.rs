//! Name-keyed tool registry.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, ToolError};
use crate::invoke::{into_payload, invoke_tool};
use crate::spec::{FunctionTool, Tool, ToolDefinition, args_from_value};
use crate::validation::ValidationMode;

/// Registry of available tools.
///
/// Lookups clone the `Arc` out under a read lock; the lock is never held
/// while a tool executes, so `register`/`unregister` only wait for map
/// updates, never for running tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<IndexMap<String, Arc<dyn Tool>>>,
    mode: ValidationMode,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("mode", &self.mode)
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validation(mode: ValidationMode) -> Self {
        Self {
            tools: RwLock::default(),
            mode,
        }
    }

    /// Register a tool. An existing tool with the same name is replaced.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.write().insert(name.clone(), tool).is_some() {
            debug!(tool = %name, "Replaced registered tool");
        } else {
            debug!(tool = %name, "Registered tool");
        }
    }

    /// Remove a tool, returning it if it was registered.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.write().shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    /// All tools in registration order.
    pub fn list(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.read().values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    /// Plain `{name, description, parameters}` definitions.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list().iter().map(|tool| tool.definition()).collect()
    }

    /// Definitions in the function-calling shape a model API expects.
    pub fn openai_tools(&self) -> Vec<FunctionTool> {
        self.definitions()
            .into_iter()
            .map(ToolDefinition::into_function_tool)
            .collect()
    }

    /// Look up, validate and run a tool.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self.get(name).ok_or_else(|| ToolError::not_found(name))?;
        let args = args_from_value(args)?;
        let result = invoke_tool(tool.as_ref(), args, self.mode).await;
        if let Err(err) = &result {
            warn!(tool = name, error = %err, "Dispatch failed");
        }
        result
    }

    /// [`Self::dispatch`] flattened into a JSON payload. Never fails.
    pub async fn dispatch_json(&self, name: &str, args: Value) -> Value {
        into_payload(self.dispatch(name, args).await)
    }
}
