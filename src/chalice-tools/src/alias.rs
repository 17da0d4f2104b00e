//! Re-exposing a tool under a different name.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::spec::{Tool, ToolArgs, ToolSpec};

/// A tool registered under another name, sharing the inner implementation.
pub struct AliasedTool {
    spec: ToolSpec,
    inner: Arc<dyn Tool>,
}

impl AliasedTool {
    pub fn new(name: impl Into<String>, inner: Arc<dyn Tool>) -> Self {
        let mut spec = inner.spec().clone();
        spec.name = name.into();
        Self { spec, inner }
    }

    /// Replace the description shown for the alias.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = description.into();
        self
    }
}

#[async_trait]
impl Tool for AliasedTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        self.inner.execute(args).await
    }
}
