//! Error types for tool dispatch.

use serde_json::{Value, json};
use thiserror::Error;

/// Result type alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Every way a dispatch can fail.
///
/// Dispatch never panics or propagates these past its boundary without the
/// caller choosing to: [`ToolError::to_payload`] turns each one into the
/// structured `{"error": ...}` object returned to a model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    // ========================================================================
    // Lookup
    // ========================================================================
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Server not found: {server}")]
    ServerNotFound { server: String },

    #[error("Tool not found: {tool} on server {server}")]
    ToolNotOnServer { server: String, tool: String },

    // ========================================================================
    // Validation
    // ========================================================================
    #[error("Missing required parameter(s): {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    // ========================================================================
    // Execution
    // ========================================================================
    /// Rejected by the safety policy; nothing was spawned.
    #[error("{reason}")]
    Blocked { reason: String },

    #[error("{0}")]
    Timeout(String),

    /// The machinery around the tool failed (missing interpreter, I/O).
    #[error("{0}")]
    Engine(String),

    /// The tool itself failed or panicked.
    #[error("Tool execution failed: {0}")]
    Execution(String),
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    pub fn execution(message: impl std::fmt::Display) -> Self {
        Self::Execution(message.to_string())
    }

    pub fn invalid_arguments(message: impl std::fmt::Display) -> Self {
        Self::InvalidArguments(message.to_string())
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Structured error object: `{"error": msg}` plus a `blocked` or
    /// `timeout` flag when one applies.
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Blocked { .. } => json!({ "error": self.to_string(), "blocked": true }),
            Self::Timeout(_) => json!({ "error": self.to_string(), "timeout": true }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        Self::Execution(err.to_string())
    }
}
