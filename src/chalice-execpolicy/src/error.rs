//! Error types for the safety policy.

use thiserror::Error;

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Leading token is on the deny-list.
    #[error("Command '{command}' is blacklisted for safety")]
    Denied { command: String, pattern: String },

    /// Full command string contains a catastrophic pattern.
    #[error("Dangerous command blocked for safety")]
    Dangerous { pattern: String },

    /// Not on either list and not resolvable on PATH.
    #[error("Command not found: {command}")]
    NotFound { command: String },

    /// Invalid command format
    #[error("invalid command format: {0}")]
    InvalidCommand(String),
}

impl PolicyError {
    /// Whether this is a safety rejection (as opposed to a missing program).
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Denied { .. } | Self::Dangerous { .. })
    }

    /// The deny-list entry or substring that matched, if any.
    pub fn matched_pattern(&self) -> Option<&str> {
        match self {
            Self::Denied { pattern, .. } | Self::Dangerous { pattern } => Some(pattern),
            _ => None,
        }
    }
}
