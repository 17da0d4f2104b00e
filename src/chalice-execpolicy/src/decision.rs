//! Classification outcome for a single command token.

use serde::{Deserialize, Serialize};

/// Result of classifying a command's leading token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyDecision {
    /// On the allow-list.
    Allowed,
    /// On the deny-list; carries the entry that matched.
    Denied { pattern: String },
    /// On neither list. Permitted only if it resolves on PATH.
    Unknown,
}

impl SafetyDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl std::fmt::Display for SafetyDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allowed => write!(f, "ALLOWED"),
            Self::Denied { pattern } => write!(f, "DENIED ({pattern})"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
