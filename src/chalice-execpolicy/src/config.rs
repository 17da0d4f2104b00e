//! Policy configuration.

use serde::{Deserialize, Serialize};

/// Additions layered on top of the built-in lists.
///
/// Entries extend the defaults; they never remove a built-in deny entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Extra basenames to deny.
    #[serde(default)]
    pub deny: Vec<String>,

    /// Extra basenames to allow.
    #[serde(default)]
    pub allow: Vec<String>,

    /// Extra substrings that block shell commands.
    #[serde(default)]
    pub dangerous_patterns: Vec<String>,
}
