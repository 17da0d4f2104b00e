//! Discovery payloads.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How much of each tool a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    /// Server and tool name only.
    NameOnly,
    /// Names plus the one-line description.
    #[default]
    NameAndDescription,
    /// Everything, including the parameter schema.
    Full,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameOnly => "name_only",
            Self::NameAndDescription => "name_and_description",
            Self::Full => "full",
        }
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "name" | "name_only" => Ok(Self::NameOnly),
            "summary" | "name_and_description" | "description" => Ok(Self::NameAndDescription),
            "full" => Ok(Self::Full),
            other => Err(format!(
                "unknown detail level '{other}' (expected name_only, name_and_description or full)"
            )),
        }
    }
}

/// One search hit, shaped by the requested [`DetailLevel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSearchResult {
    pub server: String,
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
}

/// Name and description of one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

/// Coarse per-server listing: no parameter schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerManifest {
    pub name: String,
    pub description: String,
    pub tools: Vec<ToolSummary>,
}

/// Full definition of exactly one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinitionPayload {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    pub returns: String,
    pub server: String,
}
