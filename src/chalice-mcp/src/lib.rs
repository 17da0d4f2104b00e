//! Progressive tool discovery.
//!
//! Tools are grouped into named [`DiscoveryServer`]s held by a
//! [`DiscoveryClient`]. A caller working under a context budget reads cheap
//! payloads first and fetches full schemas only for the tools it will use:
//!
//! ```text
//! list_servers ─▶ get_server_manifest ─▶ get_tool_definition ─▶ call_tool
//!                 search_tools(query, detail) ──────┘
//! ```
//!
//! [`Generator`] writes the same tree to disk as JSON stubs.

// ============================================================================
// Modules
// ============================================================================

mod client;
mod generator;
mod meta;
mod server;
mod types;


// ============================================================================
// Re-exports
// ============================================================================

pub use client::DiscoveryClient;
pub use generator::{GenerateError, GenerateReport, Generator};
pub use meta::{CallToolTool, GetToolDefinitionTool, ListServersTool, SearchToolsTool, meta_tools};
pub use server::DiscoveryServer;
pub use types::{DetailLevel, ServerManifest, ToolDefinitionPayload, ToolSearchResult, ToolSummary};
