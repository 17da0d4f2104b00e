//! Discovery exposed as tools, so a model can browse servers progressively
//! from inside an ordinary [`chalice_tools::ToolRegistry`].

use std::sync::Arc;

use async_trait::async_trait;
use chalice_tools::{
    ParameterSchema, PropertySchema, Result, Tool, ToolArgs, ToolError, ToolSpec, parse_args,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::client::DiscoveryClient;
use crate::types::DetailLevel;

/// Lists every server with its one-line description.
pub struct ListServersTool {
    client: Arc<DiscoveryClient>,
    spec: ToolSpec,
}

impl ListServersTool {
    pub fn new(client: Arc<DiscoveryClient>) -> Self {
        let spec = ToolSpec::new(
            "list_mcp_servers",
            "List the available tool servers and what each one is for",
        )
        .with_returns("Array of {name, description, tool_count}");
        Self { client, spec }
    }
}

#[async_trait]
impl Tool for ListServersTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, _args: ToolArgs) -> Result<Value> {
        let servers: Vec<Value> = self
            .client
            .list_servers()
            .iter()
            .filter_map(|name| self.client.get_server(name))
            .map(|server| {
                json!({
                    "name": server.name(),
                    "description": server.description(),
                    "tool_count": server.tool_count(),
                })
            })
            .collect();
        Ok(Value::Array(servers))
    }
}

/// Keyword search across servers.
pub struct SearchToolsTool {
    client: Arc<DiscoveryClient>,
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    server: Option<String>,
    #[serde(default)]
    detail_level: Option<String>,
}

impl SearchToolsTool {
    pub fn new(client: Arc<DiscoveryClient>) -> Self {
        let spec = ToolSpec::new(
            "search_tools",
            "Search available tools by keyword across all servers",
        )
        .with_parameters(
            ParameterSchema::object()
                .property(
                    "query",
                    PropertySchema::string()
                        .description("Case-insensitive text matched against tool names and descriptions"),
                )
                .property(
                    "server",
                    PropertySchema::string().description("Restrict the search to one server"),
                )
                .property(
                    "detail_level",
                    PropertySchema::string()
                        .description("How much to return per tool")
                        .enum_values(vec!["name_only", "name_and_description", "full"])
                        .default_value(json!("name_and_description")),
                )
                .required(vec!["query"]),
        )
        .with_returns("Array of matching tools");
        Self { client, spec }
    }
}

#[async_trait]
impl Tool for SearchToolsTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: SearchArgs = parse_args(args)?;
        let detail = match args.detail_level.as_deref() {
            Some(level) => level.parse::<DetailLevel>().map_err(ToolError::InvalidArguments)?,
            None => DetailLevel::default(),
        };
        let results = self
            .client
            .search_tools(&args.query, args.server.as_deref(), detail)?;
        Ok(serde_json::to_value(results)?)
    }
}

/// Full schema of one tool, loaded only once a caller needs it.
pub struct GetToolDefinitionTool {
    client: Arc<DiscoveryClient>,
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct DefinitionArgs {
    server: String,
    tool: String,
}

impl GetToolDefinitionTool {
    pub fn new(client: Arc<DiscoveryClient>) -> Self {
        let spec = ToolSpec::new(
            "get_tool_definition",
            "Get the full parameter schema of one tool",
        )
        .with_parameters(
            ParameterSchema::object()
                .property("server", PropertySchema::string().description("Server name"))
                .property("tool", PropertySchema::string().description("Tool name"))
                .required(vec!["server", "tool"]),
        )
        .with_returns("{name, description, parameters, returns, server}");
        Self { client, spec }
    }
}

#[async_trait]
impl Tool for GetToolDefinitionTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: DefinitionArgs = parse_args(args)?;
        let definition = self.client.get_tool_definition(&args.server, &args.tool)?;
        Ok(serde_json::to_value(definition)?)
    }
}

/// Runs a tool on a named server.
///
/// Failures of the inner call come back as the error payload rather than an
/// `Err`, so the model sees exactly what the server reported.
pub struct CallToolTool {
    client: Arc<DiscoveryClient>,
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct CallArgs {
    server: String,
    tool: String,
    #[serde(default)]
    arguments: Value,
}

impl CallToolTool {
    pub fn new(client: Arc<DiscoveryClient>) -> Self {
        let spec = ToolSpec::new("call_mcp_tool", "Call a tool on a specific server")
            .with_parameters(
                ParameterSchema::object()
                    .property("server", PropertySchema::string().description("Server name"))
                    .property("tool", PropertySchema::string().description("Tool name"))
                    .property(
                        "arguments",
                        PropertySchema::object().description("Arguments for the tool"),
                    )
                    .required(vec!["server", "tool"]),
            );
        Self { client, spec }
    }
}

#[async_trait]
impl Tool for CallToolTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: CallArgs = parse_args(args)?;
        Ok(self
            .client
            .call_tool_json(&args.server, &args.tool, args.arguments)
            .await)
    }
}

/// All discovery meta-tools bound to `client`.
pub fn meta_tools(client: &Arc<DiscoveryClient>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListServersTool::new(client.clone())),
        Arc::new(SearchToolsTool::new(client.clone())),
        Arc::new(GetToolDefinitionTool::new(client.clone())),
        Arc::new(CallToolTool::new(client.clone())),
    ]
}
