//! `api` server: HTTP, GraphQL and webhook calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chalice_common::CapturedOutput;
use chalice_common::timeout::{DEFAULT_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS};
use chalice_mcp::DiscoveryServer;
use chalice_tools::{
    ParameterSchema, PropertySchema, Result, Tool, ToolArgs, ToolError, ToolSpec, parse_args,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, redirect};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

pub const SERVER_NAME: &str = "api";

fn clamp_http_timeout(requested: Option<u64>) -> u64 {
    requested
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
        .clamp(1, MAX_HTTP_TIMEOUT_SECS)
}

fn build_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client> {
    let policy = if follow_redirects {
        redirect::Policy::limited(10)
    } else {
        redirect::Policy::none()
    };
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(policy)
        .build()
        .map_err(|e| ToolError::Engine(format!("Failed to create HTTP client: {e}")))
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ToolError::invalid_arguments(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ToolError::invalid_arguments(format!("invalid header value for {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ToolError::invalid_arguments(format!("invalid HTTP method: {method}")))
}

fn request_error(err: reqwest::Error, timeout_secs: u64) -> ToolError {
    if err.is_timeout() {
        ToolError::Timeout(format!("Request timed out after {timeout_secs} seconds"))
    } else if err.is_connect() {
        ToolError::Engine(format!("Connection error: {err}"))
    } else if err.is_builder() {
        ToolError::invalid_arguments(err)
    } else {
        ToolError::execution(err)
    }
}

/// Response body as text, capped like guest output.
async fn read_body(mut response: Response, timeout_secs: u64) -> Result<String> {
    let mut body = CapturedOutput::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| request_error(e, timeout_secs))?
    {
        body.push(&chunk);
    }
    Ok(body.to_text())
}

fn headers_property(description: &str) -> PropertySchema {
    PropertySchema::object().description(description)
}

// ============================================================================
// http
// ============================================================================

pub struct HttpTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct HttpArgs {
    url: String,
    #[serde(default = "default_get")]
    method: String,
    #[serde(default)]
    headers: HashMap<String, String>,
    body: Option<String>,
    #[serde(default)]
    params: HashMap<String, String>,
    timeout: Option<u64>,
    #[serde(default = "default_true")]
    follow_redirects: bool,
}

fn default_get() -> String {
    "GET".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for HttpTool {
    fn default() -> Self {
        let spec = ToolSpec::new(
            "http",
            "Make HTTP requests (GET, POST, PUT, DELETE, PATCH) to external APIs",
        )
        .with_parameters(
            ParameterSchema::object()
                .property("url", PropertySchema::string().description("URL to request"))
                .property(
                    "method",
                    PropertySchema::string()
                        .description("HTTP method")
                        .enum_values(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD"])
                        .default_value("GET"),
                )
                .property("headers", headers_property("HTTP headers as key-value pairs"))
                .property(
                    "body",
                    PropertySchema::string()
                        .description("Request body (JSON string or plain text)"),
                )
                .property(
                    "params",
                    PropertySchema::object().description("URL query parameters as key-value pairs"),
                )
                .property(
                    "timeout",
                    PropertySchema::integer()
                        .description("Request timeout in seconds (default: 30, max: 120)")
                        .default_value(DEFAULT_HTTP_TIMEOUT_SECS),
                )
                .property(
                    "follow_redirects",
                    PropertySchema::boolean()
                        .description("Follow redirects (default: true)")
                        .default_value(true),
                )
                .required(vec!["url"]),
        )
        .with_returns("{status_code, headers, body, json, success, url, elapsed_ms}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for HttpTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: HttpArgs = parse_args(args)?;
        let timeout = clamp_http_timeout(args.timeout);
        let client = build_client(timeout, args.follow_redirects)?;

        let mut request = client
            .request(parse_method(&args.method)?, &args.url)
            .headers(header_map(&args.headers)?);
        if !args.params.is_empty() {
            request = request.query(&args.params);
        }
        if let Some(body) = args.body.filter(|b| !b.is_empty()) {
            // JSON bodies are sent as JSON, anything else as text
            request = match serde_json::from_str::<Value>(&body) {
                Ok(json) => request.json(&json),
                Err(_) => request.body(body),
            };
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| request_error(e, timeout))?;
        let status = response.status();
        let url = response.url().to_string();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = read_body(response, timeout).await?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(%url, status = status.as_u16(), elapsed_ms, "HTTP request finished");

        Ok(json!({
            "status_code": status.as_u16(),
            "headers": headers,
            "json": serde_json::from_str::<Value>(&body).ok(),
            "body": body,
            "success": status.is_success(),
            "url": url,
            "elapsed_ms": elapsed_ms,
        }))
    }
}

// ============================================================================
// graphql
// ============================================================================

pub struct GraphqlTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct GraphqlArgs {
    endpoint: String,
    query: String,
    variables: Option<Value>,
    #[serde(default)]
    headers: HashMap<String, String>,
    timeout: Option<u64>,
}

impl Default for GraphqlTool {
    fn default() -> Self {
        let spec = ToolSpec::new("graphql", "Execute GraphQL queries against a GraphQL endpoint")
            .with_parameters(
                ParameterSchema::object()
                    .property("endpoint", PropertySchema::string().description("GraphQL endpoint URL"))
                    .property("query", PropertySchema::string().description("GraphQL query or mutation"))
                    .property(
                        "variables",
                        PropertySchema::object().description("Query variables as key-value pairs"),
                    )
                    .property(
                        "headers",
                        headers_property("HTTP headers (e.g., for authentication)"),
                    )
                    .property(
                        "timeout",
                        PropertySchema::integer()
                            .description("Request timeout in seconds")
                            .default_value(DEFAULT_HTTP_TIMEOUT_SECS),
                    )
                    .required(vec!["endpoint", "query"]),
            )
            .with_returns("{data, errors, success, status_code}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for GraphqlTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: GraphqlArgs = parse_args(args)?;
        let timeout = clamp_http_timeout(args.timeout);
        let client = build_client(timeout, true)?;

        let mut payload = json!({ "query": args.query });
        if let Some(variables) = args.variables.filter(|v| !v.is_null()) {
            payload["variables"] = variables;
        }

        let response = client
            .post(&args.endpoint)
            .headers(header_map(&args.headers)?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;
        let status = response.status().as_u16();
        let text = read_body(response, timeout).await?;
        let result: Value = serde_json::from_str(&text).map_err(|e| {
            ToolError::execution(format!("GraphQL response is not JSON (status {status}): {e}"))
        })?;

        let errors = result.get("errors").cloned().unwrap_or(Value::Null);
        let has_errors = match &errors {
            Value::Null => false,
            Value::Array(list) => !list.is_empty(),
            _ => true,
        };
        Ok(json!({
            "data": result.get("data").cloned().unwrap_or(Value::Null),
            "errors": errors,
            "success": !has_errors,
            "status_code": status,
        }))
    }
}

// ============================================================================
// webhook
// ============================================================================

pub struct WebhookTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct WebhookArgs {
    url: String,
    payload: Value,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default = "default_post")]
    method: String,
}

fn default_post() -> String {
    "POST".to_string()
}

impl Default for WebhookTool {
    fn default() -> Self {
        let spec = ToolSpec::new("webhook", "Send webhook notifications to external services")
            .with_parameters(
                ParameterSchema::object()
                    .property("url", PropertySchema::string().description("Webhook URL"))
                    .property(
                        "payload",
                        PropertySchema::object().description("Webhook payload as key-value pairs"),
                    )
                    .property("headers", headers_property("Additional HTTP headers"))
                    .property(
                        "method",
                        PropertySchema::string()
                            .description("HTTP method (default: POST)")
                            .enum_values(vec!["POST", "PUT"])
                            .default_value("POST"),
                    )
                    .required(vec!["url", "payload"]),
            )
            .with_returns("{success, status_code, response}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for WebhookTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: WebhookArgs = parse_args(args)?;
        let method = parse_method(&args.method)?;
        if method != Method::POST && method != Method::PUT {
            return Err(ToolError::invalid_arguments(format!(
                "webhook method must be POST or PUT, got {method}"
            )));
        }

        let timeout = DEFAULT_HTTP_TIMEOUT_SECS;
        let response = build_client(timeout, true)?
            .request(method, &args.url)
            .headers(header_map(&args.headers)?)
            .json(&args.payload)
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;
        let status = response.status();
        let text = read_body(response, timeout).await?;

        Ok(json!({
            "success": status.is_success(),
            "status_code": status.as_u16(),
            "response": text,
        }))
    }
}

pub fn api_server() -> DiscoveryServer {
    DiscoveryServer::new(
        SERVER_NAME,
        "HTTP, GraphQL, and webhook interactions with external services",
    )
    .with_tool(Arc::new(HttpTool::default()))
    .with_tool(Arc::new(GraphqlTool::default()))
    .with_tool(Arc::new(WebhookTool::default()))
}
