//! `execution` server: guest code through the [`ExecutionEngine`].

use std::sync::Arc;

use async_trait::async_trait;
use chalice_exec::{ExecutionEngine, ExecutionResult, GuestLanguage};
use chalice_mcp::DiscoveryServer;
use chalice_tools::{
    ParameterSchema, PropertySchema, Result, Tool, ToolArgs, ToolError, ToolSpec, parse_args,
};
use serde::Deserialize;
use serde_json::Value;

pub const SERVER_NAME: &str = "execution";

const RETURNS: &str = "{success, stdout, stderr, return_code, timeout}";

/// Completed and timed-out runs are data; refusals and engine failures are errors.
pub fn execution_payload(result: ExecutionResult) -> Result<Value> {
    match result {
        ExecutionResult::Blocked { reason } => Err(ToolError::Blocked { reason }),
        ExecutionResult::EngineError { message } => Err(ToolError::Engine(message)),
        other => Ok(other.to_payload()),
    }
}

fn timeout_property() -> PropertySchema {
    PropertySchema::integer()
        .description("Timeout in seconds (default: 30, max: 300)")
        .default_value(30)
        .min(1.0)
        .max(300.0)
}

pub struct PythonTool {
    engine: Arc<ExecutionEngine>,
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct PythonArgs {
    code: String,
    timeout: Option<i64>,
    #[serde(default)]
    input_data: Option<String>,
}

impl PythonTool {
    pub fn new(engine: Arc<ExecutionEngine>) -> Self {
        let spec = ToolSpec::new(
            "python",
            "Execute Python code in a sandboxed environment with timeout and resource controls",
        )
        .with_parameters(
            ParameterSchema::object()
                .property(
                    "code",
                    PropertySchema::string().description("Python code to execute"),
                )
                .property("timeout", timeout_property())
                .property(
                    "input_data",
                    PropertySchema::string()
                        .description("Input data to pass to the code via stdin")
                        .default_value(""),
                )
                .required(vec!["code"]),
        )
        .with_returns(RETURNS);
        Self { engine, spec }
    }
}

#[async_trait]
impl Tool for PythonTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: PythonArgs = parse_args(args)?;
        let mut request = self.engine.request(GuestLanguage::Python, args.code);
        if let Some(timeout) = args.timeout {
            request = request.with_timeout_secs(timeout);
        }
        if let Some(input) = args.input_data.filter(|s| !s.is_empty()) {
            request = request.with_stdin(input);
        }
        execution_payload(self.engine.execute(request).await)
    }
}

pub struct JavaScriptTool {
    engine: Arc<ExecutionEngine>,
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct JavaScriptArgs {
    code: String,
    timeout: Option<i64>,
}

impl JavaScriptTool {
    pub fn new(engine: Arc<ExecutionEngine>) -> Self {
        let spec = ToolSpec::new(
            "javascript",
            "Execute JavaScript code using Node.js with timeout controls",
        )
        .with_parameters(
            ParameterSchema::object()
                .property(
                    "code",
                    PropertySchema::string().description("JavaScript code to execute"),
                )
                .property("timeout", timeout_property())
                .required(vec!["code"]),
        )
        .with_returns(RETURNS);
        Self { engine, spec }
    }
}

#[async_trait]
impl Tool for JavaScriptTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: JavaScriptArgs = parse_args(args)?;
        let mut request = self.engine.request(GuestLanguage::JavaScript, args.code);
        if let Some(timeout) = args.timeout {
            request = request.with_timeout_secs(timeout);
        }
        execution_payload(self.engine.execute(request).await)
    }
}

pub struct BashTool {
    engine: Arc<ExecutionEngine>,
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct BashArgs {
    command: String,
    timeout: Option<i64>,
    working_dir: Option<String>,
}

impl BashTool {
    pub fn new(engine: Arc<ExecutionEngine>) -> Self {
        let spec = ToolSpec::new(
            "bash",
            "Execute bash commands with safety checks and timeout controls",
        )
        .with_parameters(
            ParameterSchema::object()
                .property(
                    "command",
                    PropertySchema::string().description("Bash command to execute"),
                )
                .property("timeout", timeout_property())
                .property(
                    "working_dir",
                    PropertySchema::string()
                        .description("Working directory for command execution")
                        .default_value("."),
                )
                .required(vec!["command"]),
        )
        .with_returns(RETURNS);
        Self { engine, spec }
    }
}

#[async_trait]
impl Tool for BashTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: BashArgs = parse_args(args)?;
        let mut request = self.engine.request(GuestLanguage::Shell, args.command);
        if let Some(timeout) = args.timeout {
            request = request.with_timeout_secs(timeout);
        }
        if let Some(dir) = args.working_dir.filter(|d| !d.is_empty()) {
            request = request.with_working_dir(dir);
        }
        execution_payload(self.engine.execute(request).await)
    }
}

pub fn execution_server(engine: Arc<ExecutionEngine>) -> DiscoveryServer {
    DiscoveryServer::new(
        SERVER_NAME,
        "Code execution with sandboxing for Python, JavaScript, and Bash",
    )
    .with_tool(Arc::new(PythonTool::new(engine.clone())))
    .with_tool(Arc::new(JavaScriptTool::new(engine.clone())))
    .with_tool(Arc::new(BashTool::new(engine)))
}
