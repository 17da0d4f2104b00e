//! The tool contract and its wire representations.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ToolError};
use crate::schema::ParameterSchema;

/// Arguments passed to a tool: a JSON object.
pub type ToolArgs = Map<String, Value>;

/// Description used when a tool does not say what it returns.
pub const DEFAULT_RETURNS: &str = "Any";

/// Static identity of a tool: name, description, parameters and return shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
    pub returns: String,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ParameterSchema::object(),
            returns: DEFAULT_RETURNS.to_string(),
        }
    }

    pub fn with_parameters(mut self, parameters: ParameterSchema) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = returns.into();
        self
    }
}

/// A named, schema-described capability.
///
/// Implementations are registered into a [`crate::ToolRegistry`] or a
/// discovery server and only ever invoked through them, after the required
/// parameters have been checked.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    /// Run the tool. `Ok` carries the tool's JSON result.
    async fn execute(&self, args: ToolArgs) -> Result<Value>;

    fn name(&self) -> &str {
        &self.spec().name
    }

    fn description(&self) -> &str {
        &self.spec().description
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.spec().parameters
    }

    fn returns(&self) -> &str {
        &self.spec().returns
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters().to_value())
    }
}

/// Tool definition for the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for parameters.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Wrap in the function-calling envelope.
    pub fn into_function_tool(self) -> FunctionTool {
        FunctionTool {
            tool_type: "function".to_string(),
            function: self,
        }
    }
}

/// `{"type": "function", "function": {...}}` as expected by chat-completion APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ToolDefinition,
}

/// Convert a JSON value into tool arguments. `null` means no arguments.
pub fn args_from_value(value: Value) -> Result<ToolArgs> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ToolArgs::new()),
        other => Err(ToolError::invalid_arguments(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Deserialize arguments into a typed struct.
pub fn parse_args<T: DeserializeOwned>(args: ToolArgs) -> Result<T> {
    serde_json::from_value(Value::Object(args)).map_err(ToolError::from)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
