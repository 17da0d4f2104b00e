//! Panic-safe tool invocation shared by every dispatcher.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, ToolError};
use crate::spec::{Tool, ToolArgs};
use crate::validation::{ValidationMode, validate_args};

/// Validate `args` and run `tool`, turning a panic into [`ToolError::Execution`].
pub async fn invoke_tool(tool: &dyn Tool, args: ToolArgs, mode: ValidationMode) -> Result<Value> {
    validate_args(tool.parameters(), &args, mode)?;

    debug!(tool = tool.name(), "Executing tool");
    match AssertUnwindSafe(tool.execute(args)).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            debug!(tool = tool.name(), error = %err, "Tool returned error");
            Err(err)
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(tool = tool.name(), %message, "Tool panicked");
            Err(ToolError::Execution(message))
        }
    }
}

/// Flatten a dispatch outcome into the wire payload.
pub fn into_payload(result: Result<Value>) -> Value {
    result.unwrap_or_else(|err| err.to_payload())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
