//! Execution outcomes and their wire payloads.

use std::time::Duration;

use serde_json::{Value, json};

/// Outcome of one execution. Exactly one variant per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The interpreter exited before the deadline.
    Completed {
        exit_code: i32,
        stdout: String,
        stderr: String,
        duration: Duration,
    },
    /// The deadline passed and the process group was killed.
    TimedOut {
        partial_stdout: String,
        partial_stderr: String,
        timeout_secs: u64,
    },
    /// Refused by the safety policy. Nothing was spawned.
    Blocked { reason: String },
    /// The engine could not run the request (missing interpreter, I/O).
    EngineError { message: String },
}

/// Exit code reported for a timed-out execution.
pub const TIMEOUT_RETURN_CODE: i32 = -1;

impl ExecutionResult {
    pub fn engine_error(message: impl Into<String>) -> Self {
        Self::EngineError {
            message: message.into(),
        }
    }

    /// Completed with exit code zero.
    pub fn success(&self) -> bool {
        matches!(self, Self::Completed { exit_code: 0, .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Completed { exit_code, .. } => Some(*exit_code),
            Self::TimedOut { .. } => Some(TIMEOUT_RETURN_CODE),
            _ => None,
        }
    }

    pub fn stdout(&self) -> &str {
        match self {
            Self::Completed { stdout, .. } => stdout,
            Self::TimedOut { partial_stdout, .. } => partial_stdout,
            _ => "",
        }
    }

    /// JSON payload handed back to callers.
    ///
    /// `Completed`/`TimedOut` produce
    /// `{success, stdout, stderr, return_code, timeout}`; `Blocked` produces
    /// `{error, blocked: true}`; `EngineError` produces `{error}`.
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Completed {
                exit_code,
                stdout,
                stderr,
                ..
            } => json!({
                "success": *exit_code == 0,
                "stdout": stdout,
                "stderr": stderr,
                "return_code": exit_code,
                "timeout": false,
            }),
            Self::TimedOut {
                partial_stdout,
                partial_stderr,
                timeout_secs,
            } => {
                let mut stderr = partial_stderr.clone();
                if !stderr.is_empty() && !stderr.ends_with('\n') {
                    stderr.push('\n');
                }
                stderr.push_str(&format!("Execution timed out after {timeout_secs} seconds"));
                json!({
                    "success": false,
                    "stdout": partial_stdout,
                    "stderr": stderr,
                    "return_code": TIMEOUT_RETURN_CODE,
                    "timeout": true,
                })
            }
            Self::Blocked { reason } => json!({ "error": reason, "blocked": true }),
            Self::EngineError { message } => json!({ "error": message }),
        }
    }
}
