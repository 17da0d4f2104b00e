//! A single execution request.

use std::path::PathBuf;
use std::time::Duration;

use chalice_common::timeout::{DEFAULT_EXEC_TIMEOUT_SECS, clamp_exec_timeout};

use crate::language::GuestLanguage;

/// What to run, for how long, and where.
///
/// The timeout is clamped into `[1, 300]` seconds on every path in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub language: GuestLanguage,
    /// Script source, or the command line in shell mode.
    pub source: String,
    timeout_secs: u64,
    /// Written to the child's stdin, which is then closed.
    pub stdin: Option<String>,
    /// Working directory; the engine's own when `None`.
    pub working_dir: Option<PathBuf>,
}

impl ExecutionRequest {
    pub fn new(language: GuestLanguage, source: impl Into<String>) -> Self {
        Self {
            language,
            source: source.into(),
            timeout_secs: DEFAULT_EXEC_TIMEOUT_SECS,
            stdin: None,
            working_dir: None,
        }
    }

    pub fn python(source: impl Into<String>) -> Self {
        Self::new(GuestLanguage::Python, source)
    }

    pub fn javascript(source: impl Into<String>) -> Self {
        Self::new(GuestLanguage::JavaScript, source)
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Self::new(GuestLanguage::Shell, command)
    }

    /// Set the timeout, clamped into the supported range.
    pub fn with_timeout_secs(mut self, requested: i64) -> Self {
        self.timeout_secs = clamp_exec_timeout(requested);
        self
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
