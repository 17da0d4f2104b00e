//! Tracing setup for the CLI.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::LogLevel;

/// Pick the filter directive.
///
/// `--log-level` wins over `-v`, which wins over the config file (already
/// overridden by `CHALICE_LOG_LEVEL` at load time).
pub fn resolve_level(cli_level: Option<LogLevel>, verbose: bool, config_level: &str) -> String {
    if let Some(level) = cli_level {
        return level.as_filter_str().to_string();
    }
    if verbose {
        return LogLevel::Debug.as_filter_str().to_string();
    }
    let trimmed = config_level.trim();
    if trimmed.is_empty() {
        "warn".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr unless `log_file` is set, in which case they are
/// appended to it through a non-blocking writer. The returned guard must be
/// held until exit so buffered lines are flushed.
pub fn init_logging(filter: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(filter)
        .with_context(|| format!("invalid log filter '{filter}'"))?;

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .try_init()
                .context("failed to install tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .try_init()
                .context("failed to install tracing subscriber")?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level_precedence() {
        assert_eq!(resolve_level(Some(LogLevel::Error), true, "info"), "error");
        assert_eq!(resolve_level(None, true, "info"), "debug");
        assert_eq!(resolve_level(None, false, "chalice_exec=trace"), "chalice_exec=trace");
        assert_eq!(resolve_level(None, false, "  "), "warn");
    }
}
