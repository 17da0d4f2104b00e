//! Common utilities shared across Chalice crates.

pub mod config;
pub mod dirs;
pub mod output;
pub mod subprocess_env;
pub mod timeout;

pub use config::{
    ChaliceConfig, ConfigError, ExecSection, LoggingSection, PolicySection, ToolsSection,
};
pub use dirs::{AppDirs, get_chalice_home};
pub use output::{CapturedOutput, MAX_OUTPUT_BYTES};
pub use subprocess_env::{is_sensitive_env_var, sanitized_env};
pub use timeout::clamp_exec_timeout;
