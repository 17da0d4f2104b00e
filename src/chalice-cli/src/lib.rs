//! Chalice CLI library.
//!
//! - `cli/` - argument parsing and dispatch
//! - `*_cmd.rs` - one module per top-level command
//! - `logging` - tracing subscriber setup

pub mod cli;
pub mod exec_cmd;
pub mod logging;
pub mod mcp_cmd;
pub mod output;
pub mod policy_cmd;
pub mod tools_cmd;

pub use cli::{Cli, Commands, LogLevel, dispatch_command};
