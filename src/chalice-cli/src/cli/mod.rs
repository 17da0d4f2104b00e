//! Command-line interface: argument parsing and dispatch.

mod args;
mod handlers;

pub use args::*;
pub use handlers::dispatch_command;
