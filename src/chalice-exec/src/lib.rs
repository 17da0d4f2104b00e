//! Guest code execution for Chalice.
//!
//! Runs Python, JavaScript or a shell command line in a child process that
//! leads its own process group, with a hard wall-clock deadline:
//!
//! ```text
//!  Created ──(shell command refused by policy)──▶ Blocked
//!     │
//!     │ write script file, spawn in new process group
//!     ▼
//!  Spawned ──(exit before deadline)──▶ Completed ─┐
//!     │                                           │
//!     └──(deadline)──▶ kill group ──▶ TimedOut ───┤
//!                                                 ▼
//!                                   Reclaimed (script file deleted)
//! ```
//!
//! Timeouts are clamped to `[1, 300]` seconds. Interpreters must resolve on
//! PATH before anything is spawned.

mod engine;
mod language;
mod process;
mod request;
mod result;
mod script;

#[cfg(test)]
mod tests;

pub use engine::{EngineConfig, ExecutionEngine};
pub use language::{GuestLanguage, Interpreter};
pub use process::{isolate_process_group, terminate_tree};
pub use request::ExecutionRequest;
pub use result::{ExecutionResult, TIMEOUT_RETURN_CODE};
pub use script::ScriptFile;
