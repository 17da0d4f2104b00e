//! Chalice Execpolicy - command safety classification for guest execution.
//!
//! - `Allowed` - basename is on the allow-list
//! - `Denied` - basename is on the deny-list (checked first, always wins)
//! - `Unknown` - on neither list; runs only if it resolves on PATH
//!
//! Shell command lines get an extra pass over the full string for
//! catastrophic substrings, so `ls && rm -rf /` is caught even though its
//! leading token is harmless.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │              Command                       │
//! └────────────────────┬───────────────────────┘
//!                      │
//!                      ▼
//! ┌────────────────────────────────────────────┐
//! │  Contains a catastrophic substring?        │
//! │  (shell mode only: rm -rf /, dd if=, ...)  │
//! └────────────────────┬───────────────────────┘
//!        ┌─────────────┴─────────────┐
//!      [Yes]                        [No]
//!        │                           ▼
//!        │              ┌─────────────────────────┐
//!        │              │ Leading token denied?   │
//!        │              └────────────┬────────────┘
//!        │                ┌──────────┴──────────┐
//!        ▼              [Yes]                  [No]
//!   ┌─────────┐           │                     ▼
//!   │  BLOCK  │◀──────────┘          ┌─────────────────────┐
//!   └─────────┘                      │ Allow-list or PATH? │
//!                                    └──────────┬──────────┘
//!                                   ┌───────────┴───────────┐
//!                                 [Yes]                    [No]
//!                                   ▼                       ▼
//!                              ┌─────────┐           ┌───────────┐
//!                              │   RUN   │           │ NOT FOUND │
//!                              └─────────┘           └───────────┘
//! ```
//!
//! This is a heuristic filter, not a sandbox.

#[cfg(test)]
mod tests;

mod command;
mod config;
mod decision;
mod error;
mod patterns;
mod policy;

pub use command::ParsedCommand;
pub use config::PolicyConfig;
pub use decision::SafetyDecision;
pub use error::PolicyError;
pub use patterns::{ALLOWED_COMMANDS, DANGEROUS_PATTERNS, DENIED_COMMANDS};
pub use policy::SafetyPolicy;

// ============================================================================
// Convenience Functions
// ============================================================================

/// Classify a token with the built-in lists.
pub fn classify(token: &str) -> SafetyDecision {
    SafetyPolicy::new().classify(token)
}

/// Check a shell command line with the built-in lists.
pub fn check_shell_command(command: &str) -> Result<(), PolicyError> {
    SafetyPolicy::new().check_shell(command)
}
