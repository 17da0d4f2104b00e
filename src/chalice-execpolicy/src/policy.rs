//! Safety policy evaluation.

use std::collections::HashSet;

use crate::command::{ParsedCommand, basename};
use crate::config::PolicyConfig;
use crate::decision::SafetyDecision;
use crate::error::PolicyError;
use crate::patterns::{ALLOWED_COMMANDS, DANGEROUS_PATTERNS, DENIED_COMMANDS};

/// Command classifier backed by a deny-list, an allow-list and a set of
/// catastrophic substrings.
///
/// The deny-list is always consulted first, so an entry present on both
/// lists is denied.
#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    denied: HashSet<String>,
    allowed: HashSet<String>,
    dangerous_patterns: Vec<String>,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyPolicy {
    /// Policy with the built-in lists.
    pub fn new() -> Self {
        Self::with_config(&PolicyConfig::default())
    }

    /// Built-in lists extended by `config`.
    pub fn with_config(config: &PolicyConfig) -> Self {
        let denied = DENIED_COMMANDS
            .iter()
            .map(|s| s.to_string())
            .chain(config.deny.iter().map(|s| basename(s)))
            .collect();
        let allowed = ALLOWED_COMMANDS
            .iter()
            .map(|s| s.to_string())
            .chain(config.allow.iter().map(|s| basename(s)))
            .collect();
        let dangerous_patterns = DANGEROUS_PATTERNS
            .iter()
            .map(|s| s.to_string())
            .chain(config.dangerous_patterns.iter().cloned())
            .filter(|p| !p.trim().is_empty())
            .collect();

        Self {
            denied,
            allowed,
            dangerous_patterns,
        }
    }

    /// Classify a single command token. Pure: no PATH lookup.
    pub fn classify(&self, token: &str) -> SafetyDecision {
        let name = basename(token);

        if let Some(pattern) = self.deny_match(&name) {
            return SafetyDecision::Denied { pattern };
        }
        if self.allowed.contains(&name) {
            return SafetyDecision::Allowed;
        }
        SafetyDecision::Unknown
    }

    fn deny_match(&self, name: &str) -> Option<String> {
        if self.denied.contains(name) {
            return Some(name.to_string());
        }
        // mkfs.ext4, mkfs.vfat, ...
        name.split_once('.')
            .map(|(stem, _)| stem)
            .filter(|stem| self.denied.contains(*stem))
            .map(str::to_string)
    }

    /// Check a program invocation (no shell).
    ///
    /// Denied programs are refused; allowed ones pass; anything else must
    /// resolve on PATH.
    pub fn check_program(&self, program: &str) -> Result<SafetyDecision, PolicyError> {
        let program = program.trim();
        if program.is_empty() {
            return Err(PolicyError::InvalidCommand("empty command".to_string()));
        }

        match self.classify(program) {
            SafetyDecision::Denied { pattern } => Err(PolicyError::Denied {
                command: program.to_string(),
                pattern,
            }),
            SafetyDecision::Allowed => Ok(SafetyDecision::Allowed),
            SafetyDecision::Unknown => match which::which(program) {
                Ok(_) => Ok(SafetyDecision::Unknown),
                Err(_) => Err(PolicyError::NotFound {
                    command: program.to_string(),
                }),
            },
        }
    }

    /// Check a command line destined for a shell.
    ///
    /// Scans the whole string for catastrophic substrings, then classifies
    /// the leading token of every `;`/`&&`/`||`/`|` segment, looking past
    /// keywords such as `if`/`do`/`exec` and `(`/`{` grouping. Shell builtins
    /// are not PATH-checked. Best effort: obfuscated commands can slip through.
    pub fn check_shell(&self, command: &str) -> Result<(), PolicyError> {
        if command.trim().is_empty() {
            return Err(PolicyError::InvalidCommand("empty command".to_string()));
        }

        if let Some(pattern) = self.find_dangerous_pattern(command) {
            return Err(PolicyError::Dangerous {
                pattern: pattern.to_string(),
            });
        }

        for segment in ParsedCommand::parse_segments(command) {
            if let SafetyDecision::Denied { pattern } = self.classify(&segment.program) {
                return Err(PolicyError::Denied {
                    command: segment.program_basename,
                    pattern,
                });
            }
        }

        Ok(())
    }

    /// First catastrophic pattern found in `command`, if any.
    ///
    /// Whitespace runs are collapsed before matching; punctuation-only
    /// patterns (the fork bomb) are also matched with all whitespace removed.
    pub fn find_dangerous_pattern(&self, command: &str) -> Option<&str> {
        let collapsed = collapse_whitespace(command);
        let compact = strip_whitespace(command);

        self.dangerous_patterns
            .iter()
            .find(|pattern| {
                if collapsed.contains(&collapse_whitespace(pattern)) {
                    return true;
                }
                let punctuation_only = !pattern.chars().any(|c| c.is_alphanumeric());
                punctuation_only && compact.contains(&strip_whitespace(pattern))
            })
            .map(String::as_str)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
