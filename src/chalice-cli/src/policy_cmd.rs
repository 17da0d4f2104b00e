//! `chalice policy`: inspect the command safety policy.

use std::process::ExitCode;

use anyhow::Result;
use chalice_common::ChaliceConfig;
use chalice_execpolicy::{ALLOWED_COMMANDS, DANGEROUS_PATTERNS, DENIED_COMMANDS, SafetyPolicy};
use chalice_servers::safety_policy;
use serde_json::{Value, json};

use crate::cli::{PolicyCheckArgs, PolicyCommand};
use crate::output::print_payload;

pub fn run(cmd: PolicyCommand, config: &ChaliceConfig) -> Result<ExitCode> {
    match cmd {
        PolicyCommand::Check(args) => print_payload(&check(&safety_policy(config), &args)),
        PolicyCommand::Show => {
            let merged = |builtin: &[&str], extra: &[String]| -> Vec<String> {
                builtin
                    .iter()
                    .map(|s| s.to_string())
                    .chain(extra.iter().cloned())
                    .collect()
            };
            let payload = json!({
                "deny": merged(DENIED_COMMANDS, &config.policy.deny),
                "allow": merged(ALLOWED_COMMANDS, &config.policy.allow),
                "dangerous_patterns": merged(DANGEROUS_PATTERNS, &config.policy.dangerous_patterns),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Verdict for a command, shaped like the tool payloads.
pub fn check(policy: &SafetyPolicy, args: &PolicyCheckArgs) -> Value {
    let command = args.command.join(" ");
    if args.shell {
        return match policy.check_shell(&command) {
            Ok(()) => json!({ "command": command, "allowed": true }),
            Err(err) => rejection(&command, &err),
        };
    }

    let program = args.command.first().map(String::as_str).unwrap_or_default();
    match policy.check_program(program) {
        Ok(decision) => json!({
            "command": command,
            "allowed": true,
            "decision": decision.to_string(),
        }),
        Err(err) => rejection(&command, &err),
    }
}

fn rejection(command: &str, err: &chalice_execpolicy::PolicyError) -> Value {
    let mut payload = json!({
        "command": command,
        "allowed": false,
        "error": err.to_string(),
    });
    if err.is_blocked() {
        payload["blocked"] = Value::Bool(true);
    }
    if let Some(pattern) = err.matched_pattern() {
        payload["pattern"] = Value::String(pattern.to_string());
    }
    payload
}
