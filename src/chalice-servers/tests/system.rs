mod common;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn call(tool: &str, args: Value) -> Value {
    common::client().call_tool_json("system", tool, args).await
}

#[tokio::test]
async fn test_denied_command_is_blocked() {
    let payload = call("command", json!({ "command": "rm", "args": ["-rf", "/tmp/x"] })).await;
    assert_eq!(
        payload,
        json!({ "error": "Command 'rm' is blacklisted for safety", "blocked": true })
    );
}

#[tokio::test]
async fn test_unknown_command_not_found() {
    let payload = call("command", json!({ "command": "definitely-not-a-real-binary-xyz" })).await;
    assert_eq!(
        payload,
        json!({ "error": "Command not found: definitely-not-a-real-binary-xyz" })
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_allowed_command_runs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "").unwrap();

    let payload = call(
        "command",
        json!({ "command": "ls", "working_dir": dir.path() }),
    )
    .await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["return_code"], 0);
    assert!(payload["stdout"].as_str().unwrap().contains("marker.txt"));
    assert_eq!(payload["command"], "ls");
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_with_inline_args() {
    let payload = call(
        "command",
        json!({ "command": "echo hello", "args": ["world"] }),
    )
    .await;
    assert_eq!(payload["stdout"], "hello world\n");
    assert_eq!(payload["command"], "echo hello world");
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_timeout() {
    if !common::has_program("sleep") && !std::path::Path::new("/bin/sleep").exists() {
        return;
    }
    let started = std::time::Instant::now();
    let payload = call(
        "command",
        json!({ "command": "sleep", "args": ["30"], "timeout": 1 }),
    )
    .await;
    assert_eq!(
        payload,
        json!({ "error": "Command timed out after 1 seconds", "timeout": true })
    );
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[tokio::test]
async fn test_processes_find_requires_pattern() {
    let payload = call("processes", json!({ "action": "find" })).await;
    assert_eq!(
        payload,
        json!({ "error": "Invalid arguments: Pattern required for find action" })
    );
}

#[tokio::test]
async fn test_packages_rejects_unknown_manager() {
    let payload = call("packages", json!({ "manager": "brew", "action": "list" })).await;
    assert!(payload["error"].as_str().unwrap().starts_with("Invalid arguments"));
}
