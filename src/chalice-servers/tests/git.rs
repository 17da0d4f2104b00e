mod common;

use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn git(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo() -> Option<tempfile::TempDir> {
    if !common::has_program("git") {
        return None;
    }
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "-q", "-b", "main"]);
    git(dir.path(), &["config", "user.name", "Test"]);
    git(dir.path(), &["config", "user.email", "test@example.com"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);
    std::fs::write(dir.path().join("README"), "hello\n").unwrap();
    git(dir.path(), &["add", "README"]);
    git(dir.path(), &["commit", "-q", "-m", "initial"]);
    Some(dir)
}

async fn call(tool: &str, args: Value) -> Value {
    common::client().call_tool_json("git", tool, args).await
}

#[tokio::test]
async fn test_status_clean_then_dirty() {
    let Some(repo) = init_repo() else {
        return;
    };
    let repo_path = repo.path().to_str().unwrap();

    let status = call("status", json!({ "repo_path": repo_path })).await;
    assert_eq!(status["branch"], "main");
    assert_eq!(status["clean"], true);

    std::fs::write(repo.path().join("new.txt"), "x").unwrap();
    let status = call("status", json!({ "repo_path": repo_path })).await;
    assert_eq!(status["clean"], false);
    assert_eq!(status["files"], json!(["?? new.txt"]));
}

#[tokio::test]
async fn test_commit_and_log() {
    let Some(repo) = init_repo() else {
        return;
    };
    let repo_path = repo.path().to_str().unwrap();
    std::fs::write(repo.path().join("README"), "changed\n").unwrap();

    let diff = call("diff", json!({ "repo_path": repo_path })).await;
    assert_eq!(diff["has_changes"], true);
    assert!(diff["diff"].as_str().unwrap().contains("+changed"));

    let commit = call(
        "commit",
        json!({ "repo_path": repo_path, "message": "second", "add_all": true }),
    )
    .await;
    assert_eq!(commit["success"], true, "{commit}");

    let log = call("log", json!({ "repo_path": repo_path, "limit": 5 })).await;
    assert_eq!(log["count"], 2);
    assert!(log["commits"][0].as_str().unwrap().ends_with("second"));
}

#[tokio::test]
async fn test_branch_actions() {
    let Some(repo) = init_repo() else {
        return;
    };
    let repo_path = repo.path().to_str().unwrap();

    let created = call(
        "branch",
        json!({ "repo_path": repo_path, "action": "create", "name": "feature" }),
    )
    .await;
    assert_eq!(created["action"], "created");

    let listed = call("branch", json!({ "repo_path": repo_path, "action": "list" })).await;
    assert_eq!(listed["branches"], json!(["feature", "main"]));

    let missing = call("branch", json!({ "repo_path": repo_path, "action": "switch" })).await;
    assert_eq!(
        missing["error"],
        "Invalid arguments: name required for switch action"
    );
}

#[tokio::test]
async fn test_status_outside_repo() {
    if !common::has_program("git") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let payload = call("status", json!({ "repo_path": dir.path() })).await;
    assert!(payload["error"].is_string());
}
