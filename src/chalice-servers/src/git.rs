//! `git` server: repository operations through the `git` binary.
//!
//! Every tool runs `git` directly (never through a shell) in `repo_path`,
//! which defaults to the current directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chalice_mcp::DiscoveryServer;
use chalice_tools::{
    ParameterSchema, PropertySchema, Result, Tool, ToolArgs, ToolError, ToolSpec, parse_args,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::process::{ProgramOutput, run_program};

pub const SERVER_NAME: &str = "git";

const LOCAL_TIMEOUT: Duration = Duration::from_secs(30);
const REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

async fn git(repo_path: Option<&str>, args: &[&str], timeout: Duration) -> Result<ProgramOutput> {
    let dir = PathBuf::from(repo_path.unwrap_or("."));
    run_program("git", args, Some(&dir), timeout).await
}

/// Fail with git's stderr when it exited non-zero.
fn check(output: ProgramOutput, fallback: &str) -> Result<ProgramOutput> {
    if output.success() {
        Ok(output)
    } else {
        Err(ToolError::execution(output.error_message(fallback)))
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn repo_path_property() -> PropertySchema {
    PropertySchema::string()
        .description("Path to git repository (default: current directory)")
        .default_value(".")
}

// ============================================================================
// status
// ============================================================================

pub struct StatusTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct RepoArgs {
    repo_path: Option<String>,
}

impl Default for StatusTool {
    fn default() -> Self {
        let spec = ToolSpec::new("status", "Get the status of the current git repository")
            .with_parameters(ParameterSchema::object().property("repo_path", repo_path_property()))
            .with_returns("{branch, branch_info, files, clean, raw_output}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for StatusTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: RepoArgs = parse_args(args)?;
        let repo = args.repo_path.as_deref();
        let status = check(
            git(repo, &["status", "--porcelain", "-b"], LOCAL_TIMEOUT).await?,
            "Not a git repository",
        )?;
        let branch = git(repo, &["rev-parse", "--abbrev-ref", "HEAD"], LOCAL_TIMEOUT)
            .await
            .map(|out| out.stdout.trim().to_string())
            .unwrap_or_default();

        let mut lines = status.stdout.lines();
        let branch_info = lines.next().unwrap_or_default().to_string();
        let files: Vec<&str> = lines.filter(|line| !line.trim().is_empty()).collect();

        Ok(json!({
            "branch": branch,
            "branch_info": branch_info,
            "clean": files.is_empty(),
            "files": files,
            "raw_output": status.stdout,
        }))
    }
}

// ============================================================================
// diff
// ============================================================================

pub struct DiffTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct DiffArgs {
    repo_path: Option<String>,
    #[serde(default)]
    staged: bool,
    file_path: Option<String>,
}

impl Default for DiffTool {
    fn default() -> Self {
        let spec = ToolSpec::new("diff", "View git diff for staged or unstaged changes")
            .with_parameters(
                ParameterSchema::object()
                    .property("repo_path", repo_path_property())
                    .property(
                        "staged",
                        PropertySchema::boolean()
                            .description("Show staged changes (default: false shows unstaged)")
                            .default_value(false),
                    )
                    .property(
                        "file_path",
                        PropertySchema::string().description("Specific file to diff (optional)"),
                    ),
            )
            .with_returns("{diff, has_changes}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for DiffTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: DiffArgs = parse_args(args)?;
        let mut cmd = vec!["diff"];
        if args.staged {
            cmd.push("--cached");
        }
        if let Some(file) = args.file_path.as_deref() {
            cmd.extend(["--", file]);
        }
        let out = check(
            git(args.repo_path.as_deref(), &cmd, LOCAL_TIMEOUT).await?,
            "git diff failed",
        )?;
        Ok(json!({
            "has_changes": !out.stdout.trim().is_empty(),
            "diff": out.stdout,
        }))
    }
}

// ============================================================================
// commit
// ============================================================================

pub struct CommitTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct CommitArgs {
    message: String,
    repo_path: Option<String>,
    #[serde(default)]
    add_all: bool,
}

impl Default for CommitTool {
    fn default() -> Self {
        let spec = ToolSpec::new("commit", "Create a git commit with the specified message")
            .with_parameters(
                ParameterSchema::object()
                    .property("message", PropertySchema::string().description("Commit message"))
                    .property("repo_path", repo_path_property())
                    .property(
                        "add_all",
                        PropertySchema::boolean()
                            .description("Add all changes before committing")
                            .default_value(false),
                    )
                    .required(vec!["message"]),
            );
        Self { spec }
    }
}

#[async_trait]
impl Tool for CommitTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: CommitArgs = parse_args(args)?;
        let repo = args.repo_path.as_deref();
        if args.add_all {
            let add = git(repo, &["add", "-A"], LOCAL_TIMEOUT).await?;
            if !add.success() {
                return Err(ToolError::execution(format!(
                    "Failed to add files: {}",
                    add.stderr.trim()
                )));
            }
        }
        let out = check(
            git(repo, &["commit", "-m", &args.message], LOCAL_TIMEOUT).await?,
            "Commit failed",
        )?;
        Ok(json!({ "success": true, "output": out.stdout, "message": args.message }))
    }
}

// ============================================================================
// branch
// ============================================================================

pub struct BranchTool {
    spec: ToolSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum BranchAction {
    List,
    Create,
    Switch,
    Delete,
}

#[derive(Deserialize)]
struct BranchArgs {
    action: BranchAction,
    #[serde(alias = "branch_name")]
    name: Option<String>,
    repo_path: Option<String>,
}

impl Default for BranchTool {
    fn default() -> Self {
        let spec = ToolSpec::new("branch", "List, create, switch, or delete git branches")
            .with_parameters(
                ParameterSchema::object()
                    .property(
                        "action",
                        PropertySchema::string()
                            .description("Action to perform")
                            .enum_values(vec!["list", "create", "switch", "delete"]),
                    )
                    .property(
                        "name",
                        PropertySchema::string()
                            .description("Branch name (required for create/switch/delete)"),
                    )
                    .property("repo_path", repo_path_property())
                    .required(vec!["action"]),
            );
        Self { spec }
    }
}

#[async_trait]
impl Tool for BranchTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: BranchArgs = parse_args(args)?;
        let repo = args.repo_path.as_deref();

        let (label, verb) = match args.action {
            BranchAction::List => return list_branches(repo).await,
            BranchAction::Create => ("create", "created"),
            BranchAction::Switch => ("switch", "switched"),
            BranchAction::Delete => ("delete", "deleted"),
        };
        let Some(name) = args.name.as_deref().filter(|n| !n.is_empty()) else {
            return Err(ToolError::invalid_arguments(format!(
                "name required for {label} action"
            )));
        };
        let cmd: [&str; 3] = match args.action {
            BranchAction::Create => ["branch", "--", name],
            BranchAction::Switch => ["checkout", name, "--"],
            _ => ["branch", "-d", name],
        };
        check(git(repo, &cmd, LOCAL_TIMEOUT).await?, "git branch failed")?;
        Ok(json!({ "success": true, "branch": name, "action": verb }))
    }
}

async fn list_branches(repo: Option<&str>) -> Result<Value> {
    let out = check(git(repo, &["branch", "-a"], LOCAL_TIMEOUT).await?, "git branch failed")?;
    let branches: Vec<String> = non_empty_lines(&out.stdout)
        .into_iter()
        .map(|line| line.trim_start_matches("* ").to_string())
        .collect();
    Ok(json!({ "branches": branches, "output": out.stdout }))
}

// ============================================================================
// log
// ============================================================================

pub struct LogTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct LogArgs {
    repo_path: Option<String>,
    #[serde(default = "default_log_limit")]
    limit: u32,
    #[serde(default = "default_true")]
    oneline: bool,
}

fn default_log_limit() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for LogTool {
    fn default() -> Self {
        let spec = ToolSpec::new("log", "View git commit history")
            .with_parameters(
                ParameterSchema::object()
                    .property("repo_path", repo_path_property())
                    .property(
                        "limit",
                        PropertySchema::integer()
                            .description("Number of commits to show (default: 10)")
                            .default_value(10),
                    )
                    .property(
                        "oneline",
                        PropertySchema::boolean()
                            .description("Show one line per commit")
                            .default_value(true),
                    ),
            )
            .with_returns("{commits, count, output}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for LogTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: LogArgs = parse_args(args)?;
        let limit = format!("-{}", args.limit.max(1));
        let mut cmd = vec!["log", limit.as_str()];
        if args.oneline {
            cmd.push("--oneline");
        }
        let out = check(git(args.repo_path.as_deref(), &cmd, LOCAL_TIMEOUT).await?, "git log failed")?;
        let commits = non_empty_lines(&out.stdout);
        Ok(json!({ "count": commits.len(), "commits": commits, "output": out.stdout }))
    }
}

// ============================================================================
// push / pull
// ============================================================================

pub struct PushTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct RemoteArgs {
    repo_path: Option<String>,
    #[serde(default = "default_remote")]
    remote: String,
    branch: Option<String>,
    #[serde(default)]
    force: bool,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn remote_schema(branch_description: &str) -> ParameterSchema {
    ParameterSchema::object()
        .property("repo_path", repo_path_property())
        .property(
            "remote",
            PropertySchema::string()
                .description("Remote name (default: origin)")
                .default_value("origin"),
        )
        .property(
            "branch",
            PropertySchema::string().description(branch_description),
        )
}

impl Default for PushTool {
    fn default() -> Self {
        let spec = ToolSpec::new("push", "Push commits to remote repository").with_parameters(
            remote_schema("Branch to push (optional, defaults to current)").property(
                "force",
                PropertySchema::boolean()
                    .description("Force push (use with caution)")
                    .default_value(false),
            ),
        );
        Self { spec }
    }
}

#[async_trait]
impl Tool for PushTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: RemoteArgs = parse_args(args)?;
        let mut cmd = vec!["push", args.remote.as_str()];
        if let Some(branch) = args.branch.as_deref() {
            cmd.push(branch);
        }
        if args.force {
            cmd.push("--force");
        }
        let out = check(
            git(args.repo_path.as_deref(), &cmd, REMOTE_TIMEOUT).await?,
            "Push failed",
        )?;
        // git reports push progress on stderr
        Ok(json!({ "success": true, "output": format!("{}{}", out.stdout, out.stderr) }))
    }
}

pub struct PullTool {
    spec: ToolSpec,
}

impl Default for PullTool {
    fn default() -> Self {
        let spec = ToolSpec::new("pull", "Pull changes from remote repository")
            .with_parameters(remote_schema("Branch to pull (optional)"));
        Self { spec }
    }
}

#[async_trait]
impl Tool for PullTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: RemoteArgs = parse_args(args)?;
        let mut cmd = vec!["pull", args.remote.as_str()];
        if let Some(branch) = args.branch.as_deref() {
            cmd.push(branch);
        }
        let out = check(
            git(args.repo_path.as_deref(), &cmd, REMOTE_TIMEOUT).await?,
            "Pull failed",
        )?;
        Ok(json!({ "success": true, "output": out.stdout }))
    }
}

pub fn git_server() -> DiscoveryServer {
    DiscoveryServer::new(SERVER_NAME, "Git version control operations")
        .with_tool(Arc::new(StatusTool::default()))
        .with_tool(Arc::new(DiffTool::default()))
        .with_tool(Arc::new(CommitTool::default()))
        .with_tool(Arc::new(BranchTool::default()))
        .with_tool(Arc::new(LogTool::default()))
        .with_tool(Arc::new(PushTool::default()))
        .with_tool(Arc::new(PullTool::default()))
}
