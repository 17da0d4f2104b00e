//! `system` server: policy-checked commands, package managers and processes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chalice_common::clamp_exec_timeout;
use chalice_execpolicy::{PolicyError, SafetyPolicy};
use chalice_mcp::DiscoveryServer;
use chalice_tools::{
    ParameterSchema, PropertySchema, Result, Tool, ToolArgs, ToolError, ToolSpec, parse_args,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::process::run_program;

pub const SERVER_NAME: &str = "system";

const PACKAGE_TIMEOUT: Duration = Duration::from_secs(300);
const PROCESS_LIST_TIMEOUT: Duration = Duration::from_secs(10);

fn policy_error(err: PolicyError) -> ToolError {
    if err.is_blocked() {
        ToolError::blocked(err.to_string())
    } else {
        ToolError::Engine(err.to_string())
    }
}

// ============================================================================
// command
// ============================================================================

/// Runs one program without a shell after a program-mode policy check.
pub struct CommandTool {
    policy: Arc<SafetyPolicy>,
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct CommandArgs {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    timeout: Option<i64>,
    working_dir: Option<String>,
}

impl CommandTool {
    pub fn new(policy: Arc<SafetyPolicy>) -> Self {
        let spec = ToolSpec::new(
            "command",
            "Execute whitelisted system commands safely with output capture",
        )
        .with_parameters(
            ParameterSchema::object()
                .property("command", PropertySchema::string().description("Command to execute"))
                .property(
                    "args",
                    PropertySchema::array(PropertySchema::string())
                        .description("Command arguments"),
                )
                .property(
                    "timeout",
                    PropertySchema::integer()
                        .description("Timeout in seconds (default: 30)")
                        .default_value(30),
                )
                .property(
                    "working_dir",
                    PropertySchema::string()
                        .description("Working directory")
                        .default_value("."),
                )
                .required(vec!["command"]),
        )
        .with_returns("{success, stdout, stderr, return_code, command}");
        Self { policy, spec }
    }
}

#[async_trait]
impl Tool for CommandTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: CommandArgs = parse_args(args)?;

        // "git status" is accepted as program plus leading arguments
        let mut words = shlex::split(&args.command)
            .filter(|words| !words.is_empty())
            .ok_or_else(|| ToolError::invalid_arguments("command is empty or malformed"))?;
        let program = words.remove(0);
        words.extend(args.args);

        if let Err(err) = self.policy.check_program(&program) {
            warn!(program = %program, reason = %err, "Command refused by policy");
            return Err(policy_error(err));
        }

        let timeout = clamp_exec_timeout(args.timeout.unwrap_or(30));
        let dir = PathBuf::from(args.working_dir.as_deref().unwrap_or("."));
        let out = run_program(&program, &words, Some(&dir), Duration::from_secs(timeout)).await?;

        let mut command = vec![program];
        command.extend(words);
        Ok(json!({
            "success": out.success(),
            "stdout": out.stdout,
            "stderr": out.stderr,
            "return_code": out.return_code,
            "command": command.join(" "),
        }))
    }
}

// ============================================================================
// packages
// ============================================================================

pub struct PackagesTool {
    spec: ToolSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Manager {
    Pip,
    Npm,
    Yarn,
    Cargo,
    Go,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PackageAction {
    Install,
    Uninstall,
    List,
    Update,
    Search,
}

#[derive(Deserialize)]
struct PackagesArgs {
    manager: Manager,
    action: PackageAction,
    package: Option<String>,
    #[serde(default)]
    global: bool,
}

impl Default for PackagesTool {
    fn default() -> Self {
        let spec = ToolSpec::new(
            "packages",
            "Install, update, or list packages using pip, npm, yarn, cargo, or go",
        )
        .with_parameters(
            ParameterSchema::object()
                .property(
                    "manager",
                    PropertySchema::string()
                        .description("Package manager to use")
                        .enum_values(vec!["pip", "npm", "yarn", "cargo", "go"]),
                )
                .property(
                    "action",
                    PropertySchema::string()
                        .description("Action to perform")
                        .enum_values(vec!["install", "uninstall", "list", "update", "search"]),
                )
                .property(
                    "package",
                    PropertySchema::string()
                        .description("Package name (required for install/uninstall/search)"),
                )
                .property(
                    "global",
                    PropertySchema::boolean()
                        .description("Install globally (for npm/yarn)")
                        .default_value(false),
                )
                .required(vec!["manager", "action"]),
        );
        Self { spec }
    }
}

/// argv for a package operation, or an error for combinations a manager
/// does not support.
fn package_command(
    manager: Manager,
    action: PackageAction,
    package: Option<&str>,
    global: bool,
) -> Result<Vec<String>> {
    use PackageAction::*;

    let needs_package = |verb: &str| {
        package
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ToolError::invalid_arguments(format!("Package name required for {verb}")))
    };
    let unsupported = || -> Result<Vec<String>> {
        Err(ToolError::invalid_arguments(format!(
            "Unknown action for {manager:?}: {action:?}"
        )))
    };

    let argv: Vec<String> = match (manager, action) {
        (Manager::Pip, Install) => vec!["pip".into(), "install".into(), needs_package("install")?],
        (Manager::Pip, Uninstall) => vec![
            "pip".into(),
            "uninstall".into(),
            "-y".into(),
            needs_package("uninstall")?,
        ],
        (Manager::Pip, List) => vec!["pip".into(), "list".into()],
        (Manager::Pip, Update) => vec![
            "pip".into(),
            "install".into(),
            "--upgrade".into(),
            needs_package("update")?,
        ],
        (Manager::Pip, Search) => vec!["pip".into(), "search".into(), needs_package("search")?],

        (Manager::Npm, List) => vec![
            "npm".into(),
            "list".into(),
            (if global { "-g" } else { "--depth=0" }).into(),
        ],
        (Manager::Npm, Update) => {
            let mut argv = vec!["npm".to_string(), "update".to_string()];
            argv.extend(package.map(str::to_string));
            argv
        }
        (Manager::Npm, Search) => vec!["npm".into(), "search".into(), needs_package("search")?],
        (Manager::Npm, verb @ (Install | Uninstall)) => {
            let word = if verb == Install { "install" } else { "uninstall" };
            let mut argv = vec!["npm".to_string(), word.to_string()];
            if global {
                argv.push("-g".into());
            }
            argv.push(needs_package(word)?);
            argv
        }

        (Manager::Yarn, verb @ (Install | Uninstall)) => {
            let word = if verb == Install { "add" } else { "remove" };
            let mut argv = vec!["yarn".to_string()];
            if global {
                argv.push("global".into());
            }
            argv.push(word.into());
            argv.push(needs_package(if verb == Install { "install" } else { "uninstall" })?);
            argv
        }
        (Manager::Yarn, List) => vec!["yarn".into(), "list".into(), "--depth=0".into()],
        (Manager::Yarn, Update) => {
            let mut argv = vec!["yarn".to_string(), "upgrade".to_string()];
            argv.extend(package.map(str::to_string));
            argv
        }
        (Manager::Yarn, Search) => vec!["yarn".into(), "info".into(), needs_package("search")?],

        (Manager::Cargo, Install) => vec!["cargo".into(), "install".into(), needs_package("install")?],
        (Manager::Cargo, Uninstall) => vec![
            "cargo".into(),
            "uninstall".into(),
            needs_package("uninstall")?,
        ],
        (Manager::Cargo, List) => vec!["cargo".into(), "install".into(), "--list".into()],
        (Manager::Cargo, Update) => vec![
            "cargo".into(),
            "install".into(),
            "--force".into(),
            needs_package("update")?,
        ],
        (Manager::Cargo, Search) => vec!["cargo".into(), "search".into(), needs_package("search")?],

        (Manager::Go, Install) => vec![
            "go".into(),
            "install".into(),
            with_version(&needs_package("install")?),
        ],
        (Manager::Go, List) => vec!["go".into(), "list".into(), "-m".into(), "all".into()],
        (Manager::Go, Update) => vec!["go".into(), "get".into(), "-u".into(), needs_package("update")?],
        (Manager::Go, Uninstall | Search) => return unsupported(),
    };
    Ok(argv)
}

fn with_version(package: &str) -> String {
    if package.contains('@') {
        package.to_string()
    } else {
        format!("{package}@latest")
    }
}

#[async_trait]
impl Tool for PackagesTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: PackagesArgs = parse_args(args)?;
        let argv = package_command(args.manager, args.action, args.package.as_deref(), args.global)?;
        let out = run_program(&argv[0], &argv[1..], None, PACKAGE_TIMEOUT).await?;
        Ok(json!({
            "success": out.success(),
            "stdout": out.stdout,
            "stderr": out.stderr,
            "return_code": out.return_code,
            "command": argv.join(" "),
        }))
    }
}

// ============================================================================
// processes
// ============================================================================

pub struct ProcessesTool {
    spec: ToolSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProcessAction {
    List,
    Find,
}

#[derive(Deserialize)]
struct ProcessesArgs {
    action: ProcessAction,
    pattern: Option<String>,
}

impl Default for ProcessesTool {
    fn default() -> Self {
        let spec = ToolSpec::new("processes", "List or find running processes").with_parameters(
            ParameterSchema::object()
                .property(
                    "action",
                    PropertySchema::string()
                        .description("Action to perform")
                        .enum_values(vec!["list", "find"]),
                )
                .property(
                    "pattern",
                    PropertySchema::string().description("Process name pattern (for find action)"),
                )
                .required(vec!["action"]),
        );
        Self { spec }
    }
}

async fn process_table() -> Result<String> {
    let out = if cfg!(windows) {
        run_program::<&str>("tasklist", &[], None, PROCESS_LIST_TIMEOUT).await?
    } else {
        run_program("ps", &["aux"], None, PROCESS_LIST_TIMEOUT).await?
    };
    Ok(out.stdout)
}

#[async_trait]
impl Tool for ProcessesTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: ProcessesArgs = parse_args(args)?;
        match args.action {
            ProcessAction::List => Ok(json!({ "success": true, "processes": process_table().await? })),
            ProcessAction::Find => {
                let Some(pattern) = args.pattern.filter(|p| !p.is_empty()) else {
                    return Err(ToolError::invalid_arguments(
                        "Pattern required for find action",
                    ));
                };
                let table = process_table().await?;
                let matches: Vec<&str> = table.lines().filter(|line| line.contains(&pattern)).collect();
                Ok(json!({ "success": true, "count": matches.len(), "matches": matches }))
            }
        }
    }
}

pub fn system_server(policy: Arc<SafetyPolicy>) -> DiscoveryServer {
    DiscoveryServer::new(
        SERVER_NAME,
        "System commands, package management, and process operations",
    )
    .with_tool(Arc::new(CommandTool::new(policy)))
    .with_tool(Arc::new(PackagesTool::default()))
    .with_tool(Arc::new(ProcessesTool::default()))
}
