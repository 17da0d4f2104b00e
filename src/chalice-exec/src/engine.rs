//! The execution engine.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chalice_common::config::ExecSection;
use chalice_common::sanitized_env;
use chalice_common::timeout::{DEFAULT_EXEC_TIMEOUT_SECS, OUTPUT_DRAIN_GRACE_MS};
use chalice_execpolicy::SafetyPolicy;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::language::{GuestLanguage, Interpreter};
use crate::process::{OutputCollector, isolate_process_group, terminate_tree, wait_for_group_exit};
use crate::request::ExecutionRequest;
use crate::result::ExecutionResult;
use crate::script::ScriptFile;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Where script files are created; system temp dir when `None`.
    pub scratch_dir: Option<PathBuf>,
    /// Withhold credential-looking environment variables from guests.
    pub scrub_environment: bool,
    /// Timeout used by callers that do not supply one.
    pub default_timeout_secs: u64,
    pub python: Option<PathBuf>,
    pub node: Option<PathBuf>,
    pub shell: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            scrub_environment: true,
            default_timeout_secs: DEFAULT_EXEC_TIMEOUT_SECS,
            python: None,
            node: None,
            shell: None,
        }
    }
}

impl From<&ExecSection> for EngineConfig {
    fn from(section: &ExecSection) -> Self {
        Self {
            scratch_dir: section.scratch_dir.clone(),
            scrub_environment: section.scrub_environment,
            default_timeout_secs: section.default_timeout_secs,
            python: section.python.clone(),
            node: section.node.clone(),
            shell: section.shell.clone(),
        }
    }
}

/// Runs guest code in child processes.
///
/// Per call: `Created -> Spawned -> {Completed | TimedOut} -> Reclaimed`, or
/// `Created -> Blocked` for shell commands the policy refuses. The script
/// file is created before spawn and deleted only after the process group is
/// gone, on every path.
#[derive(Debug, Clone)]
pub struct ExecutionEngine {
    config: EngineConfig,
    policy: Arc<SafetyPolicy>,
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default(), Arc::new(SafetyPolicy::new()))
    }
}

impl ExecutionEngine {
    pub fn new(config: EngineConfig, policy: Arc<SafetyPolicy>) -> Self {
        Self { config, policy }
    }

    /// A request pre-filled with the configured default timeout.
    pub fn request(&self, language: GuestLanguage, source: impl Into<String>) -> ExecutionRequest {
        ExecutionRequest::new(language, source)
            .with_timeout_secs(self.config.default_timeout_secs as i64)
    }

    /// Resolve the interpreter for `language`, honouring overrides.
    pub fn interpreter(&self, language: GuestLanguage) -> Result<Interpreter, String> {
        let override_path = match language {
            GuestLanguage::Python => self.config.python.as_deref(),
            GuestLanguage::JavaScript => self.config.node.as_deref(),
            GuestLanguage::Shell => self.config.shell.as_deref(),
        };
        Interpreter::resolve(language, override_path)
    }

    /// Run one request to completion. Never panics and never returns early
    /// with a live child.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        if request.language == GuestLanguage::Shell
            && let Err(err) = self.policy.check_shell(&request.source)
        {
            if err.is_blocked() {
                warn!(command = %request.source, reason = %err, "Blocked shell command");
                return ExecutionResult::Blocked {
                    reason: err.to_string(),
                };
            }
            return ExecutionResult::engine_error(err.to_string());
        }

        let interpreter = match self.interpreter(request.language) {
            Ok(interpreter) => interpreter,
            Err(message) => return ExecutionResult::engine_error(message),
        };
        debug!(
            language = %request.language,
            interpreter = %interpreter.program.display(),
            timeout_secs = request.timeout_secs(),
            "Resolved interpreter"
        );

        if let Some(dir) = &request.working_dir
            && !dir.is_dir()
        {
            return ExecutionResult::engine_error(format!(
                "Working directory does not exist: {}",
                dir.display()
            ));
        }

        let script = if request.language.uses_script_file() {
            match ScriptFile::create(
                self.config.scratch_dir.as_deref(),
                request.language,
                &request.source,
            ) {
                Ok(script) => Some(script),
                Err(err) => {
                    return ExecutionResult::engine_error(format!(
                        "Failed to write script file: {err}"
                    ));
                }
            }
        } else {
            None
        };

        let target: OsString = match &script {
            Some(script) => script.path().as_os_str().to_owned(),
            None => OsString::from(&request.source),
        };
        let cmd = self.build_command(&interpreter, &target, &request);
        let result = self.run(cmd, &request).await;

        // The process group is gone by now
        if let Some(script) = script {
            script.remove();
        }
        result
    }

    fn build_command(
        &self,
        interpreter: &Interpreter,
        target: &OsString,
        request: &ExecutionRequest,
    ) -> Command {
        let mut cmd = Command::new(&interpreter.program);
        cmd.args(interpreter.args_for(target))
            .stdin(if request.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }

        if self.config.scrub_environment {
            cmd.env_clear();
            cmd.envs(sanitized_env());
        }
        if request.language == GuestLanguage::Python {
            // Keep partial output visible if the run is killed
            cmd.env("PYTHONUNBUFFERED", "1");
        }

        isolate_process_group(&mut cmd);
        cmd
    }

    async fn run(&self, mut cmd: Command, request: &ExecutionRequest) -> ExecutionResult {
        let started = Instant::now();
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return ExecutionResult::engine_error(format!(
                    "Failed to start {} interpreter: {err}",
                    request.language.display_name()
                ));
            }
        };
        let pid = child.id();
        debug!(?pid, language = %request.language, "Spawned guest process");

        let mut stdout = OutputCollector::spawn(child.stdout.take());
        let mut stderr = OutputCollector::spawn(child.stderr.take());

        if let (Some(mut pipe), Some(payload)) = (child.stdin.take(), request.stdin.clone()) {
            tokio::spawn(async move {
                // A child that exits without reading closes the pipe; ignore EPIPE
                let _ = pipe.write_all(payload.as_bytes()).await;
                let _ = pipe.shutdown().await;
            });
        }

        let waited = tokio::time::timeout(request.timeout(), async {
            let status = child.wait().await;
            stdout.finished().await;
            stderr.finished().await;
            status
        })
        .await;

        match waited {
            Ok(Ok(status)) => {
                let duration = started.elapsed();
                let exit_code = exit_code_of(status);
                debug!(?pid, exit_code, ?duration, "Guest process exited");
                ExecutionResult::Completed {
                    exit_code,
                    stdout: stdout.text().await,
                    stderr: stderr.text().await,
                    duration,
                }
            }
            Ok(Err(err)) => {
                terminate_tree(&mut child, pid);
                ExecutionResult::engine_error(format!("Failed to wait for guest process: {err}"))
            }
            Err(_) => {
                warn!(
                    ?pid,
                    timeout_secs = request.timeout_secs(),
                    "Execution timed out, killing process group"
                );
                let grace = Duration::from_millis(OUTPUT_DRAIN_GRACE_MS);
                terminate_tree(&mut child, pid);
                let _ = tokio::time::timeout(grace, child.wait()).await;
                if let Some(pgid) = pid {
                    wait_for_group_exit(pgid, grace).await;
                }
                stdout.finish_within(grace).await;
                stderr.finish_within(grace).await;

                ExecutionResult::TimedOut {
                    partial_stdout: stdout.text().await,
                    partial_stderr: stderr.text().await,
                    timeout_secs: request.timeout_secs(),
                }
            }
        }
    }
}

/// Exit code, or the negated signal number when killed by a signal.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
