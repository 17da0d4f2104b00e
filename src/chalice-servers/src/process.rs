//! Program-mode subprocesses: no shell, argv passed as-is.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use chalice_common::CapturedOutput;
use chalice_exec::{isolate_process_group, terminate_tree};
use chalice_tools::ToolError;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of a finished program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramOutput {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProgramOutput {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }

    /// Stderr if there is any, else `fallback`.
    pub fn error_message(&self, fallback: &str) -> String {
        match self.stderr.trim() {
            "" => fallback.to_string(),
            stderr => stderr.to_string(),
        }
    }
}

/// Run `program args...` in `cwd`, killing its process group after `timeout`.
pub async fn run_program<S: AsRef<str>>(
    program: &str,
    args: &[S],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<ProgramOutput, ToolError> {
    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(AsRef::as_ref))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        if !dir.is_dir() {
            return Err(ToolError::Engine(format!(
                "Working directory does not exist: {}",
                dir.display()
            )));
        }
        cmd.current_dir(dir);
    }
    isolate_process_group(&mut cmd);

    let mut child = cmd.spawn().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            ToolError::Engine(format!("Command not found: {program}"))
        } else {
            ToolError::Engine(format!("Failed to start {program}: {err}"))
        }
    })?;
    let pid = child.id();
    debug!(program, ?pid, "Spawned program");

    let mut stdout = tokio::spawn(drain(child.stdout.take()));
    let mut stderr = tokio::spawn(drain(child.stderr.take()));

    let waited = tokio::time::timeout(timeout, async {
        let status = child.wait().await?;
        let out = (&mut stdout).await.unwrap_or_default();
        let err = (&mut stderr).await.unwrap_or_default();
        Ok::<_, std::io::Error>((status, out, err))
    })
    .await;

    match waited {
        Ok(Ok((status, out, err))) => Ok(ProgramOutput {
            return_code: status.code().unwrap_or(-1),
            stdout: out.to_text(),
            stderr: err.to_text(),
        }),
        Ok(Err(err)) => {
            terminate_tree(&mut child, pid);
            Err(ToolError::Engine(format!("Failed to wait for {program}: {err}")))
        }
        Err(_) => {
            warn!(program, ?pid, "Program timed out, killing process group");
            terminate_tree(&mut child, pid);
            stdout.abort();
            stderr.abort();
            Err(ToolError::Timeout(format!(
                "Command timed out after {} seconds",
                timeout.as_secs()
            )))
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> CapturedOutput {
    let mut captured = CapturedOutput::new();
    let Some(mut reader) = reader else {
        return captured;
    };
    let mut chunk = [0u8; 8192];
    while let Ok(n) = reader.read(&mut chunk).await {
        if n == 0 {
            break;
        }
        captured.push(&chunk[..n]);
    }
    captured
}
