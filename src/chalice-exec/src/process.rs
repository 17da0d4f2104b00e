//! Process-group spawning, teardown and output collection.

use std::sync::Arc;
use std::time::Duration;

use chalice_common::CapturedOutput;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Put the child in a process group of its own so the whole subtree can be
/// signalled at once.
pub fn isolate_process_group(cmd: &mut Command) {
    #[cfg(unix)]
    {
        // SAFETY: setsid is async-signal-safe and only detaches the child
        // into a new session and process group.
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    #[cfg(windows)]
    {
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }
}

/// Kill the child and every process in its group (POSIX) or tree (Windows).
///
/// `spawn_pid` is the id captured at spawn time: the group can outlive a
/// leader that has already been reaped. No graceful phase, the group gets
/// SIGKILL directly.
pub fn terminate_tree(child: &mut Child, spawn_pid: Option<u32>) {
    let Some(pid) = spawn_pid.or_else(|| child.id()) else {
        return;
    };

    #[cfg(unix)]
    {
        // SAFETY: the child called setsid, so its pid is also its process
        // group id; signalling a stale group is harmless (ESRCH).
        let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if rc == -1 {
            debug!(pid, error = %std::io::Error::last_os_error(), "killpg failed");
        }
    }

    #[cfg(windows)]
    {
        let status = std::process::Command::new("taskkill")
            .args(["/T", "/F", "/PID", &pid.to_string()])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
        if let Err(err) = status {
            debug!(pid, error = %err, "taskkill failed");
        }
    }

    if let Err(err) = child.start_kill() {
        debug!(pid, error = %err, "start_kill failed");
    }
}

/// Wait, up to `limit`, until no process remains in group `pgid`.
#[cfg(unix)]
pub async fn wait_for_group_exit(pgid: u32, limit: Duration) {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        // SAFETY: signal 0 performs the permission and existence check only.
        let alive = unsafe { libc::killpg(pgid as libc::pid_t, 0) } == 0;
        if !alive {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(pgid, "Process group still present after teardown");
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[cfg(not(unix))]
pub async fn wait_for_group_exit(_pgid: u32, _limit: Duration) {}

/// Drains one child stream into a shared, capped buffer.
///
/// The buffer stays readable after the reader is abandoned, so a killed
/// child's already-written output can still be reported.
pub struct OutputCollector {
    buffer: Arc<Mutex<CapturedOutput>>,
    handle: Option<JoinHandle<()>>,
}

impl OutputCollector {
    pub fn spawn<R>(reader: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(CapturedOutput::new()));
        let handle = reader.map(|mut reader| {
            let buffer = buffer.clone();
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match reader.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buffer.lock().await.push(&chunk[..n]),
                    }
                }
            })
        });
        Self { buffer, handle }
    }

    /// Wait for EOF on the stream.
    pub async fn finished(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            let _ = handle.await;
            self.handle = None;
        }
    }

    /// Wait for EOF for at most `grace`, then stop reading.
    pub async fn finish_within(&mut self, grace: Duration) {
        if let Some(mut handle) = self.handle.take()
            && tokio::time::timeout(grace, &mut handle).await.is_err()
        {
            handle.abort();
        }
    }

    /// Decoded contents collected so far.
    pub async fn text(&self) -> String {
        self.buffer.lock().await.to_text()
    }
}
