//! Untrusted shell command execution.
//!
//! [`ShellExecutor::run`] is the only way this crate runs a resolved
//! command. It applies a wall clock limit and nothing else: the command can
//! touch the filesystem, the network and any process the service user can.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Captured outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Process exit code; `-1` when killed by a signal or timed out.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// The wall clock limit was hit and the process was killed.
    pub timed_out: bool,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// Faults while launching or monitoring the process.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start {shell}: {source}")]
    Spawn {
        shell: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for command: {0}")]
    Wait(#[source] std::io::Error),
}

/// Runs command strings through the host shell.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    timeout: Duration,
    max_output_bytes: usize,
}

impl ShellExecutor {
    pub fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            max_output_bytes,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute `command` via `sh -c` (`cmd /C` on Windows).
    pub async fn run(&self, command: &str) -> Result<ExecutionResult, ExecError> {
        tracing::info!("Executing command: {}", command);

        // Determine shell based on OS
        let (shell, shell_arg) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let mut cmd = Command::new(shell);
        cmd.arg(shell_arg)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so a timeout can take down the whole pipeline.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd
            .spawn()
            .map_err(|source| ExecError::Spawn { shell, source })?;
        let pid = child.id();

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(ExecError::Wait)?,
            Err(_) => {
                // The child itself is killed on drop; this reaps its descendants.
                kill_process_group(pid);
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "Command timed out and was killed"
                );
                return Ok(ExecutionResult {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: true,
                });
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(exit_code, "Command finished");

        Ok(ExecutionResult {
            exit_code,
            stdout: truncate_output(&output.stdout, self.max_output_bytes),
            stderr: truncate_output(&output.stderr, self.max_output_bytes),
            timed_out: false,
        })
    }
}

/// SIGKILL every process in the group led by `pid`.
#[cfg(unix)]
pub(crate) fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    // SAFETY: plain syscall on a process group we created.
    let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(
            pid,
            error = %std::io::Error::last_os_error(),
            "killpg failed (group already gone?)"
        );
    }
}

#[cfg(not(unix))]
pub(crate) fn kill_process_group(_pid: Option<u32>) {}

/// Lossy UTF-8 decode, cut at `max` bytes on a char boundary.
fn truncate_output(bytes: &[u8], max: usize) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("\n... [output truncated]");
    }
    text
}
