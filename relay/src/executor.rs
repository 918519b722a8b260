//! Command execution
//!
//! Commands are handed to the shell verbatim (`<shell> -c <command>`) so pipes,
//! redirects and globbing behave as they would at a prompt. Output is stdout
//! followed by stderr.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::types::{ExecutionResult, RelayConfig};

/// Something that can run a shell command string
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> ExecutionResult;
}

/// Runs commands through a real shell
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
    timeout: Option<Duration>,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            shell: shell.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            config.shell.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str) -> ExecutionResult {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // The shell leads its own process group so a timeout can take down
        // subshells, pipeline stages and background jobs along with it
        #[cfg(unix)]
        cmd.process_group(0);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!("Failed to start {}: {}", self.shell, e);
                return ExecutionResult::spawn_failed(format!(
                    "Failed to start {}: {}",
                    self.shell, e
                ));
            }
        };
        let pgid = child.id();
        let wait = child.wait_with_output();

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(output) => output,
                Err(_elapsed) => {
                    if let Some(pgid) = pgid {
                        kill_process_group(pgid);
                    }
                    tracing::warn!(command = %command, timeout = ?limit, "Command timed out");
                    return ExecutionResult::timed_out(limit);
                }
            },
            None => wait.await,
        };

        match output {
            Ok(output) => {
                let code = output.status.code();
                tracing::debug!(exit_code = ?code, "Command finished");
                ExecutionResult::completed(&output.stdout, &output.stderr, code)
            }
            Err(e) => {
                tracing::error!("Failed to collect output from {}: {}", self.shell, e);
                ExecutionResult::spawn_failed(format!(
                    "Failed to collect output from {}: {}",
                    self.shell, e
                ))
            }
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    // SAFETY: killpg only sends a signal; a group with no members left yields ESRCH
    let rc = unsafe { libc::killpg(pgid as libc::pid_t, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(
            pgid,
            "killpg failed: {}",
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}
