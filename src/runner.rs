//! Single point of external-process invocation.
//!
//! Everything the rest of the crate knows about the outside world flows
//! through [`CommandRunner`], so the orchestration logic can be written and
//! tested against a pure `(command) -> outcome` function.

use std::{borrow::Cow, process::Stdio, time::Duration};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Error raised when the child process could not be run at all.
///
/// A non-zero exit is NOT an error at this layer; callers inspect
/// [`CmdOutput`] explicitly.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("'{command}' did not exit within {timeout:?}")]
    TimedOut { command: String, timeout: Duration },
}

/// Captured outcome of one external-process invocation.
#[derive(Debug, Clone, Default)]
pub struct CmdOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn stderr_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Spawns an external command and captures both output streams fully.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput, RunnerError>;
}

/// Real runner backed by `tokio::process`.
///
/// Imposes a per-invocation deadline so a wedged child cannot stall the
/// whole poll loop; the child is killed when the deadline passes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput, RunnerError> {
        debug!(%program, ?args, "spawning external command");

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| RunnerError::TimedOut {
                command: describe(program, args),
                timeout: self.timeout,
            })?
            .map_err(|source| RunnerError::Spawn {
                command: describe(program, args),
                source,
            })?;

        Ok(CmdOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn describe(program: &str, args: &[&str]) -> String {
    let mut command = program.to_string();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}
