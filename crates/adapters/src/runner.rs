// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner invoker (C2): one uniform way to start a local (SSH-proxied) or
//! remote (host subprocess) runner, feed it a JSON argument blob on stdin,
//! and read either a single JSON value or a framed control-message stream
//! from its stdout.
//!
//! Per the design notes, local vs. remote differ only in how the child
//! process is spawned (`ssh … exec env … <runnerPath>` vs. `<runnerPath>`
//! directly); both share one streaming implementation rather than each
//! re-implementing it, avoiding an inheritance-shaped split.

use async_trait::async_trait;
use hostdrv_core::ControlMessage;
use hostdrv_shell::{build_invocation, ordered_proxy_vars, EnvAssignment};
use hostdrv_wire::{read_control_message, ProtocolError};
use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

/// Errors raised while invoking or reading a runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn runner: {0}")]
    SpawnFailed(String),
    #[error("runner exited {code}: {stderr_field}")]
    RunnerExit { code: i32, stderr_field: String },
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("i/o error: {0}")]
    Io(String),
    #[error("timed out waiting for the runner to exit")]
    Timeout,
    #[error("runner was not started")]
    NotStarted,
}

/// Outcome of [`RunnerInvoker::wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerExit {
    pub success: bool,
    pub code: Option<i32>,
}

/// Uniform capability set for starting and draining a runner process,
/// regardless of whether it runs locally via SSH or as a host subprocess.
#[async_trait]
pub trait RunnerInvoker: Send {
    /// Spawns the process and writes `stdin_json` to its stdin, then closes
    /// stdin. Must be called exactly once before any other method.
    async fn start(&mut self, stdin_json: Vec<u8>) -> Result<(), RunnerError>;

    /// Reads stdout to completion and waits for exit, for the single-JSON
    /// modes (`GetDUTInfo`, `ListTests`, `ListFixtures`, …). On non-zero
    /// exit, the error carries the first comma-delimited field of stderr.
    async fn read_oneshot(&mut self) -> Result<Vec<u8>, RunnerError>;

    /// Reads the next framed control message from stdout (`RunTests` mode).
    /// Returns `Ok(None)` when stdout reaches EOF with no further frames.
    async fn next_message(&mut self) -> Result<Option<ControlMessage>, RunnerError>;

    /// Waits for the process to exit, bounded by `timeout`.
    async fn wait(&mut self, timeout: Duration) -> Result<RunnerExit, RunnerError>;

    /// Sends a kill signal to the child process (used on cancellation and
    /// max-failure short-circuit).
    fn cancel(&mut self);

    /// Stderr captured so far.
    fn stderr_tail(&self) -> String;
}

/// Extracts the first comma-delimited field of `stderr`, per the invoker's
/// error-forwarding rule (§4.2).
fn first_stderr_field(stderr: &str) -> String {
    stderr
        .lines()
        .next()
        .unwrap_or("")
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

struct ProcessRunner {
    child: Option<Child>,
    stdout: Option<BufReader<tokio::process::ChildStdout>>,
    stderr_buf: Arc<Mutex<String>>,
}

impl ProcessRunner {
    fn spawn(mut cmd: Command) -> Result<Self, RunnerError> {
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| RunnerError::SpawnFailed(e.to_string()))?;

        let stdout = child.stdout.take().map(BufReader::new);
        let stderr_buf = Arc::new(Mutex::new(String::new()));

        if let Some(mut stderr) = child.stderr.take() {
            let buf = stderr_buf.clone();
            tokio::spawn(async move {
                let mut data = Vec::new();
                if stderr.read_to_end(&mut data).await.is_ok() {
                    *buf.lock() = String::from_utf8_lossy(&data).into_owned();
                }
            });
        }

        Ok(Self { child: Some(child), stdout, stderr_buf })
    }
}

#[async_trait]
impl RunnerInvoker for ProcessRunner {
    async fn start(&mut self, stdin_json: Vec<u8>) -> Result<(), RunnerError> {
        let child = self.child.as_mut().ok_or(RunnerError::NotStarted)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&stdin_json).await.map_err(|e| RunnerError::Io(e.to_string()))?;
            stdin.shutdown().await.map_err(|e| RunnerError::Io(e.to_string()))?;
        }
        Ok(())
    }

    async fn read_oneshot(&mut self) -> Result<Vec<u8>, RunnerError> {
        let stdout = self.stdout.as_mut().ok_or(RunnerError::NotStarted)?;
        let mut data = Vec::new();
        stdout.read_to_end(&mut data).await.map_err(|e| RunnerError::Io(e.to_string()))?;
        let exit = self.wait(Duration::from_secs(600)).await?;
        if !exit.success {
            return Err(RunnerError::RunnerExit {
                code: exit.code.unwrap_or(-1),
                stderr_field: first_stderr_field(&self.stderr_tail()),
            });
        }
        Ok(data)
    }

    async fn next_message(&mut self) -> Result<Option<ControlMessage>, RunnerError> {
        let stdout = self.stdout.as_mut().ok_or(RunnerError::NotStarted)?;
        match read_control_message(stdout, Duration::from_secs(3600)).await {
            Ok(msg) => Ok(Some(msg)),
            Err(ProtocolError::ConnectionClosed) => Ok(None),
            Err(e) => Err(RunnerError::Protocol(e)),
        }
    }

    async fn wait(&mut self, timeout: Duration) -> Result<RunnerExit, RunnerError> {
        let child = self.child.as_mut().ok_or(RunnerError::NotStarted)?;
        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => Ok(RunnerExit { success: status.success(), code: status.code() }),
            Ok(Err(e)) => Err(RunnerError::Io(e.to_string())),
            Err(_) => Err(RunnerError::Timeout),
        }
    }

    fn cancel(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
    }

    fn stderr_tail(&self) -> String {
        self.stderr_buf.lock().clone()
    }
}

/// Builds the argv the local runner is invoked with: `ssh <target> -i
/// <key> exec env [KEY=VAL …] <runnerPath> <args…>`. Proxy vars are ordered
/// and quoted via [`hostdrv_shell`].
pub fn build_local_command(
    target_address: &str,
    key_file: &str,
    runner_path: &str,
    proxy_vars: &[EnvAssignment],
    args: &[String],
) -> Command {
    let ordered = ordered_proxy_vars(proxy_vars);
    let argv = build_invocation(&ordered, runner_path, args);
    let line = hostdrv_shell::render_invocation(&argv);

    let mut cmd = Command::new("ssh");
    cmd.arg("-i").arg(key_file).arg("-o").arg("BatchMode=yes").arg(target_address).arg(line);
    cmd
}

/// Builds the argv the remote (host-side) runner is invoked with: a direct
/// subprocess, no SSH wrapper and no proxy-variable injection (the remote
/// runner already runs in the host's own environment).
pub fn build_remote_command(runner_path: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(runner_path);
    cmd.args(args);
    cmd
}

/// Spawns the local runner invocation.
pub fn spawn_local(
    target_address: &str,
    key_file: &str,
    runner_path: &str,
    proxy_vars: &[EnvAssignment],
    args: &[String],
) -> Result<Box<dyn RunnerInvoker>, RunnerError> {
    let cmd = build_local_command(target_address, key_file, runner_path, proxy_vars, args);
    Ok(Box::new(ProcessRunner::spawn(cmd)?))
}

/// Spawns the remote (host-side) runner invocation.
pub fn spawn_remote(runner_path: &str, args: &[String]) -> Result<Box<dyn RunnerInvoker>, RunnerError> {
    let cmd = build_remote_command(runner_path, args);
    Ok(Box::new(ProcessRunner::spawn(cmd)?))
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
