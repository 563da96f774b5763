// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real [`SshSession`]/[`SshDialer`] backed by shelling out to the `ssh`
//! binary, matching the teacher's convention of wrapping an external CLI
//! tool (`tmux`) rather than linking a transport library directly — the SSH
//! transport protocol itself is the external collaborator spec.md §1 names;
//! this module only owns argv construction and timeout/health bookkeeping.

use super::{CommandOutput, SshError, SshSession};
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

const SSH_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// One live SSH session: target address plus key file, shelled through the
/// system `ssh`/`scp` binaries. Health flips to unhealthy on the first I/O
/// error observed through it, per spec.md §4.1.
#[derive(Clone)]
pub struct RealSshSession {
    target_address: String,
    key_file: String,
    healthy: Arc<Mutex<bool>>,
}

impl RealSshSession {
    pub fn new(target_address: impl Into<String>, key_file: impl Into<String>) -> Self {
        Self {
            target_address: target_address.into(),
            key_file: key_file.into(),
            healthy: Arc::new(Mutex::new(true)),
        }
    }

    fn ssh_base_args(&self) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.key_file.clone(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            self.target_address.clone(),
        ]
    }

    fn mark_unhealthy(&self) {
        *self.healthy.lock() = false;
    }
}

#[async_trait]
impl SshSession for RealSshSession {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, SshError> {
        let mut cmd = Command::new("ssh");
        cmd.args(self.ssh_base_args());
        cmd.arg(hostdrv_shell::render_invocation(argv));

        let output = run_with_timeout(cmd, SSH_COMMAND_TIMEOUT, "ssh").await.map_err(|e| {
            self.mark_unhealthy();
            SshError::Io(e)
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(SshError::CommandFailed {
                command: argv.join(" "),
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }
        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: 0,
        })
    }

    async fn pull_dir(&self, remote_dir: &str, local_dir: &Path) -> Result<(), SshError> {
        std::fs::create_dir_all(local_dir).map_err(|e| SshError::Io(e.to_string()))?;
        let mut cmd = Command::new("scp");
        cmd.arg("-i").arg(&self.key_file);
        cmd.arg("-r");
        cmd.arg(format!("{}:{}/.", self.target_address, remote_dir));
        cmd.arg(local_dir);

        run_with_timeout(cmd, SSH_COMMAND_TIMEOUT, "scp").await.map_err(|e| {
            self.mark_unhealthy();
            SshError::Io(e)
        })?;
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        *self.healthy.lock()
    }
}

/// Dials [`RealSshSession`]s and reads the boot ID once per connection.
#[derive(Clone, Default)]
pub struct RealSshDialer;

#[async_trait]
impl super::SshDialer for RealSshDialer {
    type Session = RealSshSession;

    async fn dial(&self, target_address: &str, key_file: &str) -> Result<Self::Session, SshError> {
        let session = RealSshSession::new(target_address, key_file);
        // Dial-time liveness probe; any failure here is a dial failure, not
        // a post-connect health flip.
        session.run(&["true".to_string()]).await.map_err(|e| SshError::DialFailed {
            target: target_address.to_string(),
            reason: e.to_string(),
        })?;
        Ok(session)
    }
}
