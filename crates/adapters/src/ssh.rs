// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSH session abstraction backing the connection cache (C1): a single live
//! session to one DUT, used both to run the local runner and to issue the
//! diagnostic/bookkeeping commands spec.md §6 enumerates (`boot_id`, `sync`,
//! `mkdir -p`, log fetches, artifact pulls).

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors raised by SSH session operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SshError {
    #[error("failed to dial {target}: {reason}")]
    DialFailed { target: String, reason: String },
    #[error("command `{command}` exited {code}: {stderr}")]
    CommandFailed { command: String, code: i32, stderr: String },
    #[error("i/o error: {0}")]
    Io(String),
    #[error("session is unhealthy and must be redialed")]
    Unhealthy,
}

/// Output of a single command run over the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// A live (or recently live) connection to one DUT.
///
/// `Clone` is cheap (an `Arc`-backed handle); health is tracked internally
/// so the connection cache can decide whether a redial is needed without
/// owning the transport details itself.
#[async_trait]
pub trait SshSession: Clone + Send + Sync + 'static {
    /// Runs `argv` as a single command on the DUT and waits for completion.
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, SshError>;

    /// Copies the remote directory tree at `remote_dir` into `local_dir`.
    async fn pull_dir(&self, remote_dir: &str, local_dir: &Path) -> Result<(), SshError>;

    /// `true` if the most recent operation through this session failed with
    /// an I/O error: the connection cache redials on the next `Conn` call.
    fn is_healthy(&self) -> bool;
}

/// Dials new [`SshSession`]s and reads the DUT's boot ID on first connect.
#[async_trait]
pub trait SshDialer: Clone + Send + Sync + 'static {
    type Session: SshSession;

    async fn dial(&self, target_address: &str, key_file: &str) -> Result<Self::Session, SshError>;
}

/// Reads the boot ID via the documented SSH command
/// (`cat /proc/sys/kernel/random/boot_id`), trimming trailing whitespace.
pub async fn read_boot_id<S: SshSession>(session: &S) -> Result<String, SshError> {
    let out = session
        .run(&["cat".to_string(), "/proc/sys/kernel/random/boot_id".to_string()])
        .await?;
    Ok(out.stdout_string().trim().to_string())
}

/// Issues `sync` on the DUT, per the per-test artifact-pull policy (§4.3).
pub async fn sync<S: SshSession>(session: &S) -> Result<(), SshError> {
    session.run(&["sync".to_string()]).await?;
    Ok(())
}

/// Issues `mkdir -p <dir>` on the DUT.
pub async fn mkdir_p<S: SshSession>(session: &S, dir: &str) -> Result<(), SshError> {
    session
        .run(&["mkdir".to_string(), "-p".to_string(), dir.to_string()])
        .await?;
    Ok(())
}

pub mod real;
pub use real::{RealSshDialer, RealSshSession};

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
