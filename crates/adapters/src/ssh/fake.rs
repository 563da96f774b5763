// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process fake SSH session/dialer, matching the teacher's
//! `FakeSessionAdapter` convention: scripted responses recorded up front,
//! calls recorded for assertions, no real transport.

use super::{CommandOutput, SshError, SshSession};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One recorded invocation of [`SshSession::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCall {
    pub argv: Vec<String>,
}

#[derive(Default)]
struct Inner {
    /// Scripted response keyed by the first argv token (the command name),
    /// consumed in FIFO order; commands with no script return an empty
    /// success output.
    scripts: HashMap<String, std::collections::VecDeque<Result<CommandOutput, SshError>>>,
    calls: Vec<SshCall>,
    healthy: bool,
    /// Files the fake DUT "has", keyed by remote path, used by `pull_dir`.
    remote_files: HashMap<String, Vec<u8>>,
    dropped: bool,
}

/// Fake DUT session: script `run` responses by command name, record what
/// was called, and simulate connection drops for control-stream-reader and
/// diagnosis-engine tests.
#[derive(Clone)]
pub struct FakeSshSession {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeSshSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSshSession {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { healthy: true, ..Default::default() })),
        }
    }

    /// Queues a response for the next `run` call whose argv[0] matches `command`.
    pub fn script(&self, command: &str, response: Result<CommandOutput, SshError>) {
        self.inner
            .lock()
            .scripts
            .entry(command.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn script_ok(&self, command: &str, stdout: &str) {
        self.script(
            command,
            Ok(CommandOutput { stdout: stdout.as_bytes().to_vec(), stderr: String::new(), exit_code: 0 }),
        );
    }

    pub fn put_remote_file(&self, remote_path: &str, contents: &[u8]) {
        self.inner.lock().remote_files.insert(remote_path.to_string(), contents.to_vec());
    }

    pub fn calls(&self) -> Vec<SshCall> {
        self.inner.lock().calls.clone()
    }

    /// Simulates a mid-run SSH drop: the next `run`/`pull_dir` call fails
    /// with an I/O error and the session becomes unhealthy.
    pub fn drop_connection(&self) {
        let mut inner = self.inner.lock();
        inner.dropped = true;
        inner.healthy = false;
    }

    pub fn mark_healthy(&self) {
        let mut inner = self.inner.lock();
        inner.dropped = false;
        inner.healthy = true;
    }
}

#[async_trait]
impl SshSession for FakeSshSession {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, SshError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SshCall { argv: argv.to_vec() });
        if inner.dropped {
            return Err(SshError::Io("connection reset by peer".to_string()));
        }
        let Some(cmd) = argv.first() else {
            return Ok(CommandOutput::default());
        };
        if let Some(queue) = inner.scripts.get_mut(cmd) {
            if let Some(resp) = queue.pop_front() {
                if resp.is_err() {
                    inner.healthy = false;
                }
                return resp;
            }
        }
        Ok(CommandOutput::default())
    }

    async fn pull_dir(&self, remote_dir: &str, local_dir: &Path) -> Result<(), SshError> {
        let inner = self.inner.lock();
        if inner.dropped {
            return Err(SshError::Io("connection reset by peer".to_string()));
        }
        let files: Vec<(String, Vec<u8>)> = inner
            .remote_files
            .iter()
            .filter_map(|(path, contents)| {
                path.strip_prefix(remote_dir)
                    .map(|rel| (rel.trim_start_matches('/').to_string(), contents.clone()))
            })
            .collect();
        drop(inner);
        for (rel, contents) in files {
            let dest: PathBuf = if rel.is_empty() { local_dir.to_path_buf() } else { local_dir.join(&rel) };
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(|e| SshError::Io(e.to_string()))?;
            }
            std::fs::write(&dest, &contents).map_err(|e| SshError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.inner.lock().healthy
    }
}

/// Fake [`super::SshDialer`]: returns the same pre-built session for every
/// `dial` call (optionally failing a configured number of times first), so
/// connection-cache and diagnosis-engine tests can control exactly what
/// `dial` sees without a real transport.
#[derive(Clone, Default)]
pub struct FakeSshDialer {
    inner: Arc<Mutex<FakeDialerInner>>,
}

#[derive(Default)]
struct FakeDialerInner {
    session: Option<FakeSshSession>,
    fail_next: u32,
}

impl FakeSshDialer {
    pub fn new(session: FakeSshSession) -> Self {
        Self { inner: Arc::new(Mutex::new(FakeDialerInner { session: Some(session), fail_next: 0 })) }
    }

    /// The next `n` dial attempts fail before the configured session is
    /// returned, simulating the diagnosis engine's reconnect-poll loop.
    pub fn fail_next_dials(&self, n: u32) {
        self.inner.lock().fail_next = n;
    }
}

#[async_trait]
impl super::SshDialer for FakeSshDialer {
    type Session = FakeSshSession;

    async fn dial(&self, target_address: &str, _key_file: &str) -> Result<Self::Session, SshError> {
        let mut inner = self.inner.lock();
        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(SshError::DialFailed {
                target: target_address.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        let session = inner
            .session
            .clone()
            .ok_or_else(|| SshError::DialFailed { target: target_address.to_string(), reason: "no session configured".to_string() })?;
        // A successful dial always yields a freshly-healthy transport, even
        // if the underlying fake session had previously been marked dropped.
        session.mark_healthy();
        Ok(session)
    }
}
