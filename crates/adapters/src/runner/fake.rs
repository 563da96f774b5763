// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process fake runner invoker: a scripted sequence of control messages
//! (or a single oneshot payload) with no real subprocess, letting the
//! control-stream reader and orchestrator be tested deterministically.

use super::{RunnerError, RunnerExit, RunnerInvoker};
use async_trait::async_trait;
use hostdrv_core::ControlMessage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Inner {
    messages: VecDeque<ControlMessage>,
    oneshot: Option<Result<Vec<u8>, RunnerError>>,
    stdin_written: Vec<u8>,
    exit: RunnerExit,
    stderr: String,
    cancelled: bool,
    /// If set, `next_message` stalls forever past this many messages,
    /// simulating a heartbeat-watchdog-triggering hang.
    stall_after: Option<usize>,
    delivered: usize,
    /// If set, `wait` never resolves on its own, simulating a runner that
    /// hangs after closing its control stream so the caller's timeout fires.
    hang_on_wait: bool,
}

/// Fake [`RunnerInvoker`]: script a `RunTests` message sequence or a
/// one-shot payload up front, then drive it through the real reader logic.
#[derive(Clone)]
pub struct FakeRunnerInvoker {
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeRunnerInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRunnerInvoker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                exit: RunnerExit { success: true, code: Some(0) },
                ..Default::default()
            })),
        }
    }

    pub fn push_message(&self, msg: ControlMessage) {
        self.inner.lock().messages.push_back(msg);
    }

    pub fn with_messages(messages: Vec<ControlMessage>) -> Self {
        let fake = Self::new();
        fake.inner.lock().messages = messages.into();
        fake
    }

    pub fn with_oneshot(payload: Vec<u8>) -> Self {
        let fake = Self::new();
        fake.inner.lock().oneshot = Some(Ok(payload));
        fake
    }

    pub fn set_exit(&self, success: bool, code: Option<i32>) {
        self.inner.lock().exit = RunnerExit { success, code };
    }

    pub fn set_stderr(&self, stderr: impl Into<String>) {
        self.inner.lock().stderr = stderr.into();
    }

    /// Simulates a stall: `next_message` returns `Pending` forever after
    /// `count` messages, so a heartbeat watchdog under test can fire.
    pub fn stall_after(&self, count: usize) {
        self.inner.lock().stall_after = Some(count);
    }

    /// Simulates a runner that hangs after the control stream closes, so a
    /// caller-provided wait timeout is the only thing that bounds `wait`.
    pub fn hang_on_wait(&self) {
        self.inner.lock().hang_on_wait = true;
    }

    pub fn stdin_written(&self) -> Vec<u8> {
        self.inner.lock().stdin_written.clone()
    }

    pub fn was_cancelled(&self) -> bool {
        self.inner.lock().cancelled
    }
}

#[async_trait]
impl RunnerInvoker for FakeRunnerInvoker {
    async fn start(&mut self, stdin_json: Vec<u8>) -> Result<(), RunnerError> {
        self.inner.lock().stdin_written = stdin_json;
        Ok(())
    }

    async fn read_oneshot(&mut self) -> Result<Vec<u8>, RunnerError> {
        let mut inner = self.inner.lock();
        inner.oneshot.take().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn next_message(&mut self) -> Result<Option<ControlMessage>, RunnerError> {
        let stall = {
            let inner = self.inner.lock();
            inner.stall_after.map(|n| inner.delivered >= n).unwrap_or(false)
        };
        if stall {
            // Never resolves: the reader's heartbeat-timeout select! arm wins.
            std::future::pending::<()>().await;
            unreachable!();
        }
        let mut inner = self.inner.lock();
        inner.delivered += 1;
        Ok(inner.messages.pop_front())
    }

    async fn wait(&mut self, timeout: Duration) -> Result<RunnerExit, RunnerError> {
        if self.inner.lock().hang_on_wait {
            tokio::time::sleep(timeout).await;
            return Err(RunnerError::Timeout);
        }
        Ok(self.inner.lock().exit)
    }

    fn cancel(&mut self) {
        self.inner.lock().cancelled = true;
    }

    fn stderr_tail(&self) -> String {
        self.inner.lock().stderr.clone()
    }
}
