// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process fakes for the orchestrator's two injected collaborators,
//! matching the adapters crate's `Fake*` convention: scripted responses
//! recorded up front, calls recorded for assertions, no real transport or
//! subprocess.

use crate::orchestrator::{FixtureServer, RunnerFactory};
use async_trait::async_trait;
use hostdrv_adapters::{FakeRunnerInvoker, RunnerError, RunnerInvoker};
use hostdrv_core::FixtureName;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Default)]
struct FixtureServerInner {
    setup_responses: HashMap<String, VecDeque<Result<(), String>>>,
    teardown_responses: HashMap<String, VecDeque<Result<(), String>>>,
    setup_calls: Vec<String>,
    teardown_calls: Vec<String>,
}

/// Fake [`FixtureServer`]: script a setup/teardown failure for a given
/// fixture name, otherwise every call succeeds.
#[derive(Clone, Default)]
pub struct FakeFixtureServer {
    inner: Arc<Mutex<FixtureServerInner>>,
}

impl FakeFixtureServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_setup_err(&self, fixture: &str, error: impl Into<String>) {
        self.inner.lock().setup_responses.entry(fixture.to_string()).or_default().push_back(Err(error.into()));
    }

    pub fn script_teardown_err(&self, fixture: &str, error: impl Into<String>) {
        self.inner.lock().teardown_responses.entry(fixture.to_string()).or_default().push_back(Err(error.into()));
    }

    pub fn setup_calls(&self) -> Vec<String> {
        self.inner.lock().setup_calls.clone()
    }

    pub fn teardown_calls(&self) -> Vec<String> {
        self.inner.lock().teardown_calls.clone()
    }
}

#[async_trait]
impl FixtureServer for FakeFixtureServer {
    async fn setup(&self, fixture: &FixtureName) -> Result<(), String> {
        let mut inner = self.inner.lock();
        inner.setup_calls.push(fixture.as_str().to_string());
        if let Some(queue) = inner.setup_responses.get_mut(fixture.as_str()) {
            if let Some(resp) = queue.pop_front() {
                return resp;
            }
        }
        Ok(())
    }

    async fn teardown(&self, fixture: &FixtureName) -> Result<(), String> {
        let mut inner = self.inner.lock();
        inner.teardown_calls.push(fixture.as_str().to_string());
        if let Some(queue) = inner.teardown_responses.get_mut(fixture.as_str()) {
            if let Some(resp) = queue.pop_front() {
                return resp;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct RunnerFactoryInner {
    local_queue: VecDeque<FakeRunnerInvoker>,
    remote_queue: VecDeque<FakeRunnerInvoker>,
    local_calls: Vec<Vec<u8>>,
    remote_calls: Vec<Vec<u8>>,
}

/// Fake [`RunnerFactory`]: vends one pre-scripted [`FakeRunnerInvoker`] per
/// `local_runner`/`remote_runner` call, in the order they were pushed. A
/// call with an empty queue gets a default (empty, successful) invoker
/// rather than failing, since most tests only care about one chunk at a
/// time and pre-stocking every call would be needless ceremony.
#[derive(Clone, Default)]
pub struct FakeRunnerFactory {
    inner: Arc<Mutex<RunnerFactoryInner>>,
}

impl FakeRunnerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the invoker a future `local_runner` call will receive.
    pub fn push_local(&self, invoker: FakeRunnerInvoker) {
        self.inner.lock().local_queue.push_back(invoker);
    }

    /// Queues the invoker a future `remote_runner` call will receive.
    pub fn push_remote(&self, invoker: FakeRunnerInvoker) {
        self.inner.lock().remote_queue.push_back(invoker);
    }

    pub fn local_calls(&self) -> Vec<Vec<u8>> {
        self.inner.lock().local_calls.clone()
    }

    pub fn remote_calls(&self) -> Vec<Vec<u8>> {
        self.inner.lock().remote_calls.clone()
    }
}

#[async_trait]
impl RunnerFactory for FakeRunnerFactory {
    async fn local_runner(&self, stdin_json: Vec<u8>) -> Result<Box<dyn RunnerInvoker>, RunnerError> {
        let mut invoker = {
            let mut inner = self.inner.lock();
            inner.local_calls.push(stdin_json.clone());
            inner.local_queue.pop_front().unwrap_or_default()
        };
        invoker.start(stdin_json).await?;
        Ok(Box::new(invoker))
    }

    async fn remote_runner(&self, stdin_json: Vec<u8>) -> Result<Box<dyn RunnerInvoker>, RunnerError> {
        let mut invoker = {
            let mut inner = self.inner.lock();
            inner.remote_calls.push(stdin_json.clone());
            inner.remote_queue.pop_front().unwrap_or_default()
        };
        invoker.start(stdin_json).await?;
        Ok(Box::new(invoker))
    }
}
