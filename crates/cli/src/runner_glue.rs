// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production wiring for the engine's two injected orchestrator
//! collaborators: a [`RunnerFactory`] that spawns real local/remote runner
//! subprocesses, and a fixture server.
//!
//! The remote fixture setup/teardown RPC's wire format is not part of the
//! enumerated runner modes (spec.md §6 lists exactly seven `RunnerMode`
//! values, none of them fixture setup/teardown) — it is, like the two
//! runner binaries themselves, an external collaborator this crate does not
//! own the contract for. A deployment that needs real remote fixtures
//! supplies its own [`FixtureServer`]; this binary ships a no-op default so
//! fixture-independent runs work out of the box.

use async_trait::async_trait;
use hostdrv_adapters::{spawn_local, spawn_remote, RunnerError, RunnerInvoker};
use hostdrv_core::{FixtureName, OrchestratorConfig, ProxyMode};
use hostdrv_engine::orchestrator::{FixtureServer, RunnerFactory};
use hostdrv_shell::{build_invocation, EnvAssignment};

/// Spawns the local runner over SSH and the remote runner as a direct host
/// subprocess, per spec.md §4.2/§6.
pub struct RealRunnerFactory {
    target_address: String,
    ssh_key_file: String,
    local_runner_path: String,
    remote_runner_path: String,
    proxy: ProxyMode,
}

impl RealRunnerFactory {
    pub fn new(config: &OrchestratorConfig) -> Self {
        Self {
            target_address: config.target_address.clone(),
            ssh_key_file: config.ssh_key_file.clone(),
            local_runner_path: config.local_runner_path.clone(),
            remote_runner_path: config.remote_runner_path.clone(),
            proxy: config.proxy,
        }
    }

    fn proxy_vars(&self) -> Vec<EnvAssignment> {
        if self.proxy != ProxyMode::Env {
            return Vec::new();
        }
        ["HTTP_PROXY", "HTTPS_PROXY", "NO_PROXY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| EnvAssignment::new(*name, value)))
            .collect()
    }
}

#[async_trait]
impl RunnerFactory for RealRunnerFactory {
    async fn local_runner(&self, stdin_json: Vec<u8>) -> Result<Box<dyn RunnerInvoker>, RunnerError> {
        let proxy_vars = self.proxy_vars();
        let mut invoker = spawn_local(&self.target_address, &self.ssh_key_file, &self.local_runner_path, &proxy_vars, &[])?;
        invoker.start(stdin_json).await?;
        Ok(invoker)
    }

    async fn remote_runner(&self, stdin_json: Vec<u8>) -> Result<Box<dyn RunnerInvoker>, RunnerError> {
        let mut invoker = spawn_remote(&self.remote_runner_path, &[])?;
        invoker.start(stdin_json).await?;
        Ok(invoker)
    }
}

/// Renders the local-runner invocation line for logging, without actually
/// spawning it — used to echo what `RealRunnerFactory` is about to run.
pub fn describe_local_invocation(config: &OrchestratorConfig, args: &[String]) -> String {
    let argv = build_invocation(&[], &config.local_runner_path, args);
    hostdrv_shell::render_invocation(&argv)
}

/// Default [`FixtureServer`]: every remote fixture is treated as already
/// set up. Correct for fixture-independent runs; a deployment with real
/// remote fixtures must supply its own implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFixtureServer;

#[async_trait]
impl FixtureServer for NoopFixtureServer {
    async fn setup(&self, _fixture: &FixtureName) -> Result<(), String> {
        Ok(())
    }

    async fn teardown(&self, _fixture: &FixtureName) -> Result<(), String> {
        Ok(())
    }
}
