// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level orchestrator (C7): drives one full test run end to end per
//! spec.md §4.7 — connect, optionally resolve skip reasons and snapshot
//! sys-info, stage data files, list fixtures and plan chunks, then run each
//! chunk (remote fixture setup/teardown bracketing a local-runner
//! `RunTests` invocation drained by C3), isolating chunk failures from one
//! another unless the max-failure budget is exhausted.

use crate::connection::ConnectionCache;
use crate::diagnosis::{run_diagnosis, ReconnectPolicy};
use crate::error::{OrchestratorError, RunError};
use crate::reader::{drain_control_stream, ReaderOutcome};
use crate::stager::stage_data_files;
use async_trait::async_trait;
use hostdrv_adapters::{RunnerError, RunnerInvoker, SshDialer};
use hostdrv_core::{
    assign_shard, plan_groups, DutIdentity, FixtureListing, FixtureName, OrchestratorConfig,
    RunnerArgs, RunnerMode, TestChunk, TestEntity, TestResult,
};
use std::collections::HashSet;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Out-of-band RPC to the remote runner for setting up and tearing down a
/// remote fixture ahead of a chunk's `RunTests` invocation. Kept separate
/// from [`RunnerInvoker`] (the framed stdin/stdout protocol) because
/// fixture setup is a distinct call on the remote runner's control
/// interface, not a `RunnerMode`.
///
/// Replaces the symlink-re-exec plugin trick the original harness used to
/// stand up an in-process fake remote server: here the orchestrator takes
/// this trait as an injected dependency, and tests supply an in-process
/// fake implementation directly (per spec.md §9's redesign note).
#[async_trait]
pub trait FixtureServer: Send + Sync {
    async fn setup(&self, fixture: &FixtureName) -> Result<(), String>;
    async fn teardown(&self, fixture: &FixtureName) -> Result<(), String>;
}

/// Spawns the local and remote runner processes, abstracting over whether
/// that means a real subprocess or an in-process fake.
#[async_trait]
pub trait RunnerFactory: Send + Sync {
    async fn local_runner(&self, stdin_json: Vec<u8>) -> Result<Box<dyn RunnerInvoker>, RunnerError>;
    async fn remote_runner(&self, stdin_json: Vec<u8>) -> Result<Box<dyn RunnerInvoker>, RunnerError>;
}

/// Everything C7 needs besides the config: the connection cache, and the
/// injected runner/fixture-server collaborators.
pub struct OrchestratorDeps<D: SshDialer, R: RunnerFactory, X: FixtureServer> {
    pub connection_cache: ConnectionCache<D>,
    pub runner_factory: R,
    pub fixture_server: X,
}

/// Full outcome of one orchestrator run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub results: Vec<TestResult>,
    /// Errors from chunks that did not complete cleanly (stream-level:
    /// protocol, stall, connection, timeout), in chunk order.
    pub chunk_errors: Vec<String>,
}

/// Runs one full pass: connect, stage, plan, execute every chunk, then
/// close the connection. Chunk failures are isolated from one another
/// (logged into `chunk_errors`) except `MaxFailuresReached`, which aborts
/// the remaining chunks immediately.
pub async fn run_orchestration<D, R, X>(
    config: &OrchestratorConfig,
    deps: &OrchestratorDeps<D, R, X>,
    source_workspace: &Path,
    res_dir: &Path,
    tests: Vec<TestEntity>,
    listing: FixtureListing,
    remote_fixtures: HashSet<FixtureName>,
) -> Result<RunOutcome, OrchestratorError>
where
    D: SshDialer,
    R: RunnerFactory,
    X: FixtureServer,
{
    let identity = DutIdentity::new(config.target_address.clone(), config.ssh_key_file.clone());
    let (_session, connection) = deps.connection_cache.conn(&identity).await?;
    info!(target_address = %identity.target_address, boot_id = %connection.initial_boot_id, "connected to DUT");

    // Owned by the orchestrator and propagated to the runner invocation and
    // the control-stream reader (spec.md §5); a Ctrl-C during the run
    // cancels the in-flight chunk instead of leaving the process to the
    // default signal disposition.
    let cancel_token = CancellationToken::new();
    {
        let cancel_token = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel_token.cancel();
            }
        });
    }

    let runnable: Vec<TestEntity> = assign_shard(&tests, config.shard_index, config.total_shards)
        .into_iter()
        .filter(|t| t.is_runnable())
        .cloned()
        .collect();

    let staging_report = stage_data_files(source_workspace, Path::new(&config.local_data_dir), &runnable)?;
    for warning in &staging_report.warnings {
        warn!(%warning, "data-file staging warning");
    }

    let groups = plan_groups(&runnable, &listing, &remote_fixtures);
    let mut chunks: Vec<TestChunk> = groups
        .into_iter()
        .map(|g| TestChunk::new(g.tests, g.start_fixture))
        .collect();
    chunks.sort_by_key(hostdrv_core::chunk_order_key);

    let mut outcome = RunOutcome::default();

    'chunks: for chunk in &mut chunks {
        if let Some(fixture) = &chunk.start_fixture {
            if let Err(e) = deps.fixture_server.setup(fixture).await {
                chunk.setup_errors.push(e);
            }
        }

        let run_result = run_chunk(config, deps, &identity, chunk, res_dir, &cancel_token).await;

        if let Some(fixture) = &chunk.start_fixture {
            if let Err(e) = deps.fixture_server.teardown(fixture).await {
                warn!(fixture = %fixture, error = %e, "remote fixture teardown failed");
            }
        }

        match run_result {
            Ok(chunk_outcome) => {
                outcome.results.extend(chunk_outcome.results);
                if !chunk_outcome.run_ended {
                    let verdict = run_diagnosis(
                        &deps.connection_cache,
                        &identity,
                        &connection.initial_boot_id,
                        &res_dir.join("diagnosis"),
                        ReconnectPolicy::default(),
                    )
                    .await;
                    if let Some(name) = chunk_outcome.last_in_flight {
                        if let Some(result) = outcome.results.iter_mut().find(|r| r.name.as_ref() == Some(&name)) {
                            result.record_error(verdict.verdict.clone());
                        }
                    }
                    outcome.chunk_errors.push(format!("dropped session, diagnosis: {}", verdict.verdict));
                }
            }
            // Partial results committed before the abort still belong in
            // the run's outcome (spec.md §8 Scenario 4/5): a chunk that
            // completes several tests before hitting max-failures or a
            // wait-timeout must not report zero results for that chunk.
            Err((RunError::MaxFailuresReached(k), chunk_outcome)) => {
                outcome.results.extend(chunk_outcome.results);
                outcome.chunk_errors.push(format!("max test failures ({k}) reached"));
                break 'chunks;
            }
            Err((RunError::Cancelled, chunk_outcome)) => {
                outcome.results.extend(chunk_outcome.results);
                outcome.chunk_errors.push(RunError::Cancelled.to_string());
                break 'chunks;
            }
            Err((e, chunk_outcome)) => {
                outcome.results.extend(chunk_outcome.results);
                outcome.chunk_errors.push(e.to_string());
            }
        }
    }

    deps.connection_cache.close(&identity);

    if outcome.results.is_empty() && !outcome.chunk_errors.is_empty() {
        return Err(OrchestratorError::NoResults);
    }
    Ok(outcome)
}

/// Runs one chunk's `RunTests` invocation to completion. Failures before
/// the control stream is even opened (bad args, dial failure, spawn
/// failure) have no partial results to report and are mapped to an empty
/// [`ReaderOutcome`]; failures from [`drain_control_stream`] already carry
/// whatever was committed before the abort.
async fn run_chunk<D, R, X>(
    config: &OrchestratorConfig,
    deps: &OrchestratorDeps<D, R, X>,
    identity: &DutIdentity,
    chunk: &TestChunk,
    res_dir: &Path,
    cancel: &CancellationToken,
) -> Result<ReaderOutcome, (RunError, ReaderOutcome)>
where
    D: SshDialer,
    R: RunnerFactory,
    X: FixtureServer,
{
    let mut args = RunnerArgs::new(RunnerMode::RunTests);
    args.patterns = chunk.tests.iter().map(|t| t.as_str().to_string()).collect();
    args.start_fixture = chunk.start_fixture.clone();
    args.setup_errors = chunk.setup_errors.clone();
    let stdin = serde_json::to_vec(&args)
        .map_err(|e| (RunError::Protocol(hostdrv_wire::ProtocolError::Json(e)), ReaderOutcome::default()))?;

    let mut invoker =
        deps.runner_factory.local_runner(stdin).await.map_err(|e| (RunError::from(e), ReaderOutcome::default()))?;

    let (_session, _connection) =
        deps.connection_cache.conn(identity).await.map_err(|e| (RunError::from(e), ReaderOutcome::default()))?;
    let heartbeat = std::time::Duration::from_secs(config.heartbeat_interval_secs);
    let wait_timeout = std::time::Duration::from_secs(config.local_runner_wait_timeout_secs);

    drain_control_stream(
        invoker.as_mut(),
        &_session,
        res_dir,
        heartbeat,
        wait_timeout,
        config.max_test_failures,
        cancel,
    )
    .await
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
