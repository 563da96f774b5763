// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hostdrv: one-shot host-side driver for the DUT integration-test harness.
//!
//! Everything this binary does beyond loading a config file and calling
//! into `hostdrv-engine` is an external collaborator's job per spec.md §1:
//! flag parsing is intentionally minimal, and the runner binaries, the SSH
//! transport, and results persistence are supplied by the surrounding
//! fleet infrastructure, not reimplemented here.

mod config_source;
mod runner_glue;

use clap::Parser;
use hostdrv_adapters::RealSshDialer;
use hostdrv_core::{
    FixtureListing, FixtureName, OrchestratorConfig, RunnerArgs, RunnerMode, TestEntity,
};
use hostdrv_engine::{run_orchestration, ConnectionCache, OrchestratorDeps, RunnerFactory as _};
use runner_glue::{NoopFixtureServer, RealRunnerFactory};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "hostdrv", about = "Host-side DUT integration-test orchestrator")]
struct Cli {
    /// Path to a TOML or JSON `OrchestratorConfig` document.
    #[arg(long)]
    config: PathBuf,

    /// Host-side directory test artifacts and diagnosis logs are written to.
    #[arg(long)]
    res_dir: PathBuf,

    /// Workspace the data-file stager copies from. Defaults to the
    /// config's `build_workspace`, if set.
    #[arg(long)]
    source_workspace: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config_source::ConfigSourceError),
    #[error(transparent)]
    Validation(#[from] hostdrv_core::ConfigError),
    #[error(transparent)]
    Orchestrator(#[from] hostdrv_engine::OrchestratorError),
    #[error(transparent)]
    Runner(#[from] hostdrv_adapters::RunnerError),
    #[error("malformed {0} response: {1}")]
    MalformedResponse(&'static str, serde_json::Error),
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

/// Runs one full pass and returns whether the process should exit 0, per
/// spec.md §7: non-zero only when no results were produced or the
/// max-failure budget was hit.
async fn run(cli: &Cli) -> Result<bool, CliError> {
    let mut config = config_source::load(&cli.config)?;
    config.validate()?;

    let source_workspace = cli
        .source_workspace
        .clone()
        .or_else(|| config.build_workspace.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let runner_factory = RealRunnerFactory::new(&config);

    if config.check_test_deps {
        info!("resolving DUT dependency info (checkTestDeps)");
        let info = oneshot(&runner_factory, RunnerMode::GetDutInfo, &config, false).await?;
        info!(response = %String::from_utf8_lossy(&info), "GetDUTInfo complete");
    }

    let sys_info_before = if config.collect_sys_info {
        info!("collecting sys-info snapshot before the run");
        Some(oneshot(&runner_factory, RunnerMode::CollectSysInfo, &config, false).await?)
    } else {
        None
    };

    info!(
        target_address = %config.target_address,
        invocation = %runner_glue::describe_local_invocation(&config, &[]),
        "listing tests and fixtures"
    );
    let tests = list_tests(&runner_factory, &config).await?;
    let listing = list_fixtures(&runner_factory, &config, false).await?;
    let remote_fixtures = list_remote_fixture_names(&runner_factory, &config).await?;

    let deps = OrchestratorDeps {
        connection_cache: ConnectionCache::new(RealSshDialer),
        runner_factory,
        fixture_server: NoopFixtureServer,
    };

    let outcome = run_orchestration(&config, &deps, &source_workspace, &cli.res_dir, tests, listing, remote_fixtures)
        .await?;

    if config.collect_sys_info {
        info!("collecting sys-info snapshot after the run");
        let sys_info_after = oneshot(&deps.runner_factory, RunnerMode::CollectSysInfo, &config, false).await?;
        if let Some(before) = sys_info_before {
            if before != sys_info_after {
                info!("sys-info snapshot changed across the run");
            }
        }
    }

    let failed = outcome.results.iter().filter(|r| r.is_failed()).count();
    info!(
        total = outcome.results.len(),
        failed,
        chunk_errors = outcome.chunk_errors.len(),
        "run complete"
    );
    for chunk_error in &outcome.chunk_errors {
        error!(%chunk_error, "chunk did not complete cleanly");
    }

    let max_failures_hit = config.max_test_failures != 0 && failed as u32 >= config.max_test_failures;
    Ok(!max_failures_hit)
}

/// Issues a oneshot (non-`RunTests`) runner invocation and returns its raw
/// stdout. `remote` selects which of the two runner binaries is invoked.
async fn oneshot(
    runner_factory: &RealRunnerFactory,
    mode: RunnerMode,
    config: &OrchestratorConfig,
    remote: bool,
) -> Result<Vec<u8>, CliError> {
    let mut args = RunnerArgs::new(mode);
    args.patterns = config.patterns.clone();
    let stdin = serde_json::to_vec(&args).expect("RunnerArgs always serializes");

    let mut invoker =
        if remote { runner_factory.remote_runner(stdin).await? } else { runner_factory.local_runner(stdin).await? };
    Ok(invoker.read_oneshot().await?)
}

async fn list_tests(
    runner_factory: &RealRunnerFactory,
    config: &OrchestratorConfig,
) -> Result<Vec<TestEntity>, CliError> {
    let raw = oneshot(runner_factory, RunnerMode::ListTests, config, false).await?;
    serde_json::from_slice(&raw).map_err(|e| CliError::MalformedResponse("ListTests", e))
}

async fn list_fixtures(
    runner_factory: &RealRunnerFactory,
    config: &OrchestratorConfig,
    remote: bool,
) -> Result<FixtureListing, CliError> {
    let raw = oneshot(runner_factory, RunnerMode::ListFixtures, config, remote).await?;
    serde_json::from_slice(&raw).map_err(|e| CliError::MalformedResponse("ListFixtures", e))
}

/// The set of fixture names known to the remote runner, used by the
/// planner to tell fixture-independent chunks from remote-fixture-rooted
/// ones.
async fn list_remote_fixture_names(
    runner_factory: &RealRunnerFactory,
    config: &OrchestratorConfig,
) -> Result<HashSet<FixtureName>, CliError> {
    let listing = list_fixtures(runner_factory, config, true).await?;
    Ok(listing.values().flatten().map(|entry| entry.name.clone()).collect())
}
