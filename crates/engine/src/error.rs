// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy (spec.md §7), one `thiserror`-derived enum per crate-
//! boundary-appropriate scope: the stream reader and orchestrator each wrap
//! the lower-level adapter errors with `#[from]`.

use hostdrv_adapters::{RunnerError, SshError};
use hostdrv_wire::ProtocolError;
use thiserror::Error;

/// Raised by the connection cache (C1) when dialing fails.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("ssh error: {0}")]
    Ssh(#[from] SshError),
}

/// Raised while setting up or tearing down a remote fixture (C4/C7).
#[derive(Debug, Error, Clone)]
#[error("fixture setup failed: {0}")]
pub struct FixtureSetupError(pub String);

/// Stream-level errors raised by the control-stream reader (C3). These
/// abort the current chunk and are returned to the orchestrator, which
/// decides whether to continue with the next chunk.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("control stream stalled: no message for longer than the heartbeat budget")]
    Stalled,
    #[error("timed out waiting for the runner to exit")]
    Timeout,
    #[error("max test failures ({0}) reached")]
    MaxFailuresReached(u32),
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("cancelled")]
    Cancelled,
}

/// Top-level orchestrator error (C7), wrapping the lower-level ones.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("configuration error: {0}")]
    Config(#[from] hostdrv_core::ConfigError),
    #[error("data-file staging failed: {0}")]
    Staging(#[from] std::io::Error),
    #[error("no test results were produced")]
    NoResults,
}
