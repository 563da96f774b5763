// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: SSH sessions (C1) and runner invocation (C2).

pub mod runner;
pub mod ssh;
pub mod subprocess;

pub use runner::{
    build_local_command, build_remote_command, spawn_local, spawn_remote, RunnerError, RunnerExit,
    RunnerInvoker,
};
pub use ssh::{
    mkdir_p, read_boot_id, sync, CommandOutput, RealSshDialer, RealSshSession, SshDialer, SshError,
    SshSession,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use runner::fake::FakeRunnerInvoker;
#[cfg(any(test, feature = "test-support"))]
pub use ssh::fake::{FakeSshDialer, FakeSshSession, SshCall};
