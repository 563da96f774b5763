// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Builds the shell invocation used to start the local runner over SSH:
//! `exec env [KEY=VAL …] <runnerPath> <args…>`, with proxy variables in a
//! fixed order and values quoted the way a human typing the command would.

pub mod invocation;

pub use invocation::{build_invocation, ordered_proxy_vars, quote_token, render_invocation, EnvAssignment};
