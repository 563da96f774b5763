// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test chunk: the fixture planner's unit of work handed to a single
//! `RunTests` invocation.

use crate::ids::{FixtureName, TestName};
use serde::{Deserialize, Serialize};

/// A group of tests sharing the same remote fixture dependency (or none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestChunk {
    /// Tests assigned to this chunk, in input order.
    pub tests: Vec<TestName>,
    /// The remote fixture this chunk's local fixtures transitively depend
    /// on. `None` marks the fixture-independent chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_fixture: Option<FixtureName>,
    /// Errors raised while setting up `start_fixture`, forwarded to the
    /// runner so they surface as per-test failures rather than a silent skip.
    #[serde(default)]
    pub setup_errors: Vec<String>,
}

impl TestChunk {
    pub fn new(tests: Vec<TestName>, start_fixture: Option<FixtureName>) -> Self {
        Self {
            tests,
            start_fixture,
            setup_errors: Vec::new(),
        }
    }

    pub fn is_fixture_independent(&self) -> bool {
        self.start_fixture.is_none()
    }
}

/// Orders chunks per the planner's contract: the fixture-independent chunk
/// first, remaining chunks ascending by `start_fixture` name.
pub fn chunk_order_key(chunk: &TestChunk) -> (bool, String) {
    match &chunk.start_fixture {
        None => (false, String::new()),
        Some(name) => (true, name.as_str().to_string()),
    }
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
