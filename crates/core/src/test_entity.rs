// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test entity: the immutable descriptor produced by listing and consumed by
//! the fixture planner and the runner.

use crate::ids::{BundleName, FixtureName, TestName};
use serde::{Deserialize, Serialize};

/// Immutable descriptor of a single test, as returned by `ListTests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEntity {
    /// Globally unique test name.
    pub name: TestName,
    /// Bundle (library of tests) that owns this test.
    pub bundle: BundleName,
    /// Path of the package that owns this test, within the bundle.
    pub package_path: String,
    /// Optional parent fixture this test declares, by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<FixtureName>,
    /// Data files this test declares it needs, relative to the bundle's data dir.
    #[serde(default)]
    pub data_files: Vec<String>,
    /// Reason this test is skipped; empty means runnable.
    #[serde(default)]
    pub skip_reason: String,
}

impl TestEntity {
    pub fn is_runnable(&self) -> bool {
        self.skip_reason.is_empty()
    }
}

#[cfg(test)]
#[path = "test_entity_tests.rs"]
mod tests;
