// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixture: a named node in a DAG of setup/teardown scopes.

use crate::ids::FixtureName;
use serde::{Deserialize, Serialize};

/// Where a fixture's setup/teardown code executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureLocation {
    Local,
    Remote,
}

/// A node in the fixture DAG: invariant is no cycles and at most one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub name: FixtureName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FixtureName>,
    pub location: FixtureLocation,
}

impl Fixture {
    pub fn new(
        name: impl Into<FixtureName>,
        parent: Option<FixtureName>,
        location: FixtureLocation,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            location,
        }
    }
}

#[cfg(test)]
#[path = "fixture_tests.rs"]
mod tests;
