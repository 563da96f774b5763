// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types exchanged with a runner subprocess: the argument blob written
//! to its stdin and the control-message stream read from its stdout.

use crate::ids::{BundleName, FixtureName, TestName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selects which operation a runner invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RunnerMode {
    GetDutInfo,
    GetSysInfoState,
    CollectSysInfo,
    ListTests,
    ListFixtures,
    RunTests,
    DownloadPrivateBundles,
}

/// The JSON argument blob written once to a runner's stdin before it is
/// closed. Payload fields are mode-specific and left empty unless relevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerArgs {
    pub mode: RunnerMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_fixture: Option<FixtureName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub setup_errors: Vec<String>,
}

impl RunnerArgs {
    pub fn new(mode: RunnerMode) -> Self {
        Self {
            mode,
            patterns: Vec::new(),
            start_fixture: None,
            setup_errors: Vec::new(),
        }
    }
}

/// A single framed message emitted by a runner in `RunTests` mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    RunStart {
        time: f64,
        num_tests: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        test_names: Option<Vec<TestName>>,
    },
    EntityStart {
        time: f64,
        info: EntityInfo,
        out_dir: String,
    },
    EntityLog {
        time: f64,
        name: TestName,
        text: String,
    },
    EntityError {
        time: f64,
        name: TestName,
        error: String,
    },
    EntityEnd {
        time: f64,
        name: TestName,
    },
    RunLog {
        time: f64,
        text: String,
    },
    RunError {
        time: f64,
        error: String,
    },
    RunEnd {
        time: f64,
        out_dir: String,
    },
    Heartbeat {
        time: f64,
    },
}

impl ControlMessage {
    /// The test this message pertains to, if any.
    pub fn entity_name(&self) -> Option<&TestName> {
        match self {
            ControlMessage::EntityStart { info, .. } => Some(&info.name),
            ControlMessage::EntityLog { name, .. }
            | ControlMessage::EntityError { name, .. }
            | ControlMessage::EntityEnd { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// The identity fields attached to an `EntityStart` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub name: TestName,
    pub bundle: BundleName,
    #[serde(default)]
    pub package_path: String,
}

/// Fixtures advertised by `ListFixtures`, keyed by owning bundle path.
pub type FixtureListing = BTreeMap<String, Vec<FixtureEntry>>;

/// One fixture entry as reported by `ListFixtures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureEntry {
    pub name: FixtureName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FixtureName>,
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
