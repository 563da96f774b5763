// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test result: what the control-stream reader accumulates per entity and
//! commits on `EntityEnd`.

use crate::ids::TestName;
use serde::{Deserialize, Serialize};

/// Accumulated outcome of a single test, committed when its `EntityEnd`
/// arrives (or synthesized with a skip reason for tests never started).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: Option<TestName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub log: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
    #[serde(default)]
    pub skip_reason: String,
}

impl TestResult {
    pub fn started(name: TestName, start_time: f64, out_dir: String) -> Self {
        Self {
            name: Some(name),
            start_time: Some(start_time),
            out_dir: Some(out_dir),
            ..Default::default()
        }
    }

    pub fn skipped(name: TestName, skip_reason: impl Into<String>) -> Self {
        Self {
            name: Some(name),
            skip_reason: skip_reason.into(),
            ..Default::default()
        }
    }

    pub fn append_log(&mut self, text: &str) {
        self.log.push_str(text);
    }

    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn finish(&mut self, end_time: f64) {
        self.end_time = Some(end_time);
    }

    pub fn is_failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
