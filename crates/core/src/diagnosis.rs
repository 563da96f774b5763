// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnosis verdict: the classification the diagnosis engine attaches to
//! the last in-flight test after an SSH drop.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of an SSH drop, formatted per the on-wire verdict strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DiagnosisVerdict {
    /// Boot ID unchanged (or reconnect timed out): a transient network blip.
    Network,
    /// Journal shows an orderly shutdown before the drop.
    NormalShutdown { shutdown_type: String, reason: String },
    /// Ramoops shows a hung-task trace; `function` is absent if every frame
    /// in the trace belongs to the `schedule` family.
    Hung {
        thread: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function: Option<String>,
    },
    /// Ramoops shows a kernel crash at `symbol` (last RIP/PC match).
    Crash { symbol: String },
    /// None of the above patterns matched.
    UnknownCrash,
}

impl fmt::Display for DiagnosisVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosisVerdict::Network => write!(f, "network"),
            DiagnosisVerdict::NormalShutdown { shutdown_type, reason } => {
                write!(f, "normal_shutdown({shutdown_type},{reason})")
            }
            DiagnosisVerdict::Hung { thread, function: Some(function) } => {
                write!(f, "hung({thread}, {function})")
            }
            DiagnosisVerdict::Hung { thread, function: None } => write!(f, "hung({thread})"),
            DiagnosisVerdict::Crash { symbol } => write!(f, "crash({symbol})"),
            DiagnosisVerdict::UnknownCrash => write!(f, "unknown_crash"),
        }
    }
}

/// Full record of a diagnosis run, persisted alongside the test's output
/// directory and attached to its error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub verdict: String,
    pub reconnected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_boot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_drop_boot_id: Option<String>,
    #[serde(default)]
    pub journal_tail: String,
    #[serde(default)]
    pub ramoops_tail: String,
}

impl DiagnosisReport {
    pub fn network(initial_boot_id: Option<String>, reconnected: bool) -> Self {
        Self {
            verdict: DiagnosisVerdict::Network.to_string(),
            reconnected,
            initial_boot_id,
            post_drop_boot_id: None,
            journal_tail: String::new(),
            ramoops_tail: String::new(),
        }
    }
}

/// Classifies a DUT drop from fetched journal and ramoops text per spec.md
/// §4.6's priority order: pre-shutdown marker, then hung-task trace, then a
/// crash RIP/PC, else unknown.
///
/// Pure text parsing, deliberately separated from the I/O (reconnect poll,
/// `croslog`/`journalctl` invocation) that the diagnosis engine performs, so
/// the classification rule is unit-testable without a DUT.
pub fn classify(journal: &str, ramoops: &str) -> DiagnosisVerdict {
    if let Some(v) = classify_normal_shutdown(journal) {
        return v;
    }
    if let Some(v) = classify_hung_task(ramoops) {
        return v;
    }
    if let Some(symbol) = classify_crash_symbol(ramoops) {
        return DiagnosisVerdict::Crash { symbol };
    }
    DiagnosisVerdict::UnknownCrash
}

fn classify_normal_shutdown(journal: &str) -> Option<DiagnosisVerdict> {
    for line in journal.lines() {
        if !line.contains("pre-shutdown") {
            continue;
        }
        let marker = "Shutting down for ";
        let idx = line.find(marker)?;
        let rest = &line[idx + marker.len()..];
        let (shutdown_type, reason) = rest.split_once(':')?;
        return Some(DiagnosisVerdict::NormalShutdown {
            shutdown_type: shutdown_type.trim().to_string(),
            reason: reason.trim().to_string(),
        });
    }
    None
}

const SCHEDULE_FAMILY: [&str; 4] = ["schedule", "schedule_timeout", "io_schedule", "__schedule"];

fn is_schedule_symbol(frame: &str) -> bool {
    SCHEDULE_FAMILY.iter().any(|s| frame.starts_with(s))
}

fn classify_hung_task(ramoops: &str) -> Option<DiagnosisVerdict> {
    if !ramoops.contains("Kernel panic - not syncing: hung_task") {
        return None;
    }
    let start = ramoops.find("INFO: task ")?;
    let rest = &ramoops[start + "INFO: task ".len()..];
    let thread = rest.split(" blocked for more than").next()?.trim().to_string();

    let trace_start = ramoops.find("Call Trace:")?;
    let trace = &ramoops[trace_start + "Call Trace:".len()..];
    let panic_end = trace
        .find("Kernel panic - not syncing")
        .unwrap_or(trace.len());
    let trace = &trace[..panic_end];

    let function = trace
        .split_whitespace()
        .filter(|tok| !tok.starts_with('[') && !tok.ends_with(']'))
        .find(|frame| !is_schedule_symbol(frame))
        .map(|s| s.to_string());

    Some(DiagnosisVerdict::Hung { thread, function })
}

fn classify_crash_symbol(ramoops: &str) -> Option<String> {
    let mut last = None;
    for line in ramoops.lines() {
        let marker = if let Some(idx) = line.find("RIP:") {
            Some(idx + "RIP:".len())
        } else {
            line.find("PC is at").map(|idx| idx + "PC is at".len())
        };
        if let Some(idx) = marker {
            let symbol = line[idx..].trim().split_whitespace().next();
            if let Some(symbol) = symbol {
                last = Some(symbol.trim_start_matches(':').to_string());
            }
        }
    }
    last
}

#[cfg(test)]
#[path = "diagnosis_tests.rs"]
mod tests;
