// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnosis engine (C6): engaged when the control-stream reader loses the
//! SSH session mid-run. Polls for reconnection, compares boot IDs, fetches
//! the journal and ramoops, and classifies the event via
//! [`hostdrv_core::classify`].
//!
//! `DROPPED → RECONNECTING → (success: COMPARE_BOOT_ID) | (timeout: "network")`,
//! then `COMPARE_BOOT_ID → (same id: "network") → (different id: FETCH_LOGS → CLASSIFY)`.

use crate::connection::ConnectionCache;
use hostdrv_adapters::{read_boot_id, SshDialer, SshSession};
use hostdrv_core::{classify, DiagnosisReport, DutIdentity};
use std::path::Path;
use std::time::Duration;

/// Reconnection budget and backoff shape, exposed so tests can shrink both
/// without changing the state machine itself.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub budget: Duration,
    pub initial_backoff: Duration,
}

impl Default for ReconnectPolicy {
    /// One-minute reconnect budget per spec.md §4.6, starting at a 1s poll.
    fn default() -> Self {
        Self { budget: Duration::from_secs(60), initial_backoff: Duration::from_secs(1) }
    }
}

/// Runs the C6 state machine for one SSH drop and returns its verdict.
/// Never fails: diagnosis results are always *attached*, never raised.
pub async fn run_diagnosis<D: SshDialer>(
    cache: &ConnectionCache<D>,
    identity: &DutIdentity,
    initial_boot_id: &str,
    out_dir: &Path,
    policy: ReconnectPolicy,
) -> DiagnosisReport {
    let Some((session, _connection)) = reconnect(cache, identity, policy).await else {
        return DiagnosisReport::network(Some(initial_boot_id.to_string()), false);
    };

    let post_drop_boot_id = match read_boot_id(&session).await {
        Ok(id) => id,
        Err(_) => return DiagnosisReport::network(Some(initial_boot_id.to_string()), true),
    };

    if post_drop_boot_id == initial_boot_id {
        return DiagnosisReport::network(Some(initial_boot_id.to_string()), true);
    }

    let journal = fetch_journal(&session, initial_boot_id).await;
    let ramoops = fetch_ramoops(&session).await;
    persist(out_dir, &journal, &ramoops);

    let verdict = classify(&journal, &ramoops);
    DiagnosisReport {
        verdict: verdict.to_string(),
        reconnected: true,
        initial_boot_id: Some(initial_boot_id.to_string()),
        post_drop_boot_id: Some(post_drop_boot_id),
        journal_tail: journal,
        ramoops_tail: ramoops,
    }
}

/// Exponential-poll reconnect loop bounded by `policy.budget`.
async fn reconnect<D: SshDialer>(
    cache: &ConnectionCache<D>,
    identity: &DutIdentity,
    policy: ReconnectPolicy,
) -> Option<(D::Session, hostdrv_core::DutConnection)> {
    let deadline = tokio::time::Instant::now() + policy.budget;
    let mut backoff = policy.initial_backoff;
    loop {
        if let Ok(pair) = cache.conn(identity).await {
            return Some(pair);
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        tokio::time::sleep(backoff.min(remaining)).await;
        backoff = (backoff * 2).min(policy.budget);
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
    }
}

/// Strips hyphens from a UUID-formatted boot ID, matching the dense form
/// `croslog --boot=` expects.
fn dense_boot_id(boot_id: &str) -> String {
    boot_id.chars().filter(|c| *c != '-').collect()
}

/// Runs `croslog --quiet --boot=<denseInitBootID> --lines=1000`, falling
/// back to `journalctl` with the same flags on non-zero exit.
async fn fetch_journal<S: SshSession>(session: &S, boot_id: &str) -> String {
    let dense = dense_boot_id(boot_id);
    let flags = vec![
        "--quiet".to_string(),
        format!("--boot={dense}"),
        "--lines=1000".to_string(),
    ];

    let mut argv = vec!["croslog".to_string()];
    argv.extend(flags.clone());
    if let Ok(out) = session.run(&argv).await {
        return out.stdout_string();
    }

    let mut argv = vec!["journalctl".to_string()];
    argv.extend(flags);
    session.run(&argv).await.map(|out| out.stdout_string()).unwrap_or_default()
}

/// Reads ramoops from `console-ramoops-0`, falling back to `console-ramoops`.
async fn fetch_ramoops<S: SshSession>(session: &S) -> String {
    let primary = session.run(&["cat".to_string(), "/sys/fs/pstore/console-ramoops-0".to_string()]).await;
    if let Ok(out) = primary {
        return out.stdout_string();
    }
    session
        .run(&["cat".to_string(), "/sys/fs/pstore/console-ramoops".to_string()])
        .await
        .map(|out| out.stdout_string())
        .unwrap_or_default()
}

fn persist(out_dir: &Path, journal: &str, ramoops: &str) {
    if std::fs::create_dir_all(out_dir).is_err() {
        return;
    }
    let _ = std::fs::write(out_dir.join("journal.txt"), journal);
    let _ = std::fs::write(out_dir.join("ramoops.txt"), ramoops);
}

#[cfg(test)]
#[path = "diagnosis_tests.rs"]
mod tests;
