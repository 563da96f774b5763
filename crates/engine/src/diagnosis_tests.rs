// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hostdrv_adapters::{FakeSshDialer, FakeSshSession};
use hostdrv_core::DutIdentity;

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy { budget: Duration::from_millis(50), initial_backoff: Duration::from_millis(2) }
}

fn identity() -> DutIdentity {
    DutIdentity::new("dut.local", "/keys/id_rsa")
}

/// Seeds the cache with a pre-drop connection, as the orchestrator's step 1
/// would have before the diagnosis engine is ever engaged.
async fn seeded_cache(session: FakeSshSession, initial_boot_id: &str) -> ConnectionCache<FakeSshDialer> {
    session.script_ok("cat", initial_boot_id);
    let cache = ConnectionCache::new(FakeSshDialer::new(session));
    cache.conn(&identity()).await.unwrap();
    cache
}

#[tokio::test]
async fn unchanged_boot_id_is_classified_as_network() {
    let session = FakeSshSession::new();
    let cache = seeded_cache(session.clone(), "boot-aaa").await;
    session.script_ok("cat", "boot-aaa"); // post-reconnect boot id read: unchanged
    let out_dir = tempfile::tempdir().unwrap();

    let report = run_diagnosis(&cache, &identity(), "boot-aaa", out_dir.path(), fast_policy()).await;

    assert_eq!(report.verdict, "network");
    assert!(report.reconnected);
}

#[tokio::test]
async fn reconnect_timeout_is_classified_as_network_without_reconnecting() {
    let dialer = FakeSshDialer::default(); // no session configured: every dial fails
    let cache = ConnectionCache::new(dialer);
    let out_dir = tempfile::tempdir().unwrap();

    let report = run_diagnosis(&cache, &identity(), "boot-aaa", out_dir.path(), fast_policy()).await;

    assert_eq!(report.verdict, "network");
    assert!(!report.reconnected);
}

#[tokio::test]
async fn hung_task_scenario_is_classified_and_logs_are_persisted() {
    // spec.md scenario 7: SSH drops, reconnect succeeds with a new boot id,
    // ramoops shows a hung-task trace. The fake session's scripted `cat`
    // responses are consumed in call order: the seeded pre-drop boot-id
    // read, the post-reconnect boot-id read, then the ramoops fetch.
    let session = FakeSshSession::new();
    let cache = seeded_cache(session.clone(), "boot-aaa").await;
    session.script_ok("cat", "boot-bbb");
    session.script_ok("croslog", "nothing of note");
    session.script_ok(
        "cat",
        "INFO: task kworker/0:1 blocked for more than 120 seconds\nCall Trace: [abc]  schedule+0x1 [def]  mutex_lock+0x2\nKernel panic - not syncing: hung_task",
    );
    let out_dir = tempfile::tempdir().unwrap();

    let report = run_diagnosis(&cache, &identity(), "boot-aaa", out_dir.path(), fast_policy()).await;

    assert_eq!(report.verdict, "hung(kworker/0:1, mutex_lock+0x2)");
    assert_eq!(report.initial_boot_id.as_deref(), Some("boot-aaa"));
    assert_eq!(report.post_drop_boot_id.as_deref(), Some("boot-bbb"));
    assert!(std::fs::read_to_string(out_dir.path().join("ramoops.txt")).unwrap().contains("hung_task"));
}

/// spec.md §4.6 names `croslog --boot=<denseInitBootID>` explicitly: the
/// journal fetch must key off the *pre-drop* boot session being diagnosed,
/// not the new boot the reconnect just landed on.
#[tokio::test]
async fn journal_fetch_uses_the_initial_boot_id_not_the_post_drop_one() {
    let session = FakeSshSession::new();
    let cache = seeded_cache(session.clone(), "boot-aaa-111").await;
    session.script_ok("cat", "boot-bbb-222");
    session.script_ok("croslog", "nothing of note");
    let out_dir = tempfile::tempdir().unwrap();

    run_diagnosis(&cache, &identity(), "boot-aaa-111", out_dir.path(), fast_policy()).await;

    let croslog_call = session.calls().into_iter().find(|c| c.argv.first().map(String::as_str) == Some("croslog"));
    let croslog_call = croslog_call.expect("croslog should have been invoked");
    assert!(
        croslog_call.argv.contains(&"--boot=bootaaa111".to_string()),
        "expected the dense initial boot id in {:?}",
        croslog_call.argv
    );
}

#[tokio::test]
async fn croslog_failure_falls_back_to_journalctl() {
    let session = FakeSshSession::new();
    let cache = seeded_cache(session.clone(), "boot-aaa").await;
    session.script_ok("cat", "boot-bbb");
    session.script(
        "croslog",
        Err(hostdrv_adapters::SshError::CommandFailed {
            command: "croslog".to_string(),
            code: 1,
            stderr: "not found".to_string(),
        }),
    );
    session.script_ok("journalctl", "fallback journal contents");
    let out_dir = tempfile::tempdir().unwrap();

    let report = run_diagnosis(&cache, &identity(), "boot-aaa", out_dir.path(), fast_policy()).await;

    assert!(report.journal_tail.contains("fallback journal contents"));
}
