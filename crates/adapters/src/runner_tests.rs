// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::fake::FakeRunnerInvoker;
use super::*;
use hostdrv_shell::EnvAssignment;

#[test]
fn first_stderr_field_takes_text_before_first_comma() {
    assert_eq!(first_stderr_field("connection refused, retry later\nmore"), "connection refused");
}

#[test]
fn first_stderr_field_on_empty_stderr_is_empty() {
    assert_eq!(first_stderr_field(""), "");
}

/// spec.md §8 Scenario 2, verbatim.
#[test]
fn local_command_matches_proxy_propagation_scenario() {
    let proxy_vars = vec![
        EnvAssignment::new("HTTP_PROXY", "10.0.0.1:8000"),
        EnvAssignment::new("HTTPS_PROXY", "10.0.0.1:8001"),
        EnvAssignment::new("NO_PROXY", "foo.com, localhost, 127.0.0.0"),
    ];
    let ordered = hostdrv_shell::ordered_proxy_vars(&proxy_vars);
    let argv = hostdrv_shell::build_invocation(&ordered, "/mock/local_test_runner", &[]);
    let line = hostdrv_shell::render_invocation(&argv);
    assert_eq!(
        line,
        "exec env HTTP_PROXY=10.0.0.1:8000 HTTPS_PROXY=10.0.0.1:8001 \
         'NO_PROXY=foo.com, localhost, 127.0.0.0' /mock/local_test_runner"
    );
}

#[tokio::test]
async fn fake_invoker_delivers_scripted_messages_in_order() {
    let mut fake = FakeRunnerInvoker::with_messages(vec![
        ControlMessage::RunStart { time: 1.0, num_tests: 0, test_names: None },
        ControlMessage::RunEnd { time: 2.0, out_dir: "/mock/out".to_string() },
    ]);
    fake.start(b"{}".to_vec()).await.unwrap();
    let first = fake.next_message().await.unwrap().unwrap();
    assert!(matches!(first, ControlMessage::RunStart { .. }));
    let second = fake.next_message().await.unwrap().unwrap();
    assert!(matches!(second, ControlMessage::RunEnd { .. }));
    assert!(fake.next_message().await.unwrap().is_none());
}

#[tokio::test]
async fn fake_invoker_returns_oneshot_payload() {
    let mut fake = FakeRunnerInvoker::with_oneshot(br#"{"ok":true}"#.to_vec());
    fake.start(b"{}".to_vec()).await.unwrap();
    let payload = fake.read_oneshot().await.unwrap();
    assert_eq!(payload, br#"{"ok":true}"#);
}

#[tokio::test]
async fn fake_invoker_records_cancel() {
    let mut fake = FakeRunnerInvoker::new();
    assert!(!fake.was_cancelled());
    fake.cancel();
    assert!(fake.was_cancelled());
}
