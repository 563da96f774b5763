// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn timer_id_display() {
    let id = TimerId::new("test-timer");
    assert_eq!(id.to_string(), "test-timer");
}

#[test]
fn timer_id_equality() {
    let id1 = TimerId::new("timer-1");
    let id2 = TimerId::new("timer-1");
    let id3 = TimerId::new("timer-2");

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn timer_id_serde() {
    let id = TimerId::new("my-timer");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"my-timer\"");

    let parsed: TimerId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn heartbeat_timer_id_format() {
    let dut = DutId::new("dut-1");
    let id = TimerId::heartbeat(&dut, 0);
    assert_eq!(id.as_str(), "heartbeat:dut-1:0");
    assert!(id.is_heartbeat());
    assert!(!id.is_wait_timeout());
}

#[test]
fn wait_timeout_timer_id_format() {
    let dut = DutId::new("dut-1");
    let id = TimerId::wait_timeout(&dut, 3);
    assert_eq!(id.as_str(), "wait-timeout:dut-1:3");
    assert!(id.is_wait_timeout());
    assert!(!id.is_heartbeat());
}

#[test]
fn reconnect_poll_timer_id_format() {
    let dut = DutId::new("dut-1");
    let id = TimerId::reconnect_poll(&dut, 4);
    assert_eq!(id.as_str(), "reconnect-poll:dut-1:4");
    assert!(id.is_reconnect_poll());
}

#[test]
fn distinct_chunks_produce_distinct_timers() {
    let dut = DutId::new("dut-1");
    assert_ne!(TimerId::heartbeat(&dut, 0), TimerId::heartbeat(&dut, 1));
}
