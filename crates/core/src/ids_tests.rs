// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn test_name_display_and_eq() {
    let a = TestName::new("pkg.Test");
    let b: TestName = "pkg.Test".into();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "pkg.Test");
    assert_eq!(a, "pkg.Test");
}

#[test]
fn fixture_name_short() {
    let f = FixtureName::new("remoteFixtureWithALongName");
    assert_eq!(f.short(8), "remoteFi");
}

#[test]
fn dut_id_serde_roundtrip() {
    let id = DutId::new("dut-1234");
    let json = serde_json::to_string(&id).unwrap();
    let back: DutId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}
