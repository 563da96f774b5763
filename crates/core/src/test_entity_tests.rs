// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn entity(name: &str) -> TestEntity {
    TestEntity {
        name: TestName::new(name),
        bundle: BundleName::new("cros"),
        package_path: "go.chromium.org/pkg".to_string(),
        fixture: None,
        data_files: vec![],
        skip_reason: String::new(),
    }
}

#[test]
fn runnable_when_skip_reason_empty() {
    assert!(entity("pkg.Test").is_runnable());
}

#[test]
fn not_runnable_when_skip_reason_set() {
    let mut e = entity("pkg.Test");
    e.skip_reason = "missing dep".to_string();
    assert!(!e.is_runnable());
}

#[test]
fn serde_roundtrip_with_fixture() {
    let mut e = entity("pkg.Test");
    e.fixture = Some(FixtureName::new("remoteFixt"));
    e.data_files = vec!["data/foo.txt".to_string()];
    let json = serde_json::to_string(&e).unwrap();
    let back: TestEntity = serde_json::from_str(&json).unwrap();
    assert_eq!(e, back);
}

#[test]
fn serde_omits_absent_fixture() {
    let e = entity("pkg.Test");
    let json = serde_json::to_string(&e).unwrap();
    assert!(!json.contains("fixture"));
}
