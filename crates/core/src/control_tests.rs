// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn run_start_roundtrips_with_tag() {
    let msg = ControlMessage::RunStart {
        time: 1.0,
        num_tests: 0,
        test_names: None,
    };
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"type\":\"RunStart\""));
    let back: ControlMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(msg, back);
}

#[test]
fn entity_name_extracts_from_lifecycle_messages() {
    let start = ControlMessage::EntityStart {
        time: 1.0,
        info: EntityInfo {
            name: TestName::new("pkg.Test"),
            bundle: BundleName::new("cros"),
            package_path: String::new(),
        },
        out_dir: "/mock/local_out/pkg.Test.tmp1234".to_string(),
    };
    assert_eq!(start.entity_name().unwrap().as_str(), "pkg.Test");

    let heartbeat = ControlMessage::Heartbeat { time: 1.0 };
    assert!(heartbeat.entity_name().is_none());
}

#[test]
fn runner_args_defaults_omit_empty_fields() {
    let args = RunnerArgs::new(RunnerMode::ListFixtures);
    let json = serde_json::to_string(&args).unwrap();
    assert!(!json.contains("patterns"));
    assert!(!json.contains("startFixture"));
}

#[test]
fn runner_mode_uses_pascal_case() {
    let json = serde_json::to_string(&RunnerMode::RunTests).unwrap();
    assert_eq!(json, "\"RunTests\"");
}

#[test]
fn fixture_entry_serde_roundtrip() {
    let entry = FixtureEntry {
        name: FixtureName::new("fixt1B"),
        parent: Some(FixtureName::new("remoteFixt")),
    };
    let json = serde_json::to_string(&entry).unwrap();
    let back: FixtureEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(entry, back);
}
