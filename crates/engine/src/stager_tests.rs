// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hostdrv_core::{BundleName, TestName};

fn test_entity(name: &str, bundle: &str, package_path: &str, data_files: Vec<&str>) -> TestEntity {
    TestEntity {
        name: TestName::new(name),
        bundle: BundleName::new(bundle),
        package_path: package_path.to_string(),
        fixture: None,
        data_files: data_files.into_iter().map(String::from).collect(),
        skip_reason: String::new(),
    }
}

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn stages_declared_data_files_mirroring_source_layout() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    write(&source.path().join("pkgbundle/data/fixture.json"), "{}");

    let tests = vec![test_entity("pkg.Test", "pkgbundle", "pkg", vec!["fixture.json"])];
    let report = stage_data_files(source.path(), dest.path(), &tests).unwrap();

    assert!(report.warnings.is_empty());
    let staged = dest.path().join("pkg/data/fixture.json");
    assert_eq!(std::fs::read_to_string(staged).unwrap(), "{}");
}

#[test]
fn missing_source_file_is_a_warning_not_an_error() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();

    let tests = vec![test_entity("pkg.Test", "pkgbundle", "pkg", vec!["absent.bin"])];
    let report = stage_data_files(source.path(), dest.path(), &tests).unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("absent.bin"));
}

#[test]
fn external_sidecar_is_staged_alongside_the_real_file() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    write(&source.path().join("pkgbundle/data/big.bin"), "realdata");
    write(&source.path().join("pkgbundle/data/big.bin.external"), "fetch-me-at-runtime");

    let tests = vec![test_entity("pkg.Test", "pkgbundle", "pkg", vec!["big.bin"])];
    let report = stage_data_files(source.path(), dest.path(), &tests).unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(
        std::fs::read_to_string(dest.path().join("pkg/data/big.bin.external")).unwrap(),
        "fetch-me-at-runtime"
    );
    assert_eq!(std::fs::read_to_string(dest.path().join("pkg/data/big.bin")).unwrap(), "realdata");
}

#[test]
fn unrelated_existing_destination_files_are_preserved() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    write(&source.path().join("pkgbundle/data/fixture.json"), "{}");
    write(&dest.path().join("pkg/data/cached_artifact.bin"), "from-a-prior-run");

    let tests = vec![test_entity("pkg.Test", "pkgbundle", "pkg", vec!["fixture.json"])];
    stage_data_files(source.path(), dest.path(), &tests).unwrap();

    assert_eq!(
        std::fs::read_to_string(dest.path().join("pkg/data/cached_artifact.bin")).unwrap(),
        "from-a-prior-run"
    );
}

#[test]
fn staging_twice_is_idempotent() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    write(&source.path().join("pkgbundle/data/fixture.json"), "{}");

    let tests = vec![test_entity("pkg.Test", "pkgbundle", "pkg", vec!["fixture.json"])];
    stage_data_files(source.path(), dest.path(), &tests).unwrap();
    let before = std::fs::read(dest.path().join("pkg/data/fixture.json")).unwrap();
    stage_data_files(source.path(), dest.path(), &tests).unwrap();
    let after = std::fs::read(dest.path().join("pkg/data/fixture.json")).unwrap();

    assert_eq!(before, after);
}

#[test]
fn data_files_are_deduplicated_across_tests_sharing_the_same_file() {
    let source = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    write(&source.path().join("pkgbundle/data/shared.json"), "{}");

    let tests = vec![
        test_entity("pkg.TestA", "pkgbundle", "pkg", vec!["shared.json"]),
        test_entity("pkg.TestB", "pkgbundle", "pkg", vec!["shared.json"]),
    ];
    let report = stage_data_files(source.path(), dest.path(), &tests).unwrap();

    assert_eq!(report.copied.len(), 1);
}
