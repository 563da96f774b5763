// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data-file stager (C5): copies the data files a selected test list
//! declares from the build workspace into the local staging directory that
//! ships alongside the local runner bundle.
//!
//! Entirely local filesystem I/O — no DUT interaction. The staged
//! directory is later bundled with the runner invocation by a caller
//! outside this crate's scope (spec.md §1 excludes build-bundle packaging).

use hostdrv_core::TestEntity;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Accounting of one [`stage_data_files`] call.
#[derive(Debug, Clone, Default)]
pub struct StagingReport {
    /// Destination paths written, relative to the staging directory.
    pub copied: Vec<PathBuf>,
    /// One entry per required file missing from the source workspace.
    pub warnings: Vec<String>,
}

/// The `<category>/data/<file>` path required by one test's data file
/// declaration, and the directory its copy is mirrored under at the
/// destination.
struct RequiredFile {
    source_relative: PathBuf,
    dest_relative: PathBuf,
}

/// Computes the union of data files required by `tests`, resolving each to
/// its `<bundle>/data/<file>` source path and its mirrored destination path
/// under `<package_path>/`. An `.external` sidecar, if present in the
/// source workspace, is staged in place of the real file.
fn required_files(tests: &[TestEntity]) -> Vec<RequiredFile> {
    let mut seen = BTreeSet::new();
    let mut required = Vec::new();
    for test in tests {
        for file in &test.data_files {
            let source_relative = Path::new(test.bundle.as_str()).join("data").join(file);
            let dest_relative = Path::new(&test.package_path).join("data").join(file);
            let key = (source_relative.clone(), dest_relative.clone());
            if seen.insert(key) {
                required.push(RequiredFile { source_relative, dest_relative });
            }
        }
    }
    required
}

/// Stages the data files `tests` require from `source_workspace` into
/// `local_data_dir`. Files already present at the destination are
/// overwritten; anything else already there (cached DUT artifacts from a
/// prior run) is left untouched. A required file missing from the source
/// workspace is a warning, not an error — the run proceeds and the test
/// fails on its own if it truly needed the file.
pub fn stage_data_files(
    source_workspace: &Path,
    local_data_dir: &Path,
    tests: &[TestEntity],
) -> std::io::Result<StagingReport> {
    let mut report = StagingReport::default();

    for required in required_files(tests) {
        let sidecar_relative = with_external_suffix(&required.source_relative);
        let sidecar_source = source_workspace.join(&sidecar_relative);
        let real_source = source_workspace.join(&required.source_relative);

        let mut staged_any = false;
        if sidecar_source.is_file() {
            let dest = local_data_dir.join(with_external_suffix(&required.dest_relative));
            copy_file(&sidecar_source, &dest)?;
            report.copied.push(dest);
            staged_any = true;
        }
        if real_source.is_file() {
            let dest = local_data_dir.join(&required.dest_relative);
            copy_file(&real_source, &dest)?;
            report.copied.push(dest);
            staged_any = true;
        }

        if !staged_any {
            report.warnings.push(format!(
                "data file `{}` declared but not found in the source workspace",
                required.source_relative.display()
            ));
        }
    }

    Ok(report)
}

fn with_external_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".external");
    PathBuf::from(name)
}

fn copy_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, dest)?;
    Ok(())
}

#[cfg(test)]
#[path = "stager_tests.rs"]
mod tests;
