// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newtype identifiers for the entities named in the data model.
//!
//! Keeping these distinct (rather than passing `String` everywhere) turns a
//! planner bug that mixes up a fixture name and a test name into a type
//! error instead of a silent runtime surprise.

crate::define_id! {
    /// Globally unique test name, e.g. `"pkg.MyTest"`.
    pub struct TestName;
}

crate::define_id! {
    /// Name of the bundle (library of tests) that owns a test.
    pub struct BundleName;
}

crate::define_id! {
    /// Name of a fixture node in the fixture DAG.
    pub struct FixtureName;
}

crate::define_id! {
    /// Identity of a single DUT connection: `{target address, key material path}`.
    #[derive(Default)]
    pub struct DutId;
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
