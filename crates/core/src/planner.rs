// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixture-dependency planner (C4): partitions a selected test list into
//! [`TestChunk`]s keyed by the remote fixture each chunk transitively
//! depends on.
//!
//! The parent map is an arena (`Vec<Fixture>` plus a name→index map) per the
//! cycle-safety requirement in spec.md §4.4/§9: the upward walk carries a
//! `visited` guard so a cyclic or malicious fixture listing can't hang the
//! planner.

use crate::control::FixtureListing;
use crate::fixture::Fixture;
use crate::ids::{FixtureName, TestName};
use crate::test_entity::TestEntity;
use std::collections::{HashMap, HashSet};

/// Arena of fixtures restricted to those returned by the local bundle
/// listing, indexed by name for the upward walk.
struct FixtureArena {
    fixtures: Vec<Fixture>,
    index: HashMap<FixtureName, usize>,
}

impl FixtureArena {
    fn from_listing(listing: &FixtureListing) -> Self {
        let mut fixtures = Vec::new();
        let mut index = HashMap::new();
        for entries in listing.values() {
            for entry in entries {
                if index.contains_key(&entry.name) {
                    continue;
                }
                index.insert(entry.name.clone(), fixtures.len());
                fixtures.push(Fixture::new(
                    entry.name.clone(),
                    entry.parent.clone(),
                    crate::fixture::FixtureLocation::Local,
                ));
            }
        }
        Self { fixtures, index }
    }

    fn parent_of(&self, name: &FixtureName) -> Option<&FixtureName> {
        let idx = *self.index.get(name)?;
        self.fixtures[idx].parent.as_ref()
    }
}

/// Walks `start`'s ancestor chain looking for the first name present in
/// `remote_fixtures`. A revisited node (cycle) aborts the walk and reports
/// no remote ancestor, matching the "no remote ancestor" edge case.
fn resolve_start_fixture(
    start: &FixtureName,
    arena: &FixtureArena,
    remote_fixtures: &HashSet<FixtureName>,
) -> Option<FixtureName> {
    let mut current = start.clone();
    let mut visited = HashSet::new();
    loop {
        if remote_fixtures.contains(&current) {
            return Some(current);
        }
        if !visited.insert(current.clone()) {
            return None;
        }
        match arena.parent_of(&current) {
            Some(parent) => current = parent.clone(),
            None => return None,
        }
    }
}

/// One planned chunk before fixture setup has been attempted: tests plus
/// the resolved `start_fixture` (empty for the fixture-independent group).
pub struct PlannedGroup {
    pub start_fixture: Option<FixtureName>,
    pub tests: Vec<TestName>,
}

/// Groups `tests` by resolved `start_fixture`, preserving input order
/// within each group and producing the fixture-independent group first
/// (order among dependent groups is established later by
/// [`crate::chunk::chunk_order_key`]).
pub fn plan_groups(
    tests: &[TestEntity],
    listing: &FixtureListing,
    remote_fixtures: &HashSet<FixtureName>,
) -> Vec<PlannedGroup> {
    let arena = FixtureArena::from_listing(listing);

    let mut order: Vec<Option<FixtureName>> = Vec::new();
    let mut groups: HashMap<Option<FixtureName>, Vec<TestName>> = HashMap::new();

    for test in tests {
        let start = test
            .fixture
            .as_ref()
            .and_then(|f| resolve_start_fixture(f, &arena, remote_fixtures));

        if !groups.contains_key(&start) {
            order.push(start.clone());
        }
        groups.entry(start).or_default().push(test.name.clone());
    }

    order
        .into_iter()
        .map(|start_fixture| {
            let tests = groups.remove(&start_fixture).unwrap_or_default();
            PlannedGroup { start_fixture, tests }
        })
        .collect()
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
