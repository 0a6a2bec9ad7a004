// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for the prune engine
//!
//! These tests verify critical invariants:
//! 1. Index completeness - every reachable entry is indexed exactly once
//! 2. Type correctness - prune type and upper entry always agree
//! 3. Cascade collapse - no emptied parent survives a removal
//! 4. Atomicity - failed removals leave the tree untouched
//! 5. File relevance - first-parent filtering keeps exactly what matches

use histprune::error::PruneError;
use histprune::filter::first_parent_prune_by_file_list;
use histprune::hierarchy::{HierarchyPrune, PruneType};
use histprune::types::{
    count_entries, BranchKey, ChangeLogEntry, HierarchyLog, NumstatEntry, SubmoduleUpdate,
};
use proptest::prelude::*;
use proptest::sample::Index;

// =============================================================================
// Test Helpers
// =============================================================================

fn entry(sha: &str) -> ChangeLogEntry {
    ChangeLogEntry::new(sha)
}

fn touching(sha: &str, path: &str) -> ChangeLogEntry {
    ChangeLogEntry::new(sha).with_numstat(NumstatEntry::new(path, 1, 1))
}

fn files(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| (*p).to_string()).collect()
}

fn shas(log: &[ChangeLogEntry]) -> Vec<&str> {
    log.iter().map(|e| e.sha.as_str()).collect()
}

/// Shape of a generated entry, shas are assigned afterwards
#[derive(Debug, Clone, Default)]
struct Shape {
    other_parents: Vec<Vec<Shape>>,
    submodules: Vec<Vec<Shape>>,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    Just(Shape::default()).prop_recursive(3, 32, 3, |inner| {
        (
            prop::collection::vec(prop::collection::vec(inner.clone(), 0..3), 0..3),
            prop::collection::vec(prop::collection::vec(inner, 0..3), 0..2),
        )
            .prop_map(|(other_parents, submodules)| Shape {
                other_parents,
                submodules,
            })
    })
}

fn build(shape: &Shape, counter: &mut usize) -> ChangeLogEntry {
    let mut built = ChangeLogEntry::new(format!("{:040x}", *counter));
    *counter += 1;

    for branch in &shape.other_parents {
        let branch = branch.iter().map(|s| build(s, counter)).collect();
        built.other_parents.push(branch);
    }
    for (i, branch) in shape.submodules.iter().enumerate() {
        let entries = branch.iter().map(|s| build(s, counter)).collect();
        built
            .submodule_updates
            .insert(format!("libs/m{i}"), SubmoduleUpdate::from_entries(entries));
    }

    built
}

fn log_strategy() -> impl Strategy<Value = HierarchyLog> {
    prop::collection::vec(shape_strategy(), 1..5).prop_map(|shapes| {
        let mut counter = 0;
        shapes.iter().map(|s| build(s, &mut counter)).collect()
    })
}

// =============================================================================
// Indexing Tests
// =============================================================================

#[test]
fn test_index_counts_every_branch() {
    let log = vec![
        entry("a")
            .with_other_parent(vec![entry("b").with_submodule("s", vec![entry("c")])])
            .with_submodule("t", vec![entry("d").with_other_parent(vec![entry("e")])]),
        entry("f"),
    ];
    let prune = HierarchyPrune::new(log.clone()).unwrap();

    assert_eq!(prune.len(), 6);
    assert_eq!(prune.len(), count_entries(&log));
    assert_eq!(prune.get("c").unwrap().prune_type(), &PruneType::Submodule("s".into()));
    assert_eq!(prune.get("c").unwrap().upper_sha(), Some("b"));
    assert_eq!(prune.get("e").unwrap().prune_type(), &PruneType::Leaf(0));
    assert_eq!(prune.get("e").unwrap().upper_sha(), Some("d"));
}

#[test]
fn test_duplicate_sha_in_submodule_rejected() {
    let log = vec![entry("a").with_submodule("s", vec![entry("a")])];
    assert_eq!(
        HierarchyPrune::new(log).unwrap_err(),
        PruneError::DuplicateSha("a".into())
    );
}

// =============================================================================
// Removal Tests
// =============================================================================

#[test]
fn test_single_root_removal_keeps_order() {
    let log = vec![entry("a"), entry("b"), entry("c"), entry("d")];
    let mut prune = HierarchyPrune::new(log).unwrap();

    assert_eq!(prune.prune_sha("b").unwrap(), vec!["b"]);
    assert_eq!(shas(prune.log()), vec!["a", "c", "d"]);
}

#[test]
fn test_cascade_collapse_single_branch() {
    let log = vec![entry("r"), entry("e").with_other_parent(vec![entry("l")])];
    let mut prune = HierarchyPrune::new(log).unwrap();

    assert_eq!(prune.prune_sha("l").unwrap(), vec!["l", "e"]);
    assert_eq!(shas(prune.log()), vec!["r"]);
}

#[test]
fn test_cascade_not_triggered_with_sibling_branch() {
    let log = vec![entry("e")
        .with_other_parent(vec![entry("l1")])
        .with_other_parent(vec![entry("l2")])];
    let mut prune = HierarchyPrune::new(log).unwrap();

    assert_eq!(prune.prune_sha("l1").unwrap(), vec!["l1"]);
    assert_eq!(shas(prune.log()), vec!["e"]);
    assert_eq!(shas(&prune.log()[0].other_parents[1]), vec!["l2"]);
}

#[test]
fn test_cascade_blocked_by_submodule() {
    let log = vec![entry("e")
        .with_other_parent(vec![entry("l")])
        .with_submodule("libs/x", vec![entry("s")])];
    let mut prune = HierarchyPrune::new(log).unwrap();

    assert_eq!(prune.prune_sha("l").unwrap(), vec!["l"]);
    assert!(prune.entry("e").is_some());
}

#[test]
fn test_unknown_sha_leaves_tree_unmodified() {
    let log = vec![entry("a").with_other_parent(vec![entry("b")])];
    let mut prune = HierarchyPrune::new(log.clone()).unwrap();

    let err = prune.prune_sha("nonexistent").unwrap_err();
    assert_eq!(err, PruneError::UnknownSha("nonexistent".into()));
    assert_eq!(prune.log(), log.as_slice());
}

#[test]
fn test_collapsed_ancestor_blocks_descendants() {
    let log = vec![entry("e")
        .with_other_parent(vec![entry("l1")])
        .with_submodule("s", vec![entry("s1").with_other_parent(vec![entry("deep")])])];
    let mut prune = HierarchyPrune::new(log).unwrap();

    prune.prune_sha("e").unwrap();
    for sha in ["l1", "s1", "deep"] {
        assert!(prune.is_pruned(sha), "{sha} should be pruned with its ancestor");
        assert!(prune.prune_sha(sha).unwrap_err().is_repeat());
    }
}

// =============================================================================
// File Relevance Tests
// =============================================================================

#[test]
fn test_file_prune_all_match_unchanged() {
    let mut log = vec![touching("a", "x"), touching("b", "x"), touching("c", "x")];
    let before = log.clone();
    first_parent_prune_by_file_list(&mut log, &files(&["x"]));
    assert_eq!(log, before);
}

#[test]
fn test_file_prune_total_removal() {
    let mut log = vec![
        touching("a", "y").with_submodule("s", vec![touching("b", "z")]),
        touching("c", "y"),
    ];
    assert!(first_parent_prune_by_file_list(&mut log, &files(&["x"])).is_empty());
}

#[test]
fn test_file_prune_submodule_retains_parent() {
    let mut log = vec![touching("a", "top.txt").with_submodule(
        "libs/x",
        vec![touching("b", "wanted.c"), touching("c", "unwanted.c")],
    )];
    first_parent_prune_by_file_list(&mut log, &files(&["wanted.c"]));

    assert_eq!(shas(&log), vec!["a"]);
    assert_eq!(shas(&log[0].submodule_updates["libs/x"].entries), vec!["b"]);
}

#[test]
fn test_file_prune_ignores_side_branch_contents() {
    let branch = vec![touching("b", "y"), touching("c", "x")];
    let mut log = vec![entry("m").with_other_parent(branch.clone())];
    first_parent_prune_by_file_list(&mut log, &files(&["x"]));

    assert_eq!(shas(&log), vec!["m"]);
    assert_eq!(log[0].other_parents[0], branch);
}

// =============================================================================
// Generated Hierarchies
// =============================================================================

proptest! {
    #[test]
    fn prop_index_is_complete(log in log_strategy()) {
        let total = count_entries(&log);
        let prune = HierarchyPrune::new(log).unwrap();

        prop_assert_eq!(prune.len(), total);
        prop_assert_eq!(prune.items().count(), total);
        prop_assert_eq!(prune.remaining(), total);
    }

    #[test]
    fn prop_prune_type_matches_upper(log in log_strategy()) {
        let prune = HierarchyPrune::new(log).unwrap();

        for item in prune.items() {
            prop_assert_eq!(item.upper_sha().is_none(), item.prune_type().is_root());
            match (item.prune_type(), item.upper_index_path()) {
                (PruneType::Root, None) => {}
                (PruneType::Leaf(i), Some(BranchKey::Leaf(j))) => {
                    prop_assert_eq!(*i, j);
                }
                (PruneType::Submodule(p), Some(BranchKey::Submodule(q))) => {
                    prop_assert_eq!(p, &q);
                }
                (prune_type, key) => {
                    prop_assert!(false, "mismatch: {:?} vs {:?}", prune_type, key);
                }
            }
        }
    }

    #[test]
    fn prop_prune_collapses_and_is_atomic(log in log_strategy(), pick in any::<Index>()) {
        let mut prune = HierarchyPrune::new(log).unwrap();
        let all: Vec<String> = prune.items().map(|item| item.sha().to_string()).collect();
        let target = pick.get(&all).clone();

        let removed = prune.prune_sha(&target).unwrap();
        prop_assert_eq!(&removed[0], &target);

        // tree and index agree on what is left
        prop_assert_eq!(count_entries(prune.log()), prune.remaining());
        for sha in &removed {
            prop_assert!(prune.entry(sha).is_none());
        }

        // the cascade stopped at an entry that still has history, or at the root
        let last = prune.get(removed.last().unwrap()).unwrap();
        if let Some(upper) = last.upper_sha() {
            let upper = prune.entry(upper).unwrap();
            prop_assert!(!upper.has_no_subordinates());
        }

        // a repeat is rejected without touching the tree
        let snapshot = prune.log().to_vec();
        prop_assert!(prune.prune_sha(&target).unwrap_err().is_repeat());
        prop_assert_eq!(prune.log(), snapshot.as_slice());
    }
}
