// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Histprune library - pruning for hierarchical git change logs
//!
//! A hierarchy log is a first-parent chain of commits where each commit may
//! carry the side branches of a merge (`other_parents`) and the nested
//! histories of its submodules (`submodule_updates`). This crate provides
//! two ways to cut such a log down:
//!
//! - [`filter::first_parent_prune_by_file_list`] keeps only the commits that
//!   touch a set of files, directly or through a submodule.
//! - [`hierarchy::HierarchyPrune`] removes single commits by sha and
//!   collapses every parent that is left without subordinate history.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod io;
pub mod linear;

/// Core data types of a hierarchy log
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fmt;

    // =========================================================================
    // Numstat
    // =========================================================================

    /// One line of `git log --numstat` output
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct NumstatEntry {
        /// Path of the changed file, relative to the repository root
        pub path: String,
        /// Added lines (`None` for binary files)
        #[serde(default)]
        pub additions: Option<u64>,
        /// Deleted lines (`None` for binary files)
        #[serde(default)]
        pub deletions: Option<u64>,
    }

    impl NumstatEntry {
        /// Create a numstat record for a text file change
        #[must_use]
        pub fn new(path: impl Into<String>, additions: u64, deletions: u64) -> Self {
            Self {
                path: path.into(),
                additions: Some(additions),
                deletions: Some(deletions),
            }
        }

        /// Create a numstat record for a binary file change
        #[must_use]
        pub fn binary(path: impl Into<String>) -> Self {
            Self {
                path: path.into(),
                additions: None,
                deletions: None,
            }
        }
    }

    // =========================================================================
    // Submodule Updates
    // =========================================================================

    /// The commits a submodule pointer moved over within one parent commit
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SubmoduleUpdate {
        /// Submodule commit before the update
        #[serde(default)]
        pub from_sha: Option<String>,
        /// Submodule commit after the update
        #[serde(default)]
        pub to_sha: Option<String>,
        /// Nested hierarchy log of the submodule
        #[serde(default)]
        pub entries: Vec<ChangeLogEntry>,
    }

    impl SubmoduleUpdate {
        /// Create an update carrying only its nested log
        #[must_use]
        pub fn from_entries(entries: Vec<ChangeLogEntry>) -> Self {
            Self {
                from_sha: None,
                to_sha: None,
                entries,
            }
        }
    }

    // =========================================================================
    // Branch Keys
    // =========================================================================

    /// Identifies one subordinate branch of an entry
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BranchKey {
        /// Index into `other_parents`
        Leaf(usize),
        /// Path key into `submodule_updates`
        Submodule(String),
    }

    impl fmt::Display for BranchKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Leaf(index) => write!(f, "other_parents[{index}]"),
                Self::Submodule(path) => write!(f, "submodule_updates[{path}]"),
            }
        }
    }

    // =========================================================================
    // Change Log Entry
    // =========================================================================

    /// A commit in a hierarchy log
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChangeLogEntry {
        /// Commit sha, unique within one hierarchy
        pub sha: String,
        /// Parent commit shas as reported by git
        #[serde(default)]
        pub parent_shas: Vec<String>,
        /// Commit subject line
        #[serde(default)]
        pub subject: Option<String>,
        /// Author name
        #[serde(default)]
        pub author: Option<String>,
        /// Committer date
        #[serde(default)]
        pub commit_date: Option<DateTime<Utc>>,
        /// Per-file change statistics
        #[serde(default)]
        pub numstat: Vec<NumstatEntry>,
        /// Non-first-parent branches of a merge, each a nested chain
        #[serde(default)]
        pub other_parents: Vec<Vec<ChangeLogEntry>>,
        /// Nested submodule histories keyed by submodule path
        #[serde(default)]
        pub submodule_updates: BTreeMap<String, SubmoduleUpdate>,
    }

    impl ChangeLogEntry {
        /// Create a bare entry with only a sha
        #[must_use]
        pub fn new(sha: impl Into<String>) -> Self {
            Self {
                sha: sha.into(),
                ..Self::default()
            }
        }

        /// Add a numstat record
        #[must_use]
        pub fn with_numstat(mut self, numstat: NumstatEntry) -> Self {
            self.numstat.push(numstat);
            self
        }

        /// Append an `other_parents` branch
        #[must_use]
        pub fn with_other_parent(mut self, branch: Vec<ChangeLogEntry>) -> Self {
            self.other_parents.push(branch);
            self
        }

        /// Add (or replace) a submodule update
        #[must_use]
        pub fn with_submodule(
            mut self,
            path: impl Into<String>,
            entries: Vec<ChangeLogEntry>,
        ) -> Self {
            self.submodule_updates
                .insert(path.into(), SubmoduleUpdate::from_entries(entries));
            self
        }

        /// Paths touched by this commit itself
        pub fn touched_paths(&self) -> impl Iterator<Item = &str> {
            self.numstat.iter().map(|n| n.path.as_str())
        }

        /// True when every `other_parents` branch and every submodule entry
        /// list is empty. Vacuously true for an entry without any.
        #[must_use]
        pub fn has_no_subordinates(&self) -> bool {
            self.other_parents.iter().all(Vec::is_empty)
                && self.submodule_updates.values().all(|u| u.entries.is_empty())
        }

        /// Borrow the subordinate branch named by `key`
        #[must_use]
        pub fn branch(&self, key: &BranchKey) -> Option<&Vec<ChangeLogEntry>> {
            match key {
                BranchKey::Leaf(index) => self.other_parents.get(*index),
                BranchKey::Submodule(path) => self.submodule_updates.get(path).map(|u| &u.entries),
            }
        }

        /// Mutably borrow the subordinate branch named by `key`
        pub fn branch_mut(&mut self, key: &BranchKey) -> Option<&mut Vec<ChangeLogEntry>> {
            match key {
                BranchKey::Leaf(index) => self.other_parents.get_mut(*index),
                BranchKey::Submodule(path) => {
                    self.submodule_updates.get_mut(path).map(|u| &mut u.entries)
                }
            }
        }
    }

    // =========================================================================
    // Hierarchy Log
    // =========================================================================

    /// The root first-parent chain of a hierarchy
    pub type HierarchyLog = Vec<ChangeLogEntry>;

    /// Count every entry reachable from `log`, through `other_parents` and
    /// `submodule_updates` at any depth
    #[must_use]
    pub fn count_entries(log: &[ChangeLogEntry]) -> usize {
        log.iter()
            .map(|entry| {
                1 + entry
                    .other_parents
                    .iter()
                    .map(|branch| count_entries(branch))
                    .sum::<usize>()
                    + entry
                        .submodule_updates
                        .values()
                        .map(|u| count_entries(&u.entries))
                        .sum::<usize>()
            })
            .sum()
    }

}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::{PruneError, PruneResult};
    pub use crate::filter::{
        first_parent_prune_by, first_parent_prune_by_file_list, match_in_entry, FileMatcher,
    };
    pub use crate::hierarchy::{HierarchyPrune, PruneType, PruneableItem, RepeatPolicy};
    pub use crate::linear::{hierarchy_log_to_linear_log, hierarchy_log_to_linear_log_entry};
    pub use crate::types::*;
}
