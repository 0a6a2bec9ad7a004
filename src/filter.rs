// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! File-relevance pruning of first-parent chains
//!
//! Only the first-parent chain and the submodule histories hanging off it
//! are filtered. Merge side branches (`other_parents`) are inspected for
//! matching files but never pruned themselves.

use crate::linear::hierarchy_log_to_linear_log_entry;
use crate::types::ChangeLogEntry;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;
use tracing::{debug, trace};

/// Decides whether a file path is relevant
pub trait FileMatcher {
    /// True if `path` is relevant
    fn matches(&self, path: &str) -> bool;
}

impl FileMatcher for [String] {
    fn matches(&self, path: &str) -> bool {
        self.iter().any(|p| p == path)
    }
}

impl FileMatcher for [&str] {
    fn matches(&self, path: &str) -> bool {
        self.contains(&path)
    }
}

impl FileMatcher for Vec<String> {
    fn matches(&self, path: &str) -> bool {
        self.as_slice().matches(path)
    }
}

impl<S: BuildHasher> FileMatcher for HashSet<String, S> {
    fn matches(&self, path: &str) -> bool {
        self.contains(path)
    }
}

impl FileMatcher for BTreeSet<String> {
    fn matches(&self, path: &str) -> bool {
        self.contains(path)
    }
}

impl FileMatcher for GlobSet {
    fn matches(&self, path: &str) -> bool {
        self.is_match(path)
    }
}

impl<M: FileMatcher + ?Sized> FileMatcher for &M {
    fn matches(&self, path: &str) -> bool {
        (**self).matches(path)
    }
}

/// Build a glob matcher from a list of patterns
pub fn build_glob_set<I, S>(patterns: I) -> Result<GlobSet, globset::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref())?);
    }
    builder.build()
}

/// Does `entry` touch any file accepted by `matcher`
pub fn match_in_entry<M: FileMatcher + ?Sized>(entry: &ChangeLogEntry, matcher: &M) -> bool {
    entry.touched_paths().any(|path| matcher.matches(path))
}

/// Filter a first-parent chain down to the entries touching `file_list`
///
/// See [`first_parent_prune_by`] for the rules.
pub fn first_parent_prune_by_file_list<'a>(
    changelog: &'a mut Vec<ChangeLogEntry>,
    file_list: &[String],
) -> &'a mut Vec<ChangeLogEntry> {
    first_parent_prune_by(changelog, file_list)
}

/// Filter a first-parent chain down to the entries relevant to `matcher`
///
/// An entry survives if it, or any entry on its merged side branches,
/// touches a matching file, or if at least one of its submodule histories
/// still has entries after being filtered recursively. Submodules left
/// empty are dropped from `submodule_updates`. Survivors keep their order
/// and the same vector is returned.
pub fn first_parent_prune_by<'a, M: FileMatcher + ?Sized>(
    changelog: &'a mut Vec<ChangeLogEntry>,
    matcher: &M,
) -> &'a mut Vec<ChangeLogEntry> {
    let mut remove_indices = Vec::new();

    for (index, entry) in changelog.iter_mut().enumerate() {
        let matches_by_numstat = hierarchy_log_to_linear_log_entry(entry)
            .into_iter()
            .any(|linear_entry| match_in_entry(linear_entry, matcher));

        entry.submodule_updates.retain(|path, update| {
            first_parent_prune_by(&mut update.entries, matcher);
            if update.entries.is_empty() {
                trace!(submodule = %path, "dropping emptied submodule update");
                false
            } else {
                true
            }
        });

        let matches_by_submodule = entry
            .submodule_updates
            .values()
            .any(|update| !update.entries.is_empty());

        if !matches_by_numstat && !matches_by_submodule {
            remove_indices.push(index);
        }
    }

    debug!(
        "first-parent prune removes {} of {} entries",
        remove_indices.len(),
        changelog.len()
    );

    for index in remove_indices.into_iter().rev() {
        changelog.remove(index);
    }

    changelog
}
