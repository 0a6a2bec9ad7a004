// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Cascading removal of single entries from a hierarchy log
//!
//! [`HierarchyPrune`] takes ownership of a hierarchy log and indexes every
//! entry by sha, recording how the entry hangs off the entry above it.
//! Removing an entry walks back up that chain: any upper entry left with
//! only empty branches is removed as well.
//!
//! Upper entries are referred to by sha, never by reference. Every lookup
//! resolves the path from the root, so a removed entry cannot be reached
//! through a stale handle.

use crate::error::{PruneError, PruneResult};
use crate::types::{BranchKey, ChangeLogEntry, HierarchyLog};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

// =========================================================================
// Prune Types
// =========================================================================

/// How an entry is reachable from the entry above it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum PruneType {
    /// Directly in the top-level hierarchy log
    Root,
    /// Inside `other_parents[index]` of the upper entry
    Leaf(usize),
    /// Inside `submodule_updates[path]` of the upper entry
    Submodule(String),
}

impl PruneType {
    fn from_upper_index_path(upper_index_path: Option<BranchKey>) -> Self {
        match upper_index_path {
            None => Self::Root,
            Some(BranchKey::Leaf(index)) => Self::Leaf(index),
            Some(BranchKey::Submodule(path)) => Self::Submodule(path),
        }
    }

    /// The branch of the upper entry holding this item, `None` for roots
    #[must_use]
    pub fn branch_key(&self) -> Option<BranchKey> {
        match self {
            Self::Root => None,
            Self::Leaf(index) => Some(BranchKey::Leaf(*index)),
            Self::Submodule(path) => Some(BranchKey::Submodule(path.clone())),
        }
    }

    /// Is this a top-level entry
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl fmt::Display for PruneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "ROOT"),
            Self::Leaf(index) => write!(f, "LEAF[{index}]"),
            Self::Submodule(path) => write!(f, "SUBMODULE[{path}]"),
        }
    }
}

/// Index record for one entry of the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneableItem {
    prune_type: PruneType,
    sha: String,
    upper_sha: Option<String>,
    pruned: bool,
}

impl PruneableItem {
    /// How the entry hangs off its upper entry
    #[must_use]
    pub fn prune_type(&self) -> &PruneType {
        &self.prune_type
    }

    /// Sha of the entry
    #[must_use]
    pub fn sha(&self) -> &str {
        &self.sha
    }

    /// Sha of the entry one level up, `None` for roots
    #[must_use]
    pub fn upper_sha(&self) -> Option<&str> {
        self.upper_sha.as_deref()
    }

    /// Branch of the upper entry this item lives in, `None` for roots
    #[must_use]
    pub fn upper_index_path(&self) -> Option<BranchKey> {
        self.prune_type.branch_key()
    }

    /// Whether the entry has been removed from the tree
    #[must_use]
    pub fn is_pruned(&self) -> bool {
        self.pruned
    }
}

/// What to do when a batch names an entry that is already gone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatPolicy {
    /// Fail the batch
    #[default]
    Error,
    /// Log a warning and carry on
    Skip,
}

// =========================================================================
// Hierarchy Prune
// =========================================================================

type ContainerPath = Vec<(String, BranchKey)>;

/// Sha index over an owned hierarchy log supporting cascading removal
#[derive(Debug, Clone)]
pub struct HierarchyPrune {
    hierarchy_log: HierarchyLog,
    prunables: HashMap<String, PruneableItem>,
    /// Shas in pre-order, for stable listings
    order: Vec<String>,
}

impl HierarchyPrune {
    /// Index `hierarchy_log`, failing on the first duplicated sha
    pub fn new(hierarchy_log: HierarchyLog) -> PruneResult<Self> {
        let mut prunables = HashMap::new();
        let mut order = Vec::new();
        create_prunables_map(&hierarchy_log, None, None, &mut prunables, &mut order)?;

        debug!(
            "indexed {} entries ({} at root)",
            prunables.len(),
            hierarchy_log.len()
        );

        Ok(Self {
            hierarchy_log,
            prunables,
            order,
        })
    }

    /// Number of indexed entries, pruned ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.prunables.len()
    }

    /// True if the log had no entries at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prunables.is_empty()
    }

    /// Number of entries still in the tree
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.prunables.values().filter(|item| !item.pruned).count()
    }

    /// Look up the index record for `sha`
    #[must_use]
    pub fn get(&self, sha: &str) -> Option<&PruneableItem> {
        self.prunables.get(sha)
    }

    /// Has `sha` been removed from the tree
    #[must_use]
    pub fn is_pruned(&self, sha: &str) -> bool {
        self.prunables.get(sha).is_some_and(|item| item.pruned)
    }

    /// All index records in pre-order
    pub fn items(&self) -> impl Iterator<Item = &PruneableItem> {
        self.order.iter().filter_map(|sha| self.prunables.get(sha))
    }

    /// Borrow the entry for `sha` if it is still in the tree
    #[must_use]
    pub fn entry(&self, sha: &str) -> Option<&ChangeLogEntry> {
        if self.prunables.get(sha)?.pruned {
            return None;
        }
        let path = self.container_path(sha).ok()?;
        branch_at(&self.hierarchy_log, &path)?
            .iter()
            .find(|entry| entry.sha == sha)
    }

    /// Borrow the (possibly pruned) hierarchy log
    #[must_use]
    pub fn log(&self) -> &[ChangeLogEntry] {
        &self.hierarchy_log
    }

    /// Give the hierarchy log back to the caller
    #[must_use]
    pub fn into_log(self) -> HierarchyLog {
        self.hierarchy_log
    }

    /// Remove the entry `sha` and collapse every upper entry left without
    /// subordinate history.
    ///
    /// Returns the removed shas, `sha` first and then each collapsed upper
    /// entry going up. The tree is left untouched when an error is returned.
    pub fn prune_sha(&mut self, sha: &str) -> PruneResult<Vec<String>> {
        let item = self
            .prunables
            .get(sha)
            .ok_or_else(|| PruneError::UnknownSha(sha.to_string()))?;
        if item.pruned {
            return Err(PruneError::AlreadyPruned(sha.to_string()));
        }

        // Resolve everything before mutating.
        let mut path = self.container_path(sha)?;
        let container = branch_at(&self.hierarchy_log, &path)
            .ok_or_else(|| inconsistent(sha, "container branch not found"))?;
        if !container.iter().any(|entry| entry.sha == sha) {
            return Err(inconsistent(sha, "entry missing from its container"));
        }

        let mut removed = Vec::new();
        let mut current = sha.to_string();

        loop {
            let container = branch_at_mut(&mut self.hierarchy_log, &path)
                .ok_or_else(|| inconsistent(&current, "container branch not found"))?;
            let position = container
                .iter()
                .position(|entry| entry.sha == current)
                .ok_or_else(|| inconsistent(&current, "entry missing from its container"))?;
            let entry = container.remove(position);
            mark_pruned(&mut self.prunables, &entry);
            debug!("pruned {}", current);
            removed.push(current);

            let Some((upper_sha, _)) = path.pop() else {
                break;
            };

            let upper = branch_at(&self.hierarchy_log, &path)
                .and_then(|branch| branch.iter().find(|entry| entry.sha == upper_sha))
                .ok_or_else(|| inconsistent(&upper_sha, "upper entry not found"))?;
            if !upper.has_no_subordinates() {
                break;
            }

            debug!("{} has no subordinate history left, collapsing", upper_sha);
            current = upper_sha;
        }

        Ok(removed)
    }

    /// Prune several shas in order
    ///
    /// Unknown shas always fail. Shas already removed fail or are skipped
    /// depending on `policy`. Entries removed before a failure stay removed.
    pub fn prune_shas<I, S>(&mut self, shas: I, policy: RepeatPolicy) -> PruneResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = Vec::new();
        for sha in shas {
            match self.prune_sha(sha.as_ref()) {
                Ok(cascade) => removed.extend(cascade),
                Err(PruneError::AlreadyPruned(sha)) if policy == RepeatPolicy::Skip => {
                    warn!("skipping {}: already pruned", sha);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(removed)
    }

    /// Steps from the root down to the branch holding `sha`
    fn container_path(&self, sha: &str) -> PruneResult<ContainerPath> {
        let mut steps = Vec::new();
        let mut current = self
            .prunables
            .get(sha)
            .ok_or_else(|| PruneError::UnknownSha(sha.to_string()))?;

        while let Some(upper_sha) = &current.upper_sha {
            let key = current
                .prune_type
                .branch_key()
                .ok_or_else(|| inconsistent(&current.sha, "root item with an upper entry"))?;
            steps.push((upper_sha.clone(), key));
            current = self
                .prunables
                .get(upper_sha)
                .ok_or_else(|| inconsistent(upper_sha, "upper entry not indexed"))?;
        }

        steps.reverse();
        Ok(steps)
    }
}

fn inconsistent(sha: &str, reason: &str) -> PruneError {
    PruneError::Inconsistent {
        sha: sha.to_string(),
        reason: reason.to_string(),
    }
}

/// Pre-order walk inserting one item per entry
fn create_prunables_map(
    hier_log: &[ChangeLogEntry],
    upper_sha: Option<&str>,
    upper_index_path: Option<BranchKey>,
    prunables: &mut HashMap<String, PruneableItem>,
    order: &mut Vec<String>,
) -> PruneResult<()> {
    // shared by every entry of this list
    let prune_type = PruneType::from_upper_index_path(upper_index_path);

    for entry in hier_log {
        match prunables.entry(entry.sha.clone()) {
            Entry::Occupied(_) => return Err(PruneError::DuplicateSha(entry.sha.clone())),
            Entry::Vacant(slot) => {
                slot.insert(PruneableItem {
                    prune_type: prune_type.clone(),
                    sha: entry.sha.clone(),
                    upper_sha: upper_sha.map(str::to_string),
                    pruned: false,
                });
            }
        }
        order.push(entry.sha.clone());

        for (index, branch) in entry.other_parents.iter().enumerate() {
            create_prunables_map(
                branch,
                Some(entry.sha.as_str()),
                Some(BranchKey::Leaf(index)),
                prunables,
                order,
            )?;
        }
        for (path, update) in &entry.submodule_updates {
            create_prunables_map(
                &update.entries,
                Some(entry.sha.as_str()),
                Some(BranchKey::Submodule(path.clone())),
                prunables,
                order,
            )?;
        }
    }

    Ok(())
}

/// Mark `entry` and everything below it as pruned
fn mark_pruned(prunables: &mut HashMap<String, PruneableItem>, entry: &ChangeLogEntry) {
    if let Some(item) = prunables.get_mut(&entry.sha) {
        item.pruned = true;
    }
    for sub_entry in entry
        .other_parents
        .iter()
        .flatten()
        .chain(entry.submodule_updates.values().flat_map(|u| &u.entries))
    {
        mark_pruned(prunables, sub_entry);
    }
}

fn branch_at<'a>(
    list: &'a [ChangeLogEntry],
    path: &[(String, BranchKey)],
) -> Option<&'a [ChangeLogEntry]> {
    match path.split_first() {
        None => Some(list),
        Some(((sha, key), rest)) => {
            let entry = list.iter().find(|entry| &entry.sha == sha)?;
            branch_at(entry.branch(key)?, rest)
        }
    }
}

fn branch_at_mut<'a>(
    list: &'a mut Vec<ChangeLogEntry>,
    path: &[(String, BranchKey)],
) -> Option<&'a mut Vec<ChangeLogEntry>> {
    match path.split_first() {
        None => Some(list),
        Some(((sha, key), rest)) => {
            let entry = list.iter_mut().find(|entry| &entry.sha == sha)?;
            branch_at_mut(entry.branch_mut(key)?, rest)
        }
    }
}
