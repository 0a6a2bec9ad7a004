// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Flattening of hierarchy logs into linear logs
//!
//! A merge commit in a hierarchy log stands for itself plus every commit on
//! its merged side branches. Submodule histories are not part of the linear
//! log: their numstat paths are relative to the submodule, not the parent.

use crate::types::ChangeLogEntry;

/// Flatten one entry into the linear entries it represents
///
/// The entry comes first, followed by the flattened entries of each
/// `other_parents` branch in order (pre-order, depth first).
#[must_use]
pub fn hierarchy_log_to_linear_log_entry(entry: &ChangeLogEntry) -> Vec<&ChangeLogEntry> {
    let mut linear = Vec::new();
    push_linear(entry, &mut linear);
    linear
}

/// Flatten a whole hierarchy log
#[must_use]
pub fn hierarchy_log_to_linear_log(log: &[ChangeLogEntry]) -> Vec<&ChangeLogEntry> {
    let mut linear = Vec::new();
    for entry in log {
        push_linear(entry, &mut linear);
    }
    linear
}

fn push_linear<'a>(entry: &'a ChangeLogEntry, out: &mut Vec<&'a ChangeLogEntry>) {
    out.push(entry);
    for branch in &entry.other_parents {
        for sub_entry in branch {
            push_linear(sub_entry, out);
        }
    }
}
