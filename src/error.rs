// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for the prune engine

use thiserror::Error;

/// Errors raised while indexing or pruning a hierarchy log
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PruneError {
    /// The sha is not part of the indexed hierarchy
    #[error("unknown sha: {0}")]
    UnknownSha(String),

    /// The sha was already removed, directly or with one of its ancestors
    #[error("sha already pruned: {0}")]
    AlreadyPruned(String),

    /// The same sha occurs more than once in the hierarchy
    #[error("duplicate sha in hierarchy: {0}")]
    DuplicateSha(String),

    /// The index no longer describes the tree
    #[error("inconsistent hierarchy at {sha}: {reason}")]
    Inconsistent {
        /// Entry whose location could not be resolved
        sha: String,
        /// What failed to resolve
        reason: String,
    },
}

impl PruneError {
    /// Check if this error means the sha was never indexed
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownSha(_))
    }

    /// Check if this error is a repeated removal
    #[must_use]
    pub fn is_repeat(&self) -> bool {
        matches!(self, Self::AlreadyPruned(_))
    }
}

/// Result type alias for prune operations
pub type PruneResult<T> = Result<T, PruneError>;
