// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Prune command - removes entries by sha with cascading collapse

use crate::hierarchy::{HierarchyPrune, RepeatPolicy};
use crate::io::{read_log, write_log};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Run the prune command
pub fn run(
    log_path: &Path,
    shas: &[String],
    policy: RepeatPolicy,
    output: &Path,
    pretty: bool,
) -> Result<()> {
    let log = read_log(log_path)?;
    let mut prune = HierarchyPrune::new(log)
        .with_context(|| format!("Failed to index {}", log_path.display()))?;

    info!("Indexed {} entries from {}", prune.len(), log_path.display());

    let removed = prune.prune_shas(shas, policy)?;
    for sha in &removed {
        info!("  removed {}", sha);
    }
    info!("Removed {} entries, {} remain", removed.len(), prune.remaining());

    write_log(output, prune.log(), pretty)
}
