// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Index command - lists every entry with its prune type and upper entry

use crate::hierarchy::{HierarchyPrune, PruneableItem};
use crate::io::read_log;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::fmt::Write as _;
use std::path::Path;

/// Run the index command
pub fn run(log_path: &Path, json: bool, color: bool) -> Result<()> {
    let prune = HierarchyPrune::new(read_log(log_path)?)
        .with_context(|| format!("Failed to index {}", log_path.display()))?;

    if json {
        let items: Vec<&PruneableItem> = prune.items().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&items).context("Failed to serialize index")?
        );
    } else {
        print!("{}", render_table(&prune, color));
    }

    Ok(())
}

/// Render the index as a plain text table
#[must_use]
pub fn render_table(prune: &HierarchyPrune, color: bool) -> String {
    let mut out = String::new();

    if prune.is_empty() {
        out.push_str("No entries.\n");
        return out;
    }

    let _ = writeln!(out, "Entries ({}):", prune.len());
    for item in prune.items() {
        let kind = format!("{:<24}", item.prune_type().to_string());
        let upper = item.upper_sha().unwrap_or("-");
        if color {
            let _ = writeln!(out, "  {}  {}  {}", item.sha().yellow(), kind.cyan(), upper.dimmed());
        } else {
            let _ = writeln!(out, "  {}  {}  {}", item.sha(), kind, upper);
        }
    }

    out
}
