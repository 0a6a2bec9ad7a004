// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Files command - keeps the first-parent entries touching given files

use crate::filter::{
    build_glob_set, first_parent_prune_by, first_parent_prune_by_file_list, FileMatcher,
};
use crate::io::{read_log, write_log};
use crate::types::count_entries;
use anyhow::{Context, Result};
use globset::GlobSet;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Exact paths plus glob patterns; a path is relevant if either accepts it
#[derive(Debug)]
pub struct Relevance {
    files: HashSet<String>,
    globs: GlobSet,
}

impl Relevance {
    /// Build from exact paths and glob patterns
    pub fn new(files: &[String], globs: &[String]) -> Result<Self> {
        let globs = build_glob_set(globs).context("Invalid glob pattern")?;
        Ok(Self {
            files: files.iter().cloned().collect(),
            globs,
        })
    }
}

impl FileMatcher for Relevance {
    fn matches(&self, path: &str) -> bool {
        self.files.contains(path) || self.globs.is_match(path)
    }
}

/// Run the files command
pub fn run(
    log_path: &Path,
    files: &[String],
    globs: &[String],
    output: &Path,
    pretty: bool,
) -> Result<()> {
    if files.is_empty() && globs.is_empty() {
        anyhow::bail!("At least one --file or --glob is required");
    }

    info!("Filtering {} by file relevance", log_path.display());

    let mut log = read_log(log_path)?;
    let before = count_entries(&log);

    if globs.is_empty() {
        first_parent_prune_by_file_list(&mut log, files);
    } else {
        let relevance = Relevance::new(files, globs)?;
        first_parent_prune_by(&mut log, &relevance);
    }

    info!(
        "Kept {} of {} entries ({} on the first-parent chain)",
        count_entries(&log),
        before,
        log.len()
    );

    write_log(output, &log, pretty)
}
