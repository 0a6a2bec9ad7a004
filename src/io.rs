// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Reading and writing hierarchy logs as JSON
//!
//! A hierarchy log on disk is a JSON array of change log entries. The path
//! `-` stands for stdin when reading and stdout when writing.

use crate::types::{ChangeLogEntry, HierarchyLog};
use anyhow::{Context, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// Parse a hierarchy log from a JSON string
pub fn parse_log(content: &str) -> Result<HierarchyLog> {
    serde_json::from_str(content).context("Failed to parse hierarchy log")
}

/// Serialize a hierarchy log to a JSON string
pub fn render_log(log: &[ChangeLogEntry], pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(log)
    } else {
        serde_json::to_string(log)
    };
    rendered.context("Failed to serialize hierarchy log")
}

/// Load a hierarchy log from `path` (or stdin for `-`)
pub fn read_log(path: &Path) -> Result<HierarchyLog> {
    let content = if is_stdio(path) {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read hierarchy log from stdin")?;
        buffer
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };

    parse_log(&content).with_context(|| format!("Invalid hierarchy log in {}", path.display()))
}

/// Write a hierarchy log to `path` (or stdout for `-`)
pub fn write_log(path: &Path, log: &[ChangeLogEntry], pretty: bool) -> Result<()> {
    let content = render_log(log, pretty)?;

    if is_stdio(path) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}
