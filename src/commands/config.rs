// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use crate::config::{self, Config};
use anyhow::{Context, Result};

/// Print the effective configuration as TOML
pub fn run(config: &Config) -> Result<()> {
    match config::default_path() {
        Some(path) => tracing::info!("User config file: {}", path.display()),
        None => tracing::info!("No user config directory on this platform"),
    }

    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}
