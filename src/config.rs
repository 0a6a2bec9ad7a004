// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Sources, later ones winning: built-in defaults, the user config file
//! (`config.toml` in the platform config directory, or `--config`), then
//! `HISTPRUNE_*` environment variables.

use crate::hierarchy::RepeatPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "HISTPRUNE";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Behaviour when a sha to prune is already gone
    pub on_pruned: RepeatPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            pretty: true,
            on_pruned: RepeatPolicy::Error,
        }
    }
}

/// Location of the user config file
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "hyperpolymath", "histprune")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration, from `path` if given (it must then exist)
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = Config::default();

    let mut builder = ::config::Config::builder()
        .set_default("log_level", defaults.log_level)?
        .set_default("pretty", defaults.pretty)?
        .set_default("on_pruned", "error")?;

    match path {
        Some(path) => {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }
        None => {
            if let Some(path) = default_path() {
                builder = builder.add_source(
                    ::config::File::from(path)
                        .format(::config::FileFormat::Toml)
                        .required(false),
                );
            }
        }
    }

    builder
        .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .context("Failed to load configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}
