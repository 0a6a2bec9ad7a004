// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Histprune CLI - prune hierarchical git change logs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use histprune::commands;
use histprune::config::{self, Config};
use histprune::hierarchy::RepeatPolicy;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "histprune")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "HISTPRUNE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(
        long,
        env = "NO_COLOR",
        global = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_color: bool,

    /// Write compact JSON instead of pretty-printed JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep only first-parent entries touching the given files
    Files {
        /// Hierarchy log JSON file (`-` for stdin)
        log: PathBuf,

        /// Exact file path to keep (repeatable)
        #[arg(short, long = "file")]
        files: Vec<String>,

        /// Glob pattern of files to keep (repeatable)
        #[arg(short, long = "glob")]
        globs: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Remove entries by sha, collapsing parents left without history
    Prune {
        /// Hierarchy log JSON file (`-` for stdin)
        log: PathBuf,

        /// Sha to remove (repeatable)
        #[arg(short, long = "sha", required = true)]
        shas: Vec<String>,

        /// Skip shas that an earlier removal already took out
        #[arg(long)]
        skip_pruned: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// List every entry with its prune type and upper entry
    Index {
        /// Hierarchy log JSON file (`-` for stdin)
        log: PathBuf,

        /// Output the index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    init_logging(&cli, &config);

    let pretty = config.pretty && !cli.compact;

    match cli.command {
        Commands::Files { log, files, globs, output } => {
            commands::files::run(&log, &files, &globs, &output, pretty)
        }
        Commands::Prune { log, shas, skip_pruned, output } => {
            let policy = if skip_pruned { RepeatPolicy::Skip } else { config.on_pruned };
            commands::prune::run(&log, &shas, policy, &output, pretty)
        }
        Commands::Index { log, json } => {
            commands::index::run(&log, json, !cli.no_color)
        }
        Commands::Config => {
            commands::config::run(&config)
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}

/// Logs go to stderr so JSON on stdout stays clean
fn init_logging(cli: &Cli, config: &Config) {
    let filter = match cli.verbose {
        0 if cli.quiet => EnvFilter::new("error"),
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();
}
