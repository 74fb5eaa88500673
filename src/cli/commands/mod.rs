//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod merge;
mod tools;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, Settings};

use merge::MergeArgs;

#[derive(Parser)]
#[command(name = "pdf-keyword-merge")]
#[command(about = "Find PDFs by keyword and merge the matches under a size limit")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "PDF_KEYWORD_MERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDFs whose name or text matches the given keywords
    Merge(MergeArgs),

    /// Show which external tools and backends are available
    Tools,
}

/// Run the CLI.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings::from_config(&config);

    match cli.command {
        Commands::Merge(args) => merge::cmd_merge(settings, args),
        Commands::Tools => tools::cmd_tools(&settings),
    }
}
