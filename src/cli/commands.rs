//! CLI commands and argument parsing

use crate::config::CollectionConfig;
use crate::flatten::EmptyCell;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Back up Notion databases to JSON and TSV
#[derive(Parser, Debug)]
#[command(name = "notion-backup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Integration token (overrides NOTION_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run; `backup` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Back up collections
    Backup {
        /// Collection to back up, replacing the configured list (repeatable)
        #[arg(long = "collection", value_name = "NAME=ID")]
        collections: Vec<CollectionConfig>,

        /// Directory receiving the artifacts
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory receiving the error log
        #[arg(long)]
        log_dir: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Re-project a raw JSON artifact into a TSV file
    Convert {
        /// Raw artifact written by `backup`
        #[arg(short, long)]
        input: PathBuf,

        /// TSV file to create
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        format: OutputArgs,
    },

    /// List the collections a backup would process
    Collections,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Backup {
            collections: Vec::new(),
            data_dir: None,
            log_dir: None,
            output: OutputArgs::default(),
        }
    }
}

/// Table formatting overrides
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Rendering of empty cells
    #[arg(long, value_enum)]
    pub empty_cell: Option<EmptyCell>,

    /// Append the verbatim properties as a trailing JSON column
    #[arg(long)]
    pub original_json: bool,
}
