//! CLI module
//!
//! Command-line interface for running backups.
//!
//! # Commands
//!
//! - `backup` - Back up every configured collection (default)
//! - `convert` - Re-project a raw artifact into a TSV file
//! - `collections` - List the resolved collections

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputArgs};
pub use runner::Runner;
