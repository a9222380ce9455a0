//! Output module
//!
//! Persists backup artifacts and the operational error log.
//!
//! # Overview
//!
//! This module provides:
//! - `BackupWriter` - raw JSON and TSV artifacts per collection and run
//! - `read_raw` - reads a raw artifact back for replay
//! - `ErrorLog` - one line per error event

mod log;
mod writer;

pub use log::{format_entry, ErrorLog};
pub use writer::{
    read_raw, run_timestamp, write_table_file, BackupWriter, RAW_EXTENSION, TABLE_EXTENSION,
};

#[cfg(test)]
mod tests;
