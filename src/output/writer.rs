//! Backup artifact writer
//!
//! Writes the two artifacts of a collection backup:
//! - `<ts>-<name>.json`: every raw record, pretty-printed
//! - `<ts>-<name>.tsv`: the projected table, tab separated
//!
//! Files are created, never overwritten. A file whose write fails part way
//! is removed again, so a failed artifact never looks like a complete one.

use crate::error::{Error, Result};
use crate::model::Record;
use crate::table::Table;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extension of the raw artifact
pub const RAW_EXTENSION: &str = "json";

/// Extension of the tabular artifact
pub const TABLE_EXTENSION: &str = "tsv";

/// Format a run timestamp for file names (ISO-8601, UTC, milliseconds)
pub fn run_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Writes backup artifacts for one run
#[derive(Debug, Clone)]
pub struct BackupWriter {
    data_dir: PathBuf,
    run_timestamp: String,
}

impl BackupWriter {
    /// Create a writer for the run identified by `run_timestamp`
    pub fn new(data_dir: impl Into<PathBuf>, run_timestamp: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            run_timestamp: run_timestamp.into(),
        }
    }

    /// Directory receiving the artifacts
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Timestamp shared by every artifact of this run
    pub fn run_timestamp(&self) -> &str {
        &self.run_timestamp
    }

    /// Create the data directory if needed
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| Error::persistence(&self.data_dir, e))
    }

    /// Path of a collection's artifact with the given extension
    pub fn artifact_path(&self, collection: &str, extension: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}-{collection}.{extension}", self.run_timestamp))
    }

    /// Write the raw records of a collection
    pub fn write_raw(&self, collection: &str, records: &[Record]) -> Result<PathBuf> {
        let path = self.artifact_path(collection, RAW_EXTENSION);
        let out = create_new(&path)?;

        write_json(out, records)
            .map_err(|e| Error::persistence(&path, e))
            .inspect_err(|_| discard(&path))?;

        debug!(path = %path.display(), records = records.len(), "Wrote raw artifact");
        Ok(path)
    }

    /// Write the projected table of a collection
    pub fn write_table(&self, collection: &str, table: &Table) -> Result<PathBuf> {
        let path = self.artifact_path(collection, TABLE_EXTENSION);
        write_table_file(&path, table)?;
        Ok(path)
    }
}

/// Write a table as TSV to a new file at `path`
pub fn write_table_file(path: impl AsRef<Path>, table: &Table) -> Result<()> {
    let path = path.as_ref();
    let out = create_new(path)?;

    write_tsv(out, table)
        .map_err(|e| Error::persistence(path, e))
        .inspect_err(|_| discard(path))?;

    debug!(path = %path.display(), rows = table.rows.len(), "Wrote table artifact");
    Ok(())
}

fn write_json(mut out: BufWriter<File>, records: &[Record]) -> std::io::Result<()> {
    let formatter = PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    records.serialize(&mut serializer)?;
    out.flush()
}

fn write_tsv(out: BufWriter<File>, table: &Table) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .flexible(false)
        .from_writer(out);

    writer.write_record(table.header.cells())?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a raw artifact back into records
pub fn read_raw(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound {
            path: path.display().to_string(),
        },
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Remove a partially written artifact
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove partial artifact");
    }
}

fn create_new(path: &Path) -> Result<BufWriter<File>> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(BufWriter::new)
        .map_err(|e| Error::persistence(path, e))
}
