//! Operational error log
//!
//! One line per error event: an optional header, the error message and a
//! compact JSON dump of the error's fields.

use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::error;

/// Append-only error log of a run
#[derive(Debug)]
pub struct ErrorLog {
    path: PathBuf,
    out: BufWriter<File>,
    entries: usize,
}

impl ErrorLog {
    /// Create `<log_dir>/<run_timestamp>.log`, creating the directory if needed
    pub fn create(log_dir: impl AsRef<Path>, run_timestamp: &str) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir).map_err(|e| Error::persistence(log_dir, e))?;

        let path = log_dir.join(format!("{run_timestamp}.log"));
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| Error::persistence(&path, e))?;

        Ok(Self {
            path,
            out: BufWriter::new(file),
            entries: 0,
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of events written so far
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Record an error event
    pub fn record(&mut self, header: Option<&str>, err: &Error) -> Result<()> {
        match header {
            Some(header) => error!(kind = err.kind(), "{header}: {err}"),
            None => error!(kind = err.kind(), "{err}"),
        }

        let line = format_entry(header, err);
        self.out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| Error::persistence(&self.path, e))?;

        self.entries += 1;
        Ok(())
    }
}

/// Format one log line, newline included
pub fn format_entry(header: Option<&str>, err: &Error) -> String {
    let prefix = match header {
        Some(h) if !h.is_empty() => format!("{h} "),
        _ => String::new(),
    };
    let message = err.to_string().replace(['\n', '\r'], " ");
    format!("{prefix}{message} {}\n", err.log_fields())
}
