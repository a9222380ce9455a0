//! Backup run results

use std::path::{Path, PathBuf};

/// A collection that was backed up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    /// Collection name
    pub name: String,
    /// Records fetched
    pub records: usize,
    /// Raw artifact
    pub raw_path: PathBuf,
    /// Tabular artifact; absent for an empty collection
    pub table_path: Option<PathBuf>,
}

/// A collection that could not be backed up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFailure {
    /// Collection name
    pub name: String,
    /// Machine-readable error kind
    pub kind: &'static str,
    /// Rendered error
    pub message: String,
}

/// Outcome of a backup run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Collections backed up, in processing order
    pub succeeded: Vec<CollectionSummary>,
    /// Collections that failed, in processing order
    pub failed: Vec<CollectionFailure>,
    /// Error log of the run
    pub log_path: PathBuf,
}

impl RunReport {
    /// Create an empty report
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Default::default()
        }
    }

    /// Did every collection succeed?
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total records written across all collections
    pub fn total_records(&self) -> usize {
        self.succeeded.iter().map(|s| s.records).sum()
    }

    /// Path of the run's error log
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
