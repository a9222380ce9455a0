//! Backup orchestration module
//!
//! Runs the fetch, persist and project pipeline over a list of collections.
//!
//! # Overview
//!
//! The backup module provides:
//! - `BackupJob` - processes collections strictly one after another
//! - `RunReport` - per-collection outcome of a run
//! - `convert` - re-projects an existing raw artifact
//!
//! A failing collection is written to the error log and skipped; the run
//! carries on with the next one.

mod types;

pub use types::{CollectionFailure, CollectionSummary, RunReport};

use crate::config::CollectionConfig;
use crate::error::{Error, Result};
use crate::output::{read_raw, write_table_file, BackupWriter, ErrorLog};
use crate::pagination::{PageSource, RateLimitedPager};
use crate::table::TableProjector;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Backs up collections from a [`PageSource`]
pub struct BackupJob<S> {
    pager: RateLimitedPager<S>,
    projector: TableProjector,
    writer: BackupWriter,
    log: ErrorLog,
}

impl<S: PageSource> BackupJob<S> {
    /// Create a new backup job
    pub fn new(
        pager: RateLimitedPager<S>,
        projector: TableProjector,
        writer: BackupWriter,
        log: ErrorLog,
    ) -> Self {
        Self {
            pager,
            projector,
            writer,
            log,
        }
    }

    /// Get the artifact writer
    pub fn writer(&self) -> &BackupWriter {
        &self.writer
    }

    /// Get the error log
    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    /// Back up every collection in order
    ///
    /// Only a failure to create the data directory aborts the run; any other
    /// failure is confined to its collection and reported in [`RunReport`].
    pub async fn run(
        &mut self,
        collections: &[CollectionConfig],
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        if let Err(e) = self.writer.prepare() {
            self.record(Some("Prepare data directory"), &e);
            return Err(e);
        }

        let mut report = RunReport::new(self.log.path());

        for collection in collections {
            info!(
                collection = %collection.name,
                database_id = %collection.database_id,
                "Backing up collection"
            );

            let result = if cancel.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                self.backup_collection(collection, cancel).await
            };

            match result {
                Ok(summary) => {
                    info!(
                        collection = %summary.name,
                        records = summary.records,
                        "Collection backed up"
                    );
                    report.succeeded.push(summary);
                }
                Err(e) => {
                    self.record(Some(&format!("Backup {}", collection.name)), &e);
                    report.failed.push(CollectionFailure {
                        name: collection.name.clone(),
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            records = report.total_records(),
            "Backup run complete"
        );
        Ok(report)
    }

    async fn backup_collection(
        &self,
        collection: &CollectionConfig,
        cancel: &CancellationToken,
    ) -> Result<CollectionSummary> {
        let records = self
            .pager
            .fetch_all_cancellable(&collection.database_id, cancel)
            .await?;

        let raw_path = self.writer.write_raw(&collection.name, &records)?;

        // No header can be derived from zero records
        let table_path = if records.is_empty() {
            info!(collection = %collection.name, "Empty collection, skipping table");
            None
        } else {
            let table = self.projector.project(&records)?;
            Some(self.writer.write_table(&collection.name, &table)?)
        };

        Ok(CollectionSummary {
            name: collection.name.clone(),
            records: records.len(),
            raw_path,
            table_path,
        })
    }

    fn record(&mut self, header: Option<&str>, err: &Error) {
        if let Err(log_err) = self.log.record(header, err) {
            warn!(error = %log_err, "Failed to write error log entry");
        }
    }
}

/// Re-project a raw artifact into a new TSV file
///
/// Returns the number of rows written.
pub fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    projector: &TableProjector,
) -> Result<usize> {
    let records = read_raw(input)?;
    let table = projector.project(&records)?;
    write_table_file(output, &table)?;
    Ok(table.rows.len())
}
