//! CLI runner - executes commands

use crate::backup::{self, BackupJob, RunReport};
use crate::cli::commands::{Cli, Commands, OutputArgs};
use crate::config::{BackupConfig, CollectionConfig};
use crate::error::{Result, ResultExt};
use crate::notion::NotionSource;
use crate::output::{run_timestamp, BackupWriter, ErrorLog};
use crate::pagination::RateLimitedPager;
use crate::table::TableProjector;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    ///
    /// Returns whether every collection of the run succeeded.
    pub async fn run(&self) -> Result<bool> {
        let default = Commands::default();
        match self.cli.command.as_ref().unwrap_or(&default) {
            Commands::Backup {
                collections,
                data_dir,
                log_dir,
                output,
            } => {
                self.backup(collections, data_dir.as_deref(), log_dir.as_deref(), output)
                    .await
            }
            Commands::Convert {
                input,
                output,
                format,
            } => self.convert(input, output, format).map(|()| true),
            Commands::Collections => self.collections().map(|()| true),
        }
    }

    /// Load configuration: file, then environment, then global flags
    fn load_config(&self) -> Result<BackupConfig> {
        let mut config = match &self.cli.config {
            Some(path) => BackupConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => BackupConfig::default(),
        };

        config.apply_env();

        if let Some(token) = &self.cli.token {
            config.token.clone_from(token);
        }

        Ok(config)
    }

    /// Back up collections
    async fn backup(
        &self,
        collections: &[CollectionConfig],
        data_dir: Option<&Path>,
        log_dir: Option<&Path>,
        output: &OutputArgs,
    ) -> Result<bool> {
        let mut config = self.load_config()?;

        if !collections.is_empty() {
            config.collections = collections.to_vec();
        }
        if let Some(dir) = data_dir {
            config.output.data_dir = dir.to_path_buf();
        }
        if let Some(dir) = log_dir {
            config.output.log_dir = dir.to_path_buf();
        }
        apply_output_args(&mut config, output);

        config.validate()?;
        debug!(collections = config.collections.len(), "Configuration loaded");

        let ts = run_timestamp(Utc::now());
        let source = NotionSource::new(config.notion_config())?;
        let pager = RateLimitedPager::with_config(source, config.pager_config());
        let writer = BackupWriter::new(&config.output.data_dir, &ts);
        let log = ErrorLog::create(&config.output.log_dir, &ts)?;
        let projector = TableProjector::new(config.projector_options());

        let mut job = BackupJob::new(pager, projector, writer, log);

        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Received SIGINT, cancelling backup");
                    cancel.cancel();
                }
            })
        };

        let report = job.run(&config.collections, &cancel).await;
        interrupt.abort();
        let report = report?;

        Self::print_report(&report);
        Ok(report.is_success())
    }

    /// Re-project a raw artifact
    fn convert(&self, input: &Path, output: &Path, format: &OutputArgs) -> Result<()> {
        let mut config = self.load_config()?;
        apply_output_args(&mut config, format);

        let projector = TableProjector::new(config.projector_options());
        let rows = backup::convert(input, output, &projector)?;

        output_message(&json!({
            "type": "CONVERT",
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "rows": rows,
        }));
        Ok(())
    }

    /// List resolved collections
    fn collections(&self) -> Result<()> {
        let config = self.load_config()?;

        let collections: Vec<Value> = config
            .collections
            .iter()
            .map(|c| json!({ "name": c.name, "database_id": c.database_id }))
            .collect();

        output_message(&json!({
            "type": "COLLECTIONS",
            "collections": collections,
        }));
        Ok(())
    }

    fn print_report(report: &RunReport) {
        for summary in &report.succeeded {
            output_message(&json!({
                "type": "COLLECTION_STATUS",
                "collection": summary.name,
                "status": "SUCCEEDED",
                "records": summary.records,
                "raw_path": display(Some(&summary.raw_path)),
                "table_path": display(summary.table_path.as_ref()),
            }));
        }
        for failure in &report.failed {
            output_message(&json!({
                "type": "COLLECTION_STATUS",
                "collection": failure.name,
                "status": "FAILED",
                "kind": failure.kind,
                "message": failure.message,
            }));
        }
        output_message(&json!({
            "type": "RUN_SUMMARY",
            "succeeded": report.succeeded.len(),
            "failed": report.failed.len(),
            "records": report.total_records(),
            "log_path": report.log_path().display().to_string(),
        }));
    }
}

fn apply_output_args(config: &mut BackupConfig, args: &OutputArgs) {
    if let Some(empty_cell) = args.empty_cell {
        config.output.empty_cell = empty_cell;
    }
    if args.original_json {
        config.output.include_original_json = true;
    }
}

fn display(path: Option<&PathBuf>) -> Option<String> {
    path.map(|p| p.display().to_string())
}

/// Print one JSON message per line on stdout
fn output_message(msg: &Value) {
    println!("{}", serde_json::to_string(msg).unwrap_or_default());
}
