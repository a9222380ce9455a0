//! # notion-backup
//!
//! Backs up Notion databases to local files: every record verbatim as JSON,
//! and a flattened, tab-separated table for spreadsheets.
//!
//! ## Features
//!
//! - **Paced Pagination**: Fixed inter-page delay plus a token-bucket limiter
//! - **All-or-Nothing Fetch**: A failed page discards the whole collection
//! - **Typed Flattening**: Each property kind renders to a single cell
//! - **Name-Aligned Tables**: Header from the first record, schema checked
//! - **Lossless Replay**: Raw artifacts can be re-projected offline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use notion_backup::notion::{NotionConfig, NotionSource};
//! use notion_backup::pagination::RateLimitedPager;
//! use notion_backup::table::TableProjector;
//!
//! #[tokio::main]
//! async fn main() -> notion_backup::Result<()> {
//!     let source = NotionSource::new(NotionConfig::new("secret_..."))?;
//!     let pager = RateLimitedPager::new(source);
//!
//!     let records = pager.fetch_all("database-id").await?;
//!     let table = TableProjector::default().project(&records)?;
//!     println!("{}", table.header.columns().join("\t"));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          BackupJob                           │
//! │      fetch → write raw → project → write table, per name     │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────┬─────────────────┼───────────────┬───────────────┐
//! │   Notion   │   Pagination    │    Flatten    │    Output     │
//! ├────────────┼─────────────────┼───────────────┼───────────────┤
//! │ POST query │ Cursor loop     │ Text/People   │ Raw JSON      │
//! │ Rate limit │ 500ms pacing    │ Relation      │ TSV           │
//! │ API errors │ All-or-nothing  │ Select/Rollup │ Error log     │
//! └────────────┴─────────────────┴───────────────┴───────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document the remaining constructors before 1.0

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Configuration file, environment and defaults
pub mod config;

/// HTTP client with rate limiting
pub mod http;

/// Records and property values
pub mod model;

/// Paced cursor pagination
pub mod pagination;

/// Notion database query source
pub mod notion;

/// Property flattening
pub mod flatten;

/// Table projection
pub mod table;

/// Artifact writers and error log
pub mod output;

/// Backup orchestration
pub mod backup;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

pub use backup::{BackupJob, RunReport};
pub use config::BackupConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
