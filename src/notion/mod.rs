//! Notion source module
//!
//! Implements [`PageSource`](crate::pagination::PageSource) on top of the
//! Notion "query a database" endpoint.

mod client;

pub use client::{NotionConfig, NotionSource, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
