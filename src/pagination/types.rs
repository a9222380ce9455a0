//! Pagination types and traits
//!
//! Defines the page protocol shared by every remote source.

use crate::error::Result;
use crate::model::Record;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Default minimum delay between two consecutive page requests
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// One page of a collection query
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    /// Records of this page, in response order
    #[serde(default)]
    pub results: Vec<Record>,
    /// Opaque cursor for the next page
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// Whether more pages remain
    #[serde(default)]
    pub has_more: bool,
}

impl Page {
    /// Create a page that continues at `cursor`
    pub fn more(results: Vec<Record>, cursor: impl Into<String>) -> Self {
        Self {
            results,
            next_cursor: Some(cursor.into()),
            has_more: true,
        }
    }

    /// Create the final page
    pub fn last(results: Vec<Record>) -> Self {
        Self {
            results,
            next_cursor: None,
            has_more: false,
        }
    }
}

/// A remote source answering paginated collection queries
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of `collection_id`, starting at `cursor` (absent on the first request)
    async fn query_page(&self, collection_id: &str, cursor: Option<&str>) -> Result<Page>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for std::sync::Arc<S> {
    async fn query_page(&self, collection_id: &str, cursor: Option<&str>) -> Result<Page> {
        (**self).query_page(collection_id, cursor).await
    }
}

/// Configuration for the pager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerConfig {
    /// Fixed delay after every page response
    pub page_delay: Duration,
    /// Upper bound on a single page request
    pub page_timeout: Option<Duration>,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_delay: DEFAULT_PAGE_DELAY,
            page_timeout: None,
        }
    }
}

impl PagerConfig {
    /// Create a config with the given delay and no page timeout
    pub fn with_delay(page_delay: Duration) -> Self {
        Self {
            page_delay,
            page_timeout: None,
        }
    }

    /// Set the per-page timeout
    #[must_use]
    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = Some(timeout);
        self
    }
}

/// Tracks pagination state during one fetch
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages received so far
    pub pages: u32,
    /// Cursor for the next request
    pub cursor: Option<String>,
    /// Total records fetched so far
    pub total_fetched: usize,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }

    /// Account for a received page of `count` records
    pub fn add_page(&mut self, count: usize) {
        self.pages += 1;
        self.total_fetched += count;
    }
}
