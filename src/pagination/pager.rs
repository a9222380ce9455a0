//! Rate-limited pager
//!
//! Drives a [`PageSource`] from the first page to the last, pacing requests
//! with a fixed delay. A fetch is all-or-nothing: when any page fails, the
//! records accumulated so far are dropped and the caller gets
//! [`Error::Fetch`].

use super::types::{Page, PageSource, PagerConfig, PaginationState};
use crate::error::{Error, Result};
use crate::model::Record;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fetches complete collections from a [`PageSource`]
#[derive(Debug)]
pub struct RateLimitedPager<S> {
    source: S,
    config: PagerConfig,
}

impl<S: PageSource> RateLimitedPager<S> {
    /// Create a pager with the default delay
    pub fn new(source: S) -> Self {
        Self::with_config(source, PagerConfig::default())
    }

    /// Create a pager with a custom configuration
    pub fn with_config(source: S, config: PagerConfig) -> Self {
        Self { source, config }
    }

    /// Get the pager configuration
    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    /// Get the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every record of a collection, in page-then-within-page order
    pub async fn fetch_all(&self, collection_id: &str) -> Result<Vec<Record>> {
        self.fetch_all_cancellable(collection_id, &CancellationToken::new())
            .await
    }

    /// Fetch every record of a collection, aborting when `cancel` fires
    ///
    /// Cancellation is treated like any other page failure.
    pub async fn fetch_all_cancellable(
        &self,
        collection_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut state = PaginationState::new();

        while !state.done {
            let page = match self
                .next_page(collection_id, state.cursor.as_deref(), cancel)
                .await
            {
                Ok(page) => page,
                Err(source) => {
                    warn!(
                        collection = collection_id,
                        fetched = records.len(),
                        error = %source,
                        "Page request failed, discarding partial collection"
                    );
                    return Err(Error::fetch(collection_id, records.len(), source));
                }
            };

            let Page {
                results,
                next_cursor,
                has_more,
            } = page;

            state.add_page(results.len());
            records.extend(results);

            match (has_more, next_cursor) {
                (true, Some(cursor)) => state.set_cursor(cursor),
                (true, None) => {
                    let source = Error::decode("response has more pages but no next cursor");
                    return Err(Error::fetch(collection_id, records.len(), source));
                }
                (false, _) => state.mark_done(),
            }

            info!(
                collection = collection_id,
                count = state.total_fetched,
                has_more,
                "Fetched page {}",
                state.pages
            );

            if let Err(source) = self.pause(cancel).await {
                return Err(Error::fetch(collection_id, records.len(), source));
            }
        }

        debug!(
            collection = collection_id,
            pages = state.pages,
            records = records.len(),
            "Collection fetch complete"
        );
        Ok(records)
    }

    /// Issue one page request, bounded by the page timeout and cancellation
    async fn next_page(
        &self,
        collection_id: &str,
        cursor: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Page> {
        let request = self.source.query_page(collection_id, cursor);

        let bounded = async {
            match self.config.page_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, request).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout {
                        timeout_ms: timeout.as_millis() as u64,
                    }),
                },
                None => request.await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = bounded => result,
        }
    }

    /// Fixed inter-page delay, also applied after the final page
    async fn pause(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            () = tokio::time::sleep(self.config.page_delay) => Ok(()),
        }
    }
}
