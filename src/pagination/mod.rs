//! Pagination module
//!
//! # Overview
//!
//! The remote source delivers a collection in pages linked by an opaque
//! continuation cursor. This module provides:
//! - `PageSource` - the seam every remote source implements
//! - `RateLimitedPager` - drives a source to completion with a fixed
//!   inter-page delay and all-or-nothing failure semantics

mod pager;
mod types;

pub use pager::RateLimitedPager;
pub use types::{Page, PageSource, PagerConfig, PaginationState, DEFAULT_PAGE_DELAY};
