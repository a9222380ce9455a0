//! HTTP client module
//!
//! Provides the HTTP transport with rate limiting.
//!
//! # Features
//!
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Default Headers**: Bearer authentication and API versioning
//! - **Error Classification**: 429, client/server status, timeouts

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
