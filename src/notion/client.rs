//! Notion database query source

use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, RequestConfig};
use crate::pagination::{Page, PageSource};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// API version sent with every request
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Connection settings for [`NotionSource`]
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Integration token
    pub token: String,
    /// API endpoint
    pub base_url: String,
    /// Value of the `Notion-Version` header
    pub notion_version: String,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Client-side request rate ceiling
    pub rate_limit: Option<RateLimiterConfig>,
    /// Records per page; the API default applies when absent
    pub page_size: Option<u32>,
}

impl NotionConfig {
    /// Create a config with defaults for everything but the token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit: Some(RateLimiterConfig::default()),
            page_size: None,
        }
    }
}

/// Queries Notion databases page by page
#[derive(Debug)]
pub struct NotionSource {
    client: HttpClient,
    page_size: Option<u32>,
}

impl NotionSource {
    /// Create a source from connection settings
    pub fn new(config: NotionConfig) -> Result<Self> {
        let mut builder = HttpClientConfig::builder()
            .base_url(config.base_url)
            .timeout(config.timeout)
            .bearer_token(&config.token)
            .header("Notion-Version", config.notion_version);

        builder = match config.rate_limit {
            Some(limit) => builder.rate_limit(limit),
            None => builder.no_rate_limit(),
        };

        Ok(Self {
            client: HttpClient::with_config(builder.build())?,
            page_size: config.page_size,
        })
    }

    fn query_body(&self, cursor: Option<&str>) -> Value {
        let mut body = Map::new();
        if let Some(cursor) = cursor {
            body.insert("start_cursor".to_string(), json!(cursor));
        }
        if let Some(size) = self.page_size {
            body.insert("page_size".to_string(), json!(size));
        }
        Value::Object(body)
    }
}

#[async_trait]
impl PageSource for NotionSource {
    async fn query_page(&self, collection_id: &str, cursor: Option<&str>) -> Result<Page> {
        let path = format!("/v1/databases/{collection_id}/query");
        let request = RequestConfig::new().json(self.query_body(cursor));

        debug!(collection = collection_id, cursor = ?cursor, "Querying database");

        let body: Value = self
            .client
            .post_json(&path, request)
            .await
            .map_err(api_error)?;

        if let Some(err) = ApiErrorBody::parse(&body) {
            return Err(err.into_error(200));
        }

        serde_json::from_value(body).map_err(|e| Error::decode(format!("Invalid query page: {e}")))
    }
}

/// Error object returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl ApiErrorBody {
    fn parse(body: &Value) -> Option<Self> {
        if body.get("object").and_then(Value::as_str) != Some("error") {
            return None;
        }
        serde_json::from_value(body.clone()).ok()
    }

    fn into_error(self, fallback_status: u16) -> Error {
        Error::Api {
            status: self.status.unwrap_or(fallback_status),
            code: self.code,
            message: self.message,
        }
    }
}

/// Promote an HTTP status error carrying an API error object
fn api_error(err: Error) -> Error {
    match err {
        Error::HttpStatus { status, body } => serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(ApiErrorBody::parse)
            .map_or(Error::HttpStatus { status, body }, |b| b.into_error(status)),
        other => other,
    }
}
