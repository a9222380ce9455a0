//! Error types for notion-backup
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! The backup pipeline distinguishes four top-level failure families that a
//! caller reacts to differently: [`Error::Fetch`] (pagination aborted, no
//! records surfaced), [`Error::EmptyInput`] (nothing to project),
//! [`Error::SchemaMismatch`] (records disagree on their property names) and
//! [`Error::Persistence`] (writing an artifact failed).

use serde_json::{json, Value};
use thiserror::Error;

/// The main error type for notion-backup
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Fetch of collection '{collection}' failed after {fetched} records: {source}")]
    Fetch {
        collection: String,
        fetched: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Cannot project an empty record list")]
    EmptyInput,

    #[error(
        "Record {index} ('{record_id}') does not match the header: missing {missing:?}, unexpected {unexpected:?}"
    )]
    SchemaMismatch {
        index: usize,
        record_id: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Failed to write '{path}': {message}")]
    Persistence { path: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Wrap a page failure into a whole-collection fetch failure
    pub fn fetch(collection: impl Into<String>, fetched: usize, source: Error) -> Self {
        Self::Fetch {
            collection: collection.into(),
            fetched,
            source: Box::new(source),
        }
    }

    /// Create a persistence error
    pub fn persistence(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::Persistence {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the error came out of the pagination loop
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Whether the error came out of writing an artifact
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    /// Whether the error came out of projecting records into a table
    pub fn is_projection(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::SchemaMismatch { .. })
    }

    /// Short machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::MissingConfigField { .. } => "missing_config_field",
            Self::InvalidConfigValue { .. } => "invalid_config_value",
            Self::YamlParse(_) => "yaml_parse",
            Self::JsonParse(_) => "json_parse",
            Self::Http(_) => "http",
            Self::HttpStatus { .. } => "http_status",
            Self::RateLimited { .. } => "rate_limited",
            Self::Timeout { .. } => "timeout",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Api { .. } => "api",
            Self::Decode { .. } => "decode",
            Self::Cancelled => "cancelled",
            Self::Fetch { .. } => "fetch",
            Self::EmptyInput => "empty_input",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::Persistence { .. } => "persistence",
            Self::Io(_) => "io",
            Self::FileNotFound { .. } => "file_not_found",
            Self::Other(_) => "other",
        }
    }

    /// Structured dump of the error's fields for the operational log
    pub fn log_fields(&self) -> Value {
        let mut fields = match self {
            Self::Config { message } | Self::Decode { message } => json!({ "message": message }),
            Self::MissingConfigField { field } => json!({ "field": field }),
            Self::InvalidConfigValue { field, message } => {
                json!({ "field": field, "message": message })
            }
            Self::HttpStatus { status, body } => json!({ "status": status, "body": body }),
            Self::RateLimited {
                retry_after_seconds,
            } => json!({ "retry_after_seconds": retry_after_seconds }),
            Self::Timeout { timeout_ms } => json!({ "timeout_ms": timeout_ms }),
            Self::Api {
                status,
                code,
                message,
            } => json!({ "status": status, "code": code, "message": message }),
            Self::Fetch {
                collection,
                fetched,
                source,
            } => json!({
                "collection": collection,
                "fetched": fetched,
                "source": source.log_fields(),
            }),
            Self::SchemaMismatch {
                index,
                record_id,
                missing,
                unexpected,
            } => json!({
                "index": index,
                "record_id": record_id,
                "missing": missing,
                "unexpected": unexpected,
            }),
            Self::Persistence { path, message } => json!({ "path": path, "message": message }),
            Self::FileNotFound { path } => json!({ "path": path }),
            Self::Http(e) => json!({
                "url": e.url().map(ToString::to_string),
                "status": e.status().map(|s| s.as_u16()),
                "message": e.to_string(),
            }),
            other => json!({ "message": other.to_string() }),
        };

        if let Value::Object(map) = &mut fields {
            map.insert("kind".to_string(), Value::from(self.kind()));
        }
        fields
    }
}

/// Result type alias for notion-backup
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
