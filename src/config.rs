//! Backup configuration
//!
//! Settings are layered: a YAML file (every field optional), then the
//! process environment (`NOTION_TOKEN`, `<NAME>_DATABASE_ID`), then
//! command-line overrides applied by the runner.

use crate::error::{Error, Result};
use crate::flatten::{EmptyCell, FlattenOptions};
use crate::http::RateLimiterConfig;
use crate::notion::{NotionConfig, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
use crate::pagination::PagerConfig;
use crate::table::ProjectorOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable holding the integration token
pub const TOKEN_ENV_VAR: &str = "NOTION_TOKEN";

/// Suffix of environment variables naming a collection to back up
pub const DATABASE_ID_ENV_SUFFIX: &str = "_DATABASE_ID";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete backup configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Integration token
    pub token: String,

    /// Remote API settings
    pub api: ApiConfig,

    /// Pager settings
    pub pagination: PaginationConfig,

    /// Artifact settings
    pub output: OutputConfig,

    /// Collections to back up, in processing order
    pub collections: Vec<CollectionConfig>,
}

impl BackupConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Overlay the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_vars(std::env::vars());
    }

    /// Overlay a set of environment variables
    ///
    /// `NOTION_TOKEN` replaces the token. Each `<NAME>_DATABASE_ID` adds a
    /// collection named `<name>` unless one with that name already exists;
    /// these are appended sorted by name.
    pub fn apply_env_vars<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut discovered = Vec::new();

        for (key, value) in vars {
            let key = key.as_ref();
            let value = value.into();
            if value.trim().is_empty() {
                continue;
            }

            if key == TOKEN_ENV_VAR {
                self.token = value;
            } else if let Some(name) = key.strip_suffix(DATABASE_ID_ENV_SUFFIX) {
                if !name.is_empty() {
                    discovered.push(CollectionConfig::new(name.to_lowercase(), value));
                }
            }
        }

        discovered.sort_by(|a, b| a.name.cmp(&b.name));
        for collection in discovered {
            self.add_collection(collection);
        }
    }

    /// Add a collection, ignoring it if the name is already taken
    ///
    /// Returns whether the collection was added.
    pub fn add_collection(&mut self, collection: CollectionConfig) -> bool {
        if self.collections.iter().any(|c| c.name == collection.name) {
            return false;
        }
        self.collections.push(collection);
        true
    }

    /// Check the configuration is usable for a backup run
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::missing_field("token"));
        }

        url::Url::parse(&self.api.base_url)?;

        if self.collections.is_empty() {
            return Err(Error::config(format!(
                "No collections configured (set `collections` or {DATABASE_ID_ENV_SUFFIX} variables)"
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for collection in &self.collections {
            collection.validate()?;
            if !seen.insert(collection.name.as_str()) {
                return Err(Error::invalid_value(
                    "collections",
                    format!("duplicate collection name '{}'", collection.name),
                ));
            }
        }

        Ok(())
    }

    /// Connection settings for the Notion source
    pub fn notion_config(&self) -> NotionConfig {
        NotionConfig {
            token: self.token.clone(),
            base_url: self.api.base_url.clone(),
            notion_version: self.api.notion_version.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            rate_limit: self.api.rate_limit(),
            page_size: self.api.page_size,
        }
    }

    /// Pager settings
    pub fn pager_config(&self) -> PagerConfig {
        let config = PagerConfig::with_delay(Duration::from_millis(self.pagination.page_delay_ms));
        match self.pagination.page_timeout_secs {
            Some(secs) => config.page_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }

    /// Table projection settings
    pub fn projector_options(&self) -> ProjectorOptions {
        ProjectorOptions {
            flatten: FlattenOptions::new(self.output.empty_cell),
            include_original_properties: self.output.include_original_json,
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API endpoint
    pub base_url: String,

    /// `Notion-Version` header value
    pub notion_version: String,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Client-side rate ceiling; 0 disables the limiter
    pub requests_per_second: u32,

    /// Records per page
    pub page_size: Option<u32>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout_secs: 30,
            requests_per_second: 3,
            page_size: None,
        }
    }
}

impl ApiConfig {
    fn rate_limit(&self) -> Option<RateLimiterConfig> {
        match self.requests_per_second {
            0 => None,
            rps => Some(RateLimiterConfig::new(rps, rps)),
        }
    }
}

/// Pager settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Fixed delay after every page, in milliseconds
    pub page_delay_ms: u64,

    /// Upper bound on a single page request, in seconds
    pub page_timeout_secs: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 500,
            page_timeout_secs: None,
        }
    }
}

/// Artifact settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving raw and tabular artifacts
    pub data_dir: PathBuf,

    /// Directory receiving the error log
    pub log_dir: PathBuf,

    /// Rendering of empty cells
    pub empty_cell: EmptyCell,

    /// Append the verbatim properties as a trailing JSON column
    pub include_original_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            empty_cell: EmptyCell::default(),
            include_original_json: false,
        }
    }
}

/// A named collection to back up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Name used in artifact file names
    pub name: String,

    /// Remote database identifier
    pub database_id: String,
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database_id: database_id.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_value("collections.name", "cannot be empty"));
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(Error::invalid_value(
                "collections.name",
                format!("'{}' is not a valid file name component", self.name),
            ));
        }
        if self.database_id.trim().is_empty() {
            return Err(Error::invalid_value(
                "collections.database_id",
                format!("missing for collection '{}'", self.name),
            ));
        }
        Ok(())
    }
}

impl FromStr for CollectionConfig {
    type Err = Error;

    /// Parse `name=database_id`
    fn from_str(s: &str) -> Result<Self> {
        let (name, id) = s
            .split_once('=')
            .ok_or_else(|| Error::invalid_value("collection", format!("expected NAME=ID, got '{s}'")))?;
        let collection = Self::new(name.trim(), id.trim());
        collection.validate()?;
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid() -> BackupConfig {
        BackupConfig {
            token: "secret".to_string(),
            collections: vec![CollectionConfig::new("users", "db-1")],
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
token: "secret"
api:
  base_url: "http://localhost:8080"
  page_size: 50
pagination:
  page_delay_ms: 100
  page_timeout_secs: 10
output:
  data_dir: "backups"
  empty_cell: quoted
  include_original_json: true
collections:
  - name: users
    database_id: db-users
  - name: companies
    database_id: db-companies
"#;

        let config = BackupConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.token, "secret");
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.notion_version, DEFAULT_NOTION_VERSION);
        assert_eq!(config.api.page_size, Some(50));
        assert_eq!(config.output.data_dir, PathBuf::from("backups"));
        assert_eq!(config.output.log_dir, PathBuf::from("logs"));
        assert_eq!(config.output.empty_cell, EmptyCell::Quoted);
        assert_eq!(config.collections[1].name, "companies");
        assert!(config.validate().is_ok());

        let pager = config.pager_config();
        assert_eq!(pager.page_delay, Duration::from_millis(100));
        assert_eq!(pager.page_timeout, Some(Duration::from_secs(10)));

        let options = config.projector_options();
        assert_eq!(options.flatten.empty_cell, EmptyCell::Quoted);
        assert!(options.include_original_properties);
    }

    #[test]
    fn test_defaults() {
        let config = BackupConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, BackupConfig::default());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.pagination.page_delay_ms, 500);
        assert_eq!(config.output.empty_cell, EmptyCell::Blank);
        assert!(!config.output.include_original_json);

        let notion = config.notion_config();
        assert_eq!(notion.timeout, Duration::from_secs(30));
        assert_eq!(notion.rate_limit, Some(RateLimiterConfig::new(3, 3)));
    }

    #[test]
    fn test_env_overlay() {
        let mut config = BackupConfig {
            collections: vec![CollectionConfig::new("users", "from-file")],
            ..Default::default()
        };

        config.apply_env_vars([
            ("NOTION_TOKEN", "env-token"),
            ("USERS_DATABASE_ID", "from-env"),
            ("COMPANIES_DATABASE_ID", "db-companies"),
            ("ACCOUNTS_DATABASE_ID", "db-accounts"),
            ("EMPTY_DATABASE_ID", " "),
            ("_DATABASE_ID", "nameless"),
            ("HOME", "/root"),
        ]);

        assert_eq!(config.token, "env-token");
        assert_eq!(
            config.collections,
            vec![
                CollectionConfig::new("users", "from-file"),
                CollectionConfig::new("accounts", "db-accounts"),
                CollectionConfig::new("companies", "db-companies"),
            ]
        );
    }

    #[test]
    fn test_validate_missing_token() {
        let config = BackupConfig {
            token: String::new(),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { .. })
        ));
    }

    #[test]
    fn test_validate_no_collections() {
        let config = BackupConfig {
            collections: Vec::new(),
            ..valid()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let mut config = valid();
        config.collections.push(CollectionConfig::new("users", "db-2"));
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_validate_bad_base_url() {
        let mut config = valid();
        config.api.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_parse_collection_arg() {
        let collection: CollectionConfig = "users = db-1".parse().unwrap();
        assert_eq!(collection, CollectionConfig::new("users", "db-1"));

        assert!("users".parse::<CollectionConfig>().is_err());
        assert!("=db-1".parse::<CollectionConfig>().is_err());
        assert!("a/b=db-1".parse::<CollectionConfig>().is_err());
        assert!("users=".parse::<CollectionConfig>().is_err());
    }

    #[test]
    fn test_zero_rate_disables_limiter() {
        let mut config = valid();
        config.api.requests_per_second = 0;
        assert_eq!(config.notion_config().rate_limit, None);
    }

    #[test]
    fn test_missing_config_file() {
        let err = BackupConfig::from_yaml_file("/nonexistent/backup.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
