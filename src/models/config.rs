//! Application configuration structures.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP client settings shared by prechecks and provider calls
    #[serde(default)]
    pub http: HttpConfig,

    /// Reachability precheck settings
    #[serde(default)]
    pub precheck: PrecheckConfig,

    /// Dispatch behavior
    #[serde(default)]
    pub publisher: PublisherConfig,

    /// Single-URL indexing provider
    #[serde(default)]
    pub google: GoogleConfig,

    /// Multi-URL IndexNow provider
    #[serde(default)]
    pub indexnow: IndexNowConfig,

    /// Daily quota per provider, merged over the built-in table
    #[serde(default)]
    pub quotas: BTreeMap<String, usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.indexnow.max_urls_per_request == 0 {
            return Err(AppError::validation(
                "indexnow.max_urls_per_request must be > 0",
            ));
        }
        if let Some(code) = self
            .publisher
            .retry_statuses
            .iter()
            .find(|c| **c == 429 || !(400..600).contains(*c))
        {
            return Err(AppError::validation(format!(
                "publisher.retry_statuses: {code} cannot be retried"
            )));
        }
        url::Url::parse(&self.google.endpoint)
            .map_err(|e| AppError::validation(format!("google.endpoint: {e}")))?;
        Ok(())
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of debug, info, warn, error, fatal
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// How unreachable URLs are treated before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrecheckMode {
    /// Abort the whole batch on the first unreachable URL.
    #[default]
    Strict,
    /// Move unreachable URLs to the skip list.
    Skip,
    /// Do not fetch anything before dispatch.
    Ignore,
}

impl fmt::Display for PrecheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrecheckMode::Strict => "strict",
            PrecheckMode::Skip => "skip",
            PrecheckMode::Ignore => "ignore",
        })
    }
}

impl FromStr for PrecheckMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(PrecheckMode::Strict),
            "skip" | "skip-on-precheck-failure" => Ok(PrecheckMode::Skip),
            "ignore" | "ignore-precheck" => Ok(PrecheckMode::Ignore),
            other => Err(AppError::invalid_argument(format!(
                "unknown precheck mode '{other}'"
            ))),
        }
    }
}

/// Reachability precheck settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PrecheckConfig {
    #[serde(default)]
    pub mode: PrecheckMode,
}

/// Dispatch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Keep dispatching after a non-transient provider error
    #[serde(default)]
    pub continue_on_provider_error: bool,

    /// Provider statuses retried once before giving up
    #[serde(default = "defaults::retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            continue_on_provider_error: false,
            retry_statuses: defaults::retry_statuses(),
        }
    }
}

/// Single-URL indexing provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Publish endpoint
    #[serde(default = "defaults::google_endpoint")]
    pub endpoint: String,

    /// Service-account credentials file
    #[serde(default = "defaults::credentials_file")]
    pub credentials_file: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::google_endpoint(),
            credentials_file: defaults::credentials_file(),
        }
    }
}

/// IndexNow provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexNowConfig {
    /// Engine name (indexnow, bing, seznam, yandex) or base URL
    #[serde(default = "defaults::engine")]
    pub engine: String,

    /// Maximum URLs per post
    #[serde(default = "defaults::max_urls_per_request")]
    pub max_urls_per_request: usize,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub key_location: String,
}

impl Default for IndexNowConfig {
    fn default() -> Self {
        Self {
            engine: defaults::engine(),
            max_urls_per_request: defaults::max_urls_per_request(),
            host: String::new(),
            key: String::new(),
            key_location: String::new(),
        }
    }
}

mod defaults {
    pub fn log_level() -> String {
        "info".into()
    }

    pub fn user_agent() -> String {
        concat!("index-publisher/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn retry_statuses() -> Vec<u16> {
        vec![502, 503]
    }

    pub fn google_endpoint() -> String {
        "https://indexing.googleapis.com/v3/urlNotifications:publish".into()
    }
    pub fn credentials_file() -> String {
        "credentials.json".into()
    }

    pub fn engine() -> String {
        "indexnow".into()
    }
    pub fn max_urls_per_request() -> usize {
        10_000
    }
}
