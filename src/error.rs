// src/error.rs

//! Unified error handling for the publisher.

use std::fmt;

use thiserror::Error;

/// Result type alias for publisher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A URL failed its reachability precheck in strict mode
    #[error("pre-check : {reason}")]
    PrecheckFailed { url: String, reason: String },

    /// No remaining quota, or the provider answered 429
    #[error("quota exceeded")]
    QuotaExceeded,

    /// 502/503 from the provider that did not clear on retry
    #[error("transient provider error for {url}: {status} {message}")]
    TransientProvider {
        url: String,
        status: u16,
        message: String,
    },

    /// Any other non-success status from the provider
    #[error("provider error for {url}: {status} {message}")]
    Provider {
        url: String,
        status: u16,
        message: String,
    },

    /// Request failed before a status was known
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Caller supplied an unusable argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Run was cancelled between requests
    #[error("run cancelled")]
    Cancelled,

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Token signing failed
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Credential material could not be used
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a credentials error.
    pub fn credentials(message: impl fmt::Display) -> Self {
        Self::Credentials(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a transport error for a URL.
    pub fn transport(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// True for errors raised by quota exhaustion or a 429 response.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded)
    }
}
