//! Remote notifier clients.
//!
//! The orchestrators talk to providers only through [`UrlNotifier`] (one URL per
//! call) and [`UrlSetNotifier`] (many URLs per call). The HTTP status carried by
//! [`NotifyError`] drives retry and quota classification; an error without a
//! status is a transport failure.

pub mod auth;
pub mod google;
pub mod indexnow;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::{NotificationKind, PublishResponse, SetResponse};

pub use auth::{ServiceAccount, StaticToken, TokenSource};
pub use google::GoogleIndexingClient;
pub use indexnow::{IndexNowClient, IndexNowEngine};

/// Failure of a single provider call.
#[derive(Debug, Clone)]
pub struct NotifyError<R> {
    /// HTTP status, when the provider answered at all
    pub status: Option<u16>,
    pub message: String,
    /// Parsed provider response accompanying the failure, if any
    pub response: Option<R>,
}

impl<R> NotifyError<R> {
    pub fn transport(message: impl fmt::Display) -> Self {
        Self {
            status: None,
            message: message.to_string(),
            response: None,
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            response: None,
        }
    }

    pub fn with_response(mut self, response: R) -> Self {
        self.response = Some(response);
        self
    }
}

impl<R> fmt::Display for NotifyError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Single-URL notification provider.
#[async_trait]
pub trait UrlNotifier: Send + Sync {
    /// Notify the provider about one URL.
    async fn notify(
        &self,
        url: &str,
        kind: NotificationKind,
    ) -> Result<PublishResponse, NotifyError<PublishResponse>>;

    /// Provider identity used for quota lookup and logs.
    fn name(&self) -> &str;
}

/// Multi-URL submission payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlSet<'a> {
    pub host: &'a str,
    pub key: &'a str,
    /// Sent even when empty
    pub key_location: &'a str,
    pub url_list: &'a [String],
}

/// Multi-URL notification provider.
#[async_trait]
pub trait UrlSetNotifier: Send + Sync {
    /// Post one batch of URLs.
    async fn notify_set(&self, set: &UrlSet<'_>) -> Result<SetResponse, NotifyError<SetResponse>>;

    /// Provider identity used for quota lookup and logs.
    fn name(&self) -> &str;
}
