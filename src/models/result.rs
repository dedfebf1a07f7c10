//! Run accounting returned by the orchestrators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::NotifyError;
use crate::error::AppError;
use crate::models::{NotificationKind, NotificationRequest, SkippedRequest};

/// Notification metadata echoed back by the single-URL provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNotification {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: Option<NotificationKind>,
    #[serde(default)]
    pub notify_time: Option<DateTime<Utc>>,
}

/// Response to one single-URL publish call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub url: String,
    pub kind: NotificationKind,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_update: Option<UrlNotification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_remove: Option<UrlNotification>,
}

/// Response to one multi-URL submission post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResponse {
    pub status: u16,
    pub url_count: usize,
}

/// A dispatch that reached the provider and failed.
///
/// Multi-URL posts record every URL of the failed batch.
#[derive(Debug, Clone, Serialize)]
pub struct FailedDispatch<R> {
    pub urls: Vec<String>,
    pub kind: NotificationKind,
    pub status: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<R>,
}

/// Aggregate accounting for one orchestrator run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult<R> {
    /// Number of input requests
    pub total: usize,
    /// Number of requests actually sent to the provider
    pub dispatched: usize,
    /// Successful provider responses, in dispatch order
    pub responses: Vec<R>,
    /// Requests left out by precheck or quota
    pub skips: Vec<SkippedRequest>,
    /// Dispatches that failed
    pub failures: Vec<FailedDispatch<R>>,
}

impl<R> FailedDispatch<R> {
    pub fn for_request(request: &NotificationRequest, error: NotifyError<R>) -> Self {
        Self {
            urls: vec![request.url.clone()],
            kind: request.kind,
            status: error.status,
            message: error.message,
            response: error.response,
        }
    }
}

impl<R> RunResult<R> {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            dispatched: 0,
            responses: Vec::new(),
            skips: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Every input is either dispatched or skipped.
    pub fn is_fully_accounted(&self) -> bool {
        self.total == self.dispatched + self.skips.len()
    }
}

/// A run that stopped early, with whatever completed before the stop.
#[derive(Debug)]
pub struct RunAborted<R> {
    pub result: RunResult<R>,
    pub error: AppError,
}

impl<R> RunAborted<R> {
    pub fn new(result: RunResult<R>, error: AppError) -> Self {
        Self { result, error }
    }
}

impl<R> fmt::Display for RunAborted<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl<R: fmt::Debug> std::error::Error for RunAborted<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Outcome of a single-URL publish run.
pub type PublishOutcome = Result<RunResult<PublishResponse>, RunAborted<PublishResponse>>;

/// Outcome of a multi-URL submission run.
pub type SubmitOutcome = Result<RunResult<SetResponse>, RunAborted<SetResponse>>;
