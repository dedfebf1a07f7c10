//! URL notification requests and skip records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The URL life-cycle event a provider is being notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NotificationKind {
    /// The document was created or updated.
    #[serde(rename = "URL_UPDATED")]
    #[default]
    Updated,
    /// The document was removed.
    #[serde(rename = "URL_DELETED")]
    Deleted,
    #[serde(rename = "URL_NOTIFICATION_TYPE_UNSPECIFIED")]
    Unspecified,
}

impl NotificationKind {
    /// Wire name used by the indexing API.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Updated => "URL_UPDATED",
            NotificationKind::Deleted => "URL_DELETED",
            NotificationKind::Unspecified => "URL_NOTIFICATION_TYPE_UNSPECIFIED",
        }
    }

    /// Only updated URLs are expected to be reachable.
    pub fn needs_precheck(&self) -> bool {
        matches!(self, NotificationKind::Updated)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "updated" | "update" | "url_updated" => Ok(NotificationKind::Updated),
            "deleted" | "delete" | "url_deleted" => Ok(NotificationKind::Deleted),
            "unspecified" | "url_notification_type_unspecified" => {
                Ok(NotificationKind::Unspecified)
            }
            other => Err(AppError::invalid_argument(format!(
                "unknown notification kind '{other}'"
            ))),
        }
    }
}

/// A single URL to notify about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub url: String,
    pub kind: NotificationKind,
}

impl NotificationRequest {
    pub fn new(url: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    pub fn updated(url: impl Into<String>) -> Self {
        Self::new(url, NotificationKind::Updated)
    }

    pub fn deleted(url: impl Into<String>) -> Self {
        Self::new(url, NotificationKind::Deleted)
    }
}

/// Why a request was left out of dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The precheck GET failed before a status was known.
    Unreachable { message: String },
    /// The precheck GET returned a status above 300.
    BadStatus { status: String, url: String },
    /// The run's quota was exhausted.
    QuotaExceeded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreachable { message } => f.write_str(message),
            SkipReason::BadStatus { status, url } => write!(f, "{status} : {url}"),
            SkipReason::QuotaExceeded => f.write_str("quota exceeded"),
        }
    }
}

/// A request that was deliberately not dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRequest {
    pub url: String,
    pub kind: NotificationKind,
    pub reason: SkipReason,
}

impl SkippedRequest {
    pub fn new(request: &NotificationRequest, reason: SkipReason) -> Self {
        Self {
            url: request.url.clone(),
            kind: request.kind,
            reason,
        }
    }

    pub fn quota_exceeded(request: &NotificationRequest) -> Self {
        Self::new(request, SkipReason::QuotaExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(NotificationKind::Updated.to_string(), "URL_UPDATED");
        assert_eq!(
            serde_json::to_string(&NotificationKind::Deleted).unwrap(),
            "\"URL_DELETED\""
        );
        assert_eq!(
            "delete".parse::<NotificationKind>().unwrap(),
            NotificationKind::Deleted
        );
        assert!("moved".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_only_updated_is_prechecked() {
        assert!(NotificationKind::Updated.needs_precheck());
        assert!(!NotificationKind::Deleted.needs_precheck());
        assert!(!NotificationKind::Unspecified.needs_precheck());
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::BadStatus {
            status: "404 Not Found".into(),
            url: "https://a.example/x".into(),
        };
        assert_eq!(reason.to_string(), "404 Not Found : https://a.example/x");
        assert_eq!(SkipReason::QuotaExceeded.to_string(), "quota exceeded");
    }
}
