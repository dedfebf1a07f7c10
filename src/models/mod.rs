// src/models/mod.rs

//! Domain models for the publisher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod notification;
mod result;

// Re-export all public types
pub use config::{
    Config, GoogleConfig, HttpConfig, IndexNowConfig, LoggingConfig, PrecheckConfig,
    PrecheckMode, PublisherConfig,
};
pub use notification::{NotificationKind, NotificationRequest, SkipReason, SkippedRequest};
pub use result::{
    FailedDispatch, PublishOutcome, PublishResponse, RunAborted, RunResult, SetResponse,
    SubmitOutcome, UrlNotification,
};
