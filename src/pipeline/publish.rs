// src/pipeline/publish.rs

//! Single-URL publishing entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::clients::auth::token_source;
use crate::clients::{GoogleIndexingClient, UrlNotifier};
use crate::error::{AppError, Result};
use crate::models::{Config, NotificationKind, NotificationRequest};
use crate::services::{BatchPolicy, HttpPrechecker, Publisher, QuotaTable, RetryPolicy};
use crate::utils::{http, parse_http_url};

use super::report::{OutputFormat, print_result};
use super::{cancel_on_ctrl_c, ensure_http_urls};

/// Arguments for one publish run.
#[derive(Debug, Clone)]
pub struct PublishArgs {
    pub kind: NotificationKind,
    pub urls: Vec<String>,
    /// Service-account key file; falls back to `google.credentials_file`
    pub credentials: Option<PathBuf>,
    pub token: Option<String>,
    pub quota: Option<usize>,
    pub format: OutputFormat,
}

/// The key file named on the command line, else the configured one.
pub fn credentials_path(config: &Config, args: &PublishArgs) -> PathBuf {
    args.credentials
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.google.credentials_file))
}

/// Build a publisher for the configured indexing endpoint.
pub fn build_publisher(
    config: &Config,
    credentials: &Path,
    token: Option<&str>,
) -> Result<Publisher> {
    let api_client = http::create_async_client(&config.http)?;
    parse_http_url(&config.google.endpoint).ok_or_else(|| {
        AppError::config(format!("invalid google.endpoint '{}'", config.google.endpoint))
    })?;

    let tokens = token_source(token, Some(credentials), api_client.clone())?;
    let notifier: Arc<dyn UrlNotifier> = Arc::new(GoogleIndexingClient::new(
        api_client,
        &config.google.endpoint,
        tokens,
    ));
    let prechecker = Arc::new(HttpPrechecker::new(http::create_precheck_client(
        &config.http,
    )?));

    let quota = QuotaTable::with_overrides(&config.quotas).tracker_for(notifier.name());
    let mut publisher = Publisher::new(notifier, prechecker)
        .with_precheck_mode(config.precheck.mode)
        .with_retry_policy(RetryPolicy::new(config.publisher.retry_statuses.iter().copied()))
        .with_batch_policy(BatchPolicy {
            continue_on_provider_error: config.publisher.continue_on_provider_error,
        });
    if let Some(quota) = quota {
        log::debug!("quota for {}: {}", publisher.provider(), quota.remaining());
        publisher = publisher.with_quota(Arc::new(quota));
    }
    Ok(publisher)
}

/// Publish `args.urls` and print the run summary.
///
/// The summary is printed even when the run aborts; the abort error is then returned.
pub async fn run_publish(config: &Config, args: &PublishArgs) -> Result<()> {
    if args.urls.is_empty() {
        log::warn!("No URLs given, nothing to publish");
        return Ok(());
    }
    ensure_http_urls(&args.urls)?;

    let credentials = credentials_path(config, args);
    let publisher = build_publisher(config, &credentials, args.token.as_deref())?;
    let requests: Vec<NotificationRequest> = args
        .urls
        .iter()
        .map(|u| NotificationRequest::new(u.as_str(), args.kind))
        .collect();

    log::info!(
        "Publishing {} url(s) as {} (precheck: {})",
        requests.len(),
        args.kind,
        config.precheck.mode
    );

    let cancel = cancel_on_ctrl_c();
    match publisher
        .publish_with_cancel(&requests, args.quota, &cancel)
        .await
    {
        Ok(result) => print_result(&result, args.format),
        Err(aborted) => {
            print_result(&aborted.result, args.format)?;
            Err(aborted.error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(credentials: Option<&str>) -> PublishArgs {
        PublishArgs {
            kind: NotificationKind::Updated,
            urls: vec!["https://a.example/1".into()],
            credentials: credentials.map(PathBuf::from),
            token: None,
            quota: None,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_credentials_fall_back_to_config() {
        let mut config = Config::default();
        config.google.credentials_file = "/etc/indexing/key.json".into();

        assert_eq!(
            credentials_path(&config, &args(None)),
            PathBuf::from("/etc/indexing/key.json")
        );
        assert_eq!(
            credentials_path(&config, &args(Some("cli.json"))),
            PathBuf::from("cli.json")
        );
    }

    #[test]
    fn test_missing_configured_key_file_is_credentials_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.google.credentials_file = dir.path().join("absent.json").display().to_string();

        let err = build_publisher(&config, &credentials_path(&config, &args(None)), None)
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Credentials(msg) if msg.contains("absent.json")));
    }

    #[test]
    fn test_token_needs_no_key_file() {
        let config = Config::default();
        let publisher = build_publisher(&config, Path::new("/nonexistent.json"), Some("tok")).unwrap();
        assert_eq!(publisher.provider(), "google");
        assert_eq!(publisher.quota().map(|q| q.remaining()), Some(200));
    }
}
