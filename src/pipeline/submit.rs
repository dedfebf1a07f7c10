// src/pipeline/submit.rs

//! IndexNow submission entry point.

use std::sync::Arc;

use crate::clients::{IndexNowClient, IndexNowEngine, UrlSetNotifier};
use crate::error::{AppError, Result};
use crate::models::{Config, NotificationKind};
use crate::services::{
    BatchPolicy, HttpPrechecker, QuotaTable, RetryPolicy, SubmitRequest, Submitter,
};
use crate::utils::{get_domain, http};

use super::report::{OutputFormat, print_result};
use super::{cancel_on_ctrl_c, ensure_http_urls};

/// Arguments for one submission run. Empty fields fall back to `[indexnow]` config.
#[derive(Debug, Clone, Default)]
pub struct SubmitArgs {
    pub engine: Option<String>,
    pub host: Option<String>,
    pub key: Option<String>,
    pub key_location: Option<String>,
    pub urls: Vec<String>,
    pub deleted: bool,
    pub quota: Option<usize>,
    pub format: OutputFormat,
}

/// Resolve arguments against configuration into a submission.
pub fn resolve_request(config: &Config, args: &SubmitArgs) -> Result<SubmitRequest> {
    let pick = |arg: &Option<String>, fallback: &str| {
        arg.clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    };

    let key = pick(&args.key, &config.indexnow.key);
    if key.trim().is_empty() {
        return Err(AppError::invalid_argument("IndexNow key is not given"));
    }

    let mut host = pick(&args.host, &config.indexnow.host);
    if host.trim().is_empty() {
        host = args
            .urls
            .first()
            .and_then(|u| get_domain(u))
            .ok_or_else(|| AppError::invalid_argument("IndexNow host is not given"))?;
    }

    let kind = if args.deleted {
        NotificationKind::Deleted
    } else {
        NotificationKind::Updated
    };

    Ok(SubmitRequest {
        host,
        key,
        key_location: pick(&args.key_location, &config.indexnow.key_location),
        urls: args.urls.clone(),
        kind,
    })
}

/// Build a submitter for the configured or requested engine.
pub fn build_submitter(config: &Config, engine: &IndexNowEngine) -> Result<Submitter> {
    let notifier: Arc<dyn UrlSetNotifier> = Arc::new(IndexNowClient::new(
        http::create_async_client(&config.http)?,
        engine.clone(),
    ));
    let prechecker = Arc::new(HttpPrechecker::new(http::create_precheck_client(
        &config.http,
    )?));

    let quota = QuotaTable::with_overrides(&config.quotas).tracker_for(engine.name());
    let mut submitter = Submitter::new(notifier, prechecker)
        .with_precheck_mode(config.precheck.mode)
        .with_max_urls_per_request(config.indexnow.max_urls_per_request)
        .with_retry_policy(RetryPolicy::new(config.publisher.retry_statuses.iter().copied()))
        .with_batch_policy(BatchPolicy {
            continue_on_provider_error: config.publisher.continue_on_provider_error,
        });
    if let Some(quota) = quota {
        submitter = submitter.with_quota(Arc::new(quota));
    }
    Ok(submitter)
}

/// Submit `args.urls` and print the run summary.
pub async fn run_submit(config: &Config, args: &SubmitArgs) -> Result<()> {
    if args.urls.is_empty() {
        log::warn!("No URLs given, nothing to submit");
        return Ok(());
    }
    ensure_http_urls(&args.urls)?;

    let engine: IndexNowEngine = args
        .engine
        .as_deref()
        .unwrap_or(&config.indexnow.engine)
        .parse()?;
    let request = resolve_request(config, args)?;
    let submitter = build_submitter(config, &engine)?;

    log::info!(
        "Submitting {} url(s) for {} to {}",
        request.urls.len(),
        request.host,
        engine.endpoint()
    );

    let cancel = cancel_on_ctrl_c();
    match submitter
        .submit_with_cancel(&request, args.quota, &cancel)
        .await
    {
        Ok(result) => print_result(&result, args.format),
        Err(aborted) => {
            print_result(&aborted.result, args.format)?;
            Err(aborted.error)
        }
    }
}
