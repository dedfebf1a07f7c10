// src/services/submitter.rs

//! Submission orchestrator for multi-URL (IndexNow) providers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::clients::{UrlSet, UrlSetNotifier};
use crate::clients::indexnow::MAX_URLS_PER_POST;
use crate::error::AppError;
use crate::models::{
    FailedDispatch, NotificationKind, NotificationRequest, PrecheckMode, RunAborted, RunResult,
    SkippedRequest, SubmitOutcome,
};
use crate::services::precheck::{ReachabilityCheck, run_precheck};
use crate::services::quota::QuotaTracker;
use crate::services::retry::{BatchPolicy, Continuation, Dispatch, RetryPolicy, dispatch_with_retry};
use crate::utils::chunk;

/// URLs to submit for one host.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub host: String,
    pub key: String,
    pub key_location: String,
    pub urls: Vec<String>,
    /// Deleted submissions are not prechecked
    pub kind: NotificationKind,
}

/// Orchestrates precheck, chunking, quota and dispatch for an IndexNow engine.
///
/// Each posted chunk consumes one quota unit.
pub struct Submitter {
    notifier: Arc<dyn UrlSetNotifier>,
    prechecker: Arc<dyn ReachabilityCheck>,
    mode: PrecheckMode,
    quota: Option<Arc<QuotaTracker>>,
    max_urls_per_request: usize,
    retry: RetryPolicy,
    batch: BatchPolicy,
}

impl Submitter {
    pub fn new(notifier: Arc<dyn UrlSetNotifier>, prechecker: Arc<dyn ReachabilityCheck>) -> Self {
        Self {
            notifier,
            prechecker,
            mode: PrecheckMode::default(),
            quota: None,
            max_urls_per_request: MAX_URLS_PER_POST,
            retry: RetryPolicy::default(),
            batch: BatchPolicy::default(),
        }
    }

    pub fn with_precheck_mode(mut self, mode: PrecheckMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_quota(mut self, quota: Arc<QuotaTracker>) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn with_max_urls_per_request(mut self, max: usize) -> Self {
        self.max_urls_per_request = max;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_batch_policy(mut self, batch: BatchPolicy) -> Self {
        self.batch = batch;
        self
    }

    pub fn quota(&self) -> Option<&Arc<QuotaTracker>> {
        self.quota.as_ref()
    }

    pub fn provider(&self) -> &str {
        self.notifier.name()
    }

    /// Submit every URL of `input`. A positive `quota_override` caps the number of posts.
    pub async fn submit(&self, input: &SubmitRequest, quota_override: Option<usize>) -> SubmitOutcome {
        self.submit_with_cancel(input, quota_override, &CancellationToken::new())
            .await
    }

    pub async fn submit_with_cancel(
        &self,
        input: &SubmitRequest,
        quota_override: Option<usize>,
        cancel: &CancellationToken,
    ) -> SubmitOutcome {
        let requests: Vec<NotificationRequest> = input
            .urls
            .iter()
            .map(|u| NotificationRequest::new(u.as_str(), input.kind))
            .collect();
        let mut result = RunResult::new(requests.len());

        let precheck = match run_precheck(self.mode, self.prechecker.as_ref(), &requests).await {
            Ok(outcome) => outcome,
            Err(error) => return Err(RunAborted::new(result, error)),
        };
        result.skips = precheck.skips;

        let urls: Vec<String> = precheck.passed.into_iter().map(|r| r.url).collect();
        let mut chunks = match chunk(&urls, self.max_urls_per_request) {
            Ok(chunks) => chunks,
            Err(error) => return Err(RunAborted::new(result, error)),
        };

        let limit = quota_override
            .filter(|q| *q > 0)
            .or_else(|| self.quota.as_ref().map(|q| q.remaining()));
        if let Some(limit) = limit {
            if chunks.len() > limit {
                log::warn!(
                    "quota limit {} reached, skipping {} post(s)",
                    limit,
                    chunks.len() - limit
                );
                for skipped in chunks.drain(limit..) {
                    Self::skip_chunk(&mut result, &skipped, input.kind);
                }
            }
        }

        let mut chunks = chunks.into_iter();
        while let Some(batch) = chunks.next() {
            if cancel.is_cancelled() {
                log::warn!("submit cancelled with {} url(s) pending", batch.len());
                return Err(RunAborted::new(result, AppError::Cancelled));
            }

            if let Some(quota) = &self.quota {
                if !quota.try_consume() {
                    log::warn!("quota exhausted for {}", self.notifier.name());
                    Self::skip_chunk(&mut result, &batch, input.kind);
                    for rest in chunks.by_ref() {
                        Self::skip_chunk(&mut result, &rest, input.kind);
                    }
                    break;
                }
            }

            result.dispatched += batch.len();
            log::debug!(
                "submit provider={} host={} urls={}",
                self.notifier.name(),
                input.host,
                batch.len()
            );

            let set = UrlSet {
                host: &input.host,
                key: &input.key,
                key_location: &input.key_location,
                url_list: &batch,
            };
            let dispatch = dispatch_with_retry(&self.retry, "submit", &input.host, || {
                self.notifier.notify_set(&set)
            })
            .await;

            match dispatch {
                Dispatch::Delivered { response, attempts } => {
                    log::info!(
                        "submitted {} url(s) to {} status={} attempts={}",
                        response.url_count,
                        self.notifier.name(),
                        response.status,
                        attempts
                    );
                    result.responses.push(response);
                }
                Dispatch::Failed {
                    error, original, ..
                } => {
                    result.failures.push(FailedDispatch {
                        urls: batch.clone(),
                        kind: input.kind,
                        status: original.status,
                        message: original.message,
                        response: original.response,
                    });
                    match self.batch.on_error(&error) {
                        Continuation::Continue => {
                            log::warn!("submit failed error={}, continuing", error);
                        }
                        Continuation::Abort => {
                            log::error!("submit aborted error={}", error);
                            return Err(RunAborted::new(result, error));
                        }
                    }
                }
            }
        }

        Ok(result)
    }

    fn skip_chunk<R>(result: &mut RunResult<R>, urls: &[String], kind: NotificationKind) {
        result.skips.extend(
            urls.iter()
                .map(|u| SkippedRequest::quota_exceeded(&NotificationRequest::new(u.as_str(), kind))),
        );
    }
}
