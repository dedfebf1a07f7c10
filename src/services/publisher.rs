// src/services/publisher.rs

//! Publish orchestrator for single-URL providers.
//!
//! A run goes through three stages, strictly in input order:
//!
//! 1. **Precheck**: updated URLs are probed according to the [`PrecheckMode`].
//! 2. **Quota truncation**: requests beyond the effective limit are skipped.
//! 3. **Dispatch**: each request is sent once, with a single retry on 502/503.
//!
//! An abort at any stage returns the accounting gathered so far inside
//! [`RunAborted`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::clients::UrlNotifier;
use crate::error::AppError;
use crate::models::{
    FailedDispatch, NotificationRequest, PrecheckMode, PublishOutcome, RunAborted, RunResult,
    SkippedRequest,
};
use crate::services::precheck::{ReachabilityCheck, run_precheck};
use crate::services::quota::QuotaTracker;
use crate::services::retry::{BatchPolicy, Continuation, Dispatch, RetryPolicy, dispatch_with_retry};

/// Orchestrates precheck, quota and dispatch for one provider.
///
/// The quota tracker is held by handle and shared across calls on the same
/// publisher, so repeated runs draw from one budget. Each logical request
/// consumes one unit; a retry does not consume another.
pub struct Publisher {
    notifier: Arc<dyn UrlNotifier>,
    prechecker: Arc<dyn ReachabilityCheck>,
    mode: PrecheckMode,
    quota: Option<Arc<QuotaTracker>>,
    retry: RetryPolicy,
    batch: BatchPolicy,
}

impl Publisher {
    /// Create a publisher with strict prechecks and no quota tracking.
    pub fn new(notifier: Arc<dyn UrlNotifier>, prechecker: Arc<dyn ReachabilityCheck>) -> Self {
        Self {
            notifier,
            prechecker,
            mode: PrecheckMode::default(),
            quota: None,
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

    /// Publish a batch. A positive `quota_override` caps this run.
    pub async fn publish(
        &self,
        requests: &[NotificationRequest],
        quota_override: Option<usize>,
    ) -> PublishOutcome {
        self.publish_with_cancel(requests, quota_override, &CancellationToken::new())
            .await
    }

    /// Publish a batch, checking `cancel` before each dispatch.
    pub async fn publish_with_cancel(
        &self,
        requests: &[NotificationRequest],
        quota_override: Option<usize>,
        cancel: &CancellationToken,
    ) -> PublishOutcome {
        let mut result = RunResult::new(requests.len());

        let precheck = match run_precheck(self.mode, self.prechecker.as_ref(), requests).await {
            Ok(outcome) => outcome,
            Err(error) => return Err(RunAborted::new(result, error)),
        };
        result.skips = precheck.skips;
        let mut pending = precheck.passed;

        if let Some(limit) = self.effective_limit(quota_override) {
            if pending.len() > limit {
                log::warn!(
                    "quota limit {} reached, skipping {} request(s)",
                    limit,
                    pending.len() - limit
                );
                result
                    .skips
                    .extend(pending.drain(limit..).map(|r| SkippedRequest::quota_exceeded(&r)));
            }
        }

        let mut pending = pending.into_iter();
        while let Some(request) = pending.next() {
            if cancel.is_cancelled() {
                log::warn!("publish cancelled before url={}", request.url);
                return Err(RunAborted::new(result, AppError::Cancelled));
            }

            if let Some(quota) = &self.quota {
                if !quota.try_consume() {
                    log::warn!("quota exhausted at url={}", request.url);
                    result.skips.push(SkippedRequest::quota_exceeded(&request));
                    result
                        .skips
                        .extend(pending.by_ref().map(|r| SkippedRequest::quota_exceeded(&r)));
                    break;
                }
            }

            result.dispatched += 1;
            log::debug!(
                "publish provider={} url={} type={}",
                self.notifier.name(),
                request.url,
                request.kind
            );

            let dispatch = dispatch_with_retry(&self.retry, "publish", &request.url, || {
                self.notifier.notify(&request.url, request.kind)
            })
            .await;

            match dispatch {
                Dispatch::Delivered { response, attempts } => {
                    log::info!(
                        "published url={} type={} status={} attempts={}",
                        request.url,
                        request.kind,
                        response.status,
                        attempts
                    );
                    result.responses.push(response);
                }
                Dispatch::Failed {
                    error, original, ..
                } => {
                    result
                        .failures
                        .push(FailedDispatch::for_request(&request, original));
                    match self.batch.on_error(&error) {
                        Continuation::Continue => {
                            log::warn!("publish failed url={} error={}, continuing", request.url, error);
                        }
                        Continuation::Abort => {
                            log::error!("publish aborted url={} error={}", request.url, error);
                            return Err(RunAborted::new(result, error));
                        }
                    }
                }
            }
        }

        Ok(result)
    }

    /// Positive override wins; otherwise the tracker's remaining budget.
    fn effective_limit(&self, quota_override: Option<usize>) -> Option<usize> {
        quota_override
            .filter(|q| *q > 0)
            .or_else(|| self.quota.as_ref().map(|q| q.remaining()))
    }
}
