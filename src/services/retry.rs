// src/services/retry.rs

//! Retry and batch-continuation policies for provider dispatch.
//!
//! The two decisions are kept apart: [`RetryPolicy`] looks at a single failed
//! call and says whether to try it again, [`BatchPolicy`] looks at the final
//! error of a request and says whether the rest of the batch goes ahead.

use std::future::Future;

use crate::clients::NotifyError;
use crate::error::AppError;

/// What to do with a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryOnce,
    GiveUp,
}

/// Status-code classifier for retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    transient: Vec<u16>,
}

impl Default for RetryPolicy {
    /// 502 Bad Gateway and 503 Service Unavailable are retried.
    fn default() -> Self {
        Self {
            transient: vec![502, 503],
        }
    }
}

impl RetryPolicy {
    /// Retry the given statuses. 429 is never retried.
    pub fn new(transient: impl IntoIterator<Item = u16>) -> Self {
        Self {
            transient: transient.into_iter().filter(|code| *code != 429).collect(),
        }
    }

    /// Only calls that got a transient status are retried, and only once.
    pub fn decide(&self, status: Option<u16>) -> RetryDecision {
        match status {
            Some(code) if self.transient.contains(&code) => RetryDecision::RetryOnce,
            _ => RetryDecision::GiveUp,
        }
    }

    pub fn is_transient(&self, status: u16) -> bool {
        self.transient.contains(&status)
    }

    /// Map a failed call to its terminal error kind. `target` is the URL or host
    /// the call was made for.
    pub fn classify<R>(&self, target: &str, error: &NotifyError<R>) -> AppError {
        match error.status {
            None => AppError::transport(target, &error.message),
            Some(429) => AppError::QuotaExceeded,
            Some(status) if self.is_transient(status) => AppError::TransientProvider {
                url: target.to_string(),
                status,
                message: error.message.clone(),
            },
            Some(status) => AppError::Provider {
                url: target.to_string(),
                status,
                message: error.message.clone(),
            },
        }
    }
}

/// Whether a batch goes on after a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Abort,
}

/// Batch-level reaction to terminal dispatch errors.
#[derive(Debug, Clone, Default)]
pub struct BatchPolicy {
    /// Plain provider errors (4xx/5xx other than 429, 502, 503) do not stop the batch
    pub continue_on_provider_error: bool,
}

impl BatchPolicy {
    pub fn on_error(&self, error: &AppError) -> Continuation {
        match error {
            AppError::Provider { .. } if self.continue_on_provider_error => Continuation::Continue,
            _ => Continuation::Abort,
        }
    }
}

/// Result of one logical request after any retry.
#[derive(Debug)]
pub enum Dispatch<R> {
    Delivered { response: R, attempts: u8 },
    Failed {
        error: AppError,
        /// The first attempt's failure, even when a retry was made
        original: NotifyError<R>,
        attempts: u8,
    },
}

/// Run `call` against `target`, retrying once when the policy allows.
///
/// `op` prefixes log lines (`publish`, `submit`). A failed retry surfaces the
/// original failure.
pub async fn dispatch_with_retry<R, F, Fut>(
    policy: &RetryPolicy,
    op: &str,
    target: &str,
    mut call: F,
) -> Dispatch<R>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, NotifyError<R>>>,
{
    let original = match call().await {
        Ok(response) => {
            return Dispatch::Delivered {
                response,
                attempts: 1,
            };
        }
        Err(e) => e,
    };

    log::error!(
        "{}.request target={} status={:?} error={}",
        op,
        target,
        original.status,
        original.message
    );

    if policy.decide(original.status) == RetryDecision::RetryOnce {
        log::debug!("{}.request:retry target={}", op, target);
        match call().await {
            Ok(response) => {
                return Dispatch::Delivered {
                    response,
                    attempts: 2,
                };
            }
            Err(retry) => {
                log::error!(
                    "{}.request:retry target={} status={:?} error={}",
                    op,
                    target,
                    retry.status,
                    retry.message
                );
                return Dispatch::Failed {
                    error: policy.classify(target, &original),
                    original,
                    attempts: 2,
                };
            }
        }
    }

    Dispatch::Failed {
        error: policy.classify(target, &original),
        original,
        attempts: 1,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    #[test]
    fn test_retry_only_on_transient_status() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(Some(502)), RetryDecision::RetryOnce);
        assert_eq!(policy.decide(Some(503)), RetryDecision::RetryOnce);
        assert_eq!(policy.decide(Some(429)), RetryDecision::GiveUp);
        assert_eq!(policy.decide(Some(500)), RetryDecision::GiveUp);
        assert_eq!(policy.decide(None), RetryDecision::GiveUp);
    }

    #[test]
    fn test_custom_transient_statuses() {
        let policy = RetryPolicy::new([500, 429]);
        assert_eq!(policy.decide(Some(500)), RetryDecision::RetryOnce);
        assert_eq!(policy.decide(Some(503)), RetryDecision::GiveUp);
        assert_eq!(policy.decide(Some(429)), RetryDecision::GiveUp);
    }

    #[test]
    fn test_classify_error_kinds() {
        let policy = RetryPolicy::default();
        let url = "https://a.example/1";
        assert!(matches!(
            policy.classify::<()>(url, &NotifyError::status(429, "429 Too Many Requests")),
            AppError::QuotaExceeded
        ));
        assert!(matches!(
            policy.classify::<()>(url, &NotifyError::status(503, "503")),
            AppError::TransientProvider { status: 503, .. }
        ));
        assert!(matches!(
            policy.classify::<()>(url, &NotifyError::status(403, "403")),
            AppError::Provider { status: 403, .. }
        ));
        assert!(matches!(
            policy.classify::<()>(url, &NotifyError::transport("refused")),
            AppError::Transport { .. }
        ));
    }

    #[test]
    fn test_batch_policy() {
        let provider = AppError::Provider {
            url: "u".into(),
            status: 404,
            message: "404".into(),
        };
        assert_eq!(BatchPolicy::default().on_error(&provider), Continuation::Abort);

        let tolerant = BatchPolicy {
            continue_on_provider_error: true,
        };
        assert_eq!(tolerant.on_error(&provider), Continuation::Continue);
        assert_eq!(tolerant.on_error(&AppError::QuotaExceeded), Continuation::Abort);
        assert_eq!(
            tolerant.on_error(&AppError::transport("u", "refused")),
            Continuation::Abort
        );
    }

    fn scripted(
        outcomes: Vec<Result<u16, NotifyError<u16>>>,
    ) -> (RefCell<VecDeque<Result<u16, NotifyError<u16>>>>, RefCell<u8>) {
        (RefCell::new(outcomes.into()), RefCell::new(0))
    }

    #[tokio::test]
    async fn test_transient_then_success_is_delivered() {
        let (script, calls) = scripted(vec![Err(NotifyError::status(503, "503")), Ok(200)]);
        let result = dispatch_with_retry(&RetryPolicy::default(), "publish", "u", || {
            *calls.borrow_mut() += 1;
            let next = script.borrow_mut().pop_front().unwrap();
            async move { next }
        })
        .await;

        assert!(matches!(result, Dispatch::Delivered { response: 200, attempts: 2 }));
        assert_eq!(*calls.borrow(), 2);
    }

    #[tokio::test]
    async fn test_failed_retry_surfaces_original_error() {
        let (script, _) = scripted(vec![
            Err(NotifyError::status(502, "first")),
            Err(NotifyError::status(500, "second")),
        ]);
        let result = dispatch_with_retry(&RetryPolicy::default(), "publish", "u", || {
            let next = script.borrow_mut().pop_front().unwrap();
            async move { next }
        })
        .await;

        match result {
            Dispatch::Failed {
                error,
                original,
                attempts,
            } => {
                assert_eq!(attempts, 2);
                assert_eq!(original.message, "first");
                assert!(matches!(error, AppError::TransientProvider { status: 502, .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let (script, calls) = scripted(vec![Err(NotifyError::status(429, "429"))]);
        let result = dispatch_with_retry(&RetryPolicy::default(), "publish", "u", || {
            *calls.borrow_mut() += 1;
            let next = script.borrow_mut().pop_front().unwrap();
            async move { next }
        })
        .await;

        assert!(matches!(
            result,
            Dispatch::Failed {
                error: AppError::QuotaExceeded,
                attempts: 1,
                ..
            }
        ));
        assert_eq!(*calls.borrow(), 1);
    }
}
