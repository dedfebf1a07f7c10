// src/services/precheck.rs

//! Reachability precheck run before notifying a provider.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{NotificationRequest, PrecheckMode, SkipReason, SkippedRequest};
use crate::utils::status_line;

/// Outcome of probing one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable { status: u16 },
    Unreachable(SkipReason),
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Reachability::Reachable { .. })
    }
}

/// Probe deciding whether a URL is worth notifying about.
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    async fn check(&self, url: &str) -> Reachability;
}

/// Issues a plain GET and treats any status up to 300 as reachable.
pub struct HttpPrechecker {
    client: Client,
}

impl HttpPrechecker {
    /// The client should not follow redirects (see `utils::http::create_precheck_client`).
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReachabilityCheck for HttpPrechecker {
    async fn check(&self, url: &str) -> Reachability {
        match self.client.get(url).send().await {
            Ok(response) if response.status().as_u16() <= 300 => Reachability::Reachable {
                status: response.status().as_u16(),
            },
            Ok(response) => Reachability::Unreachable(SkipReason::BadStatus {
                status: status_line(response.status()),
                url: url.to_string(),
            }),
            Err(e) => Reachability::Unreachable(SkipReason::Unreachable {
                message: e.to_string(),
            }),
        }
    }
}

/// Requests that survived the precheck, plus the ones moved aside.
#[derive(Debug, Default)]
pub struct PrecheckOutcome {
    pub passed: Vec<NotificationRequest>,
    pub skips: Vec<SkippedRequest>,
}

/// Apply `mode` to a batch, preserving input order.
///
/// Only kinds that need a precheck are fetched. In strict mode the first
/// unreachable URL fails the whole batch.
pub async fn run_precheck(
    mode: PrecheckMode,
    checker: &dyn ReachabilityCheck,
    requests: &[NotificationRequest],
) -> Result<PrecheckOutcome> {
    let mut outcome = PrecheckOutcome::default();

    for request in requests {
        if mode == PrecheckMode::Ignore || !request.kind.needs_precheck() {
            outcome.passed.push(request.clone());
            continue;
        }

        log::debug!("pre-check url={} type={}", request.url, request.kind);
        match checker.check(&request.url).await {
            Reachability::Reachable { .. } => outcome.passed.push(request.clone()),
            Reachability::Unreachable(reason) if mode == PrecheckMode::Strict => {
                log::error!(
                    "pre-check url={} type={} error={}",
                    request.url,
                    request.kind,
                    reason
                );
                return Err(AppError::PrecheckFailed {
                    url: request.url.clone(),
                    reason: reason.to_string(),
                });
            }
            Reachability::Unreachable(reason) => {
                log::warn!(
                    "pre-check skip url={} type={} reason={}",
                    request.url,
                    request.kind,
                    reason
                );
                outcome.skips.push(SkippedRequest::new(request, reason));
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    /// Prechecker treating a fixed set of URLs as dead.
    #[derive(Default)]
    pub struct FakePrechecker {
        dead: HashSet<String>,
        pub checked: Mutex<Vec<String>>,
    }

    impl FakePrechecker {
        pub fn with_dead(urls: &[&str]) -> Self {
            Self {
                dead: urls.iter().map(|u| u.to_string()).collect(),
                checked: Mutex::new(Vec::new()),
            }
        }

        pub fn checked(&self) -> Vec<String> {
            self.checked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReachabilityCheck for FakePrechecker {
        async fn check(&self, url: &str) -> Reachability {
            self.checked.lock().unwrap().push(url.to_string());
            if self.dead.contains(url) {
                Reachability::Unreachable(SkipReason::BadStatus {
                    status: "404 Not Found".into(),
                    url: url.to_string(),
                })
            } else {
                Reachability::Reachable { status: 200 }
            }
        }
    }
}
