// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::redirect;

use crate::error::Result;
use crate::models::HttpConfig;

/// Create a configured client for provider API calls.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create a client for reachability prechecks.
///
/// Redirects are not followed: a redirecting URL counts as unreachable.
pub fn create_precheck_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(redirect::Policy::none())
        .build()?;
    Ok(client)
}
