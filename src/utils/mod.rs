//! Utility functions and helpers.

pub mod chunk;
pub mod http;
pub mod log;

pub use chunk::chunk;

use url::Url;

/// Parse an absolute http(s) URL.
pub fn parse_http_url(url_str: &str) -> Option<Url> {
    Url::parse(url_str)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// Extract the domain from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Canonical status line, e.g. `404 Not Found`.
pub fn status_line(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
