//! Pipeline entry points for publisher operations.
//!
//! - `run_publish`: Notify the Indexing API one URL at a time
//! - `run_submit`: Submit URL sets to an IndexNow engine
//! - `run_validate`: Check configuration

pub mod publish;
pub mod report;
pub mod submit;
pub mod validate;

pub use publish::{PublishArgs, run_publish};
pub use report::OutputFormat;
pub use submit::{SubmitArgs, run_submit};
pub use validate::run_validate;

use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::utils::parse_http_url;

/// Reject anything that is not an absolute http(s) URL before any network work.
pub(crate) fn ensure_http_urls(urls: &[String]) -> Result<()> {
    match urls.iter().find(|u| parse_http_url(u).is_none()) {
        Some(bad) => Err(AppError::invalid_argument(format!(
            "not an absolute http(s) URL: {bad}"
        ))),
        None => Ok(()),
    }
}

/// Token cancelled on Ctrl-C. In-flight requests finish; nothing new is dispatched.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping after the current request");
            child.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_http_urls() {
        assert!(ensure_http_urls(&["https://a.example/".into()]).is_ok());
        assert!(matches!(
            ensure_http_urls(&["https://a.example/".into(), "a.example/x".into()]),
            Err(AppError::InvalidArgument(msg)) if msg.contains("a.example/x")
        ));
    }
}
