// src/clients/indexnow.rs

//! IndexNow multi-URL submission client.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use url::Url;

use crate::clients::{NotifyError, UrlSet, UrlSetNotifier};
use crate::error::{AppError, Result};
use crate::models::SetResponse;
use crate::utils::status_line;

/// Maximum URLs accepted in one IndexNow post.
pub const MAX_URLS_PER_POST: usize = 10_000;

/// Search engine receiving IndexNow submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexNowEngine {
    /// Shared endpoint that fans out to every participating engine
    IndexNow,
    Bing,
    Seznam,
    Yandex,
    Custom(Url),
}

impl IndexNowEngine {
    /// Engine identity used as the quota table key.
    pub fn name(&self) -> &str {
        match self {
            IndexNowEngine::IndexNow => "indexnow",
            IndexNowEngine::Bing => "bing",
            IndexNowEngine::Seznam => "seznam",
            IndexNowEngine::Yandex => "yandex",
            IndexNowEngine::Custom(url) => url.host_str().unwrap_or("custom"),
        }
    }

    pub fn base_url(&self) -> Url {
        let raw = match self {
            IndexNowEngine::IndexNow => "https://api.indexnow.org",
            IndexNowEngine::Bing => "https://www.bing.com",
            IndexNowEngine::Seznam => "https://search.seznam.cz",
            IndexNowEngine::Yandex => "https://yandex.com",
            IndexNowEngine::Custom(url) => return url.clone(),
        };
        Url::parse(raw).expect("built-in engine URL is valid")
    }

    /// `<base>/indexnow`
    pub fn endpoint(&self) -> String {
        let mut url = self.base_url();
        url.set_path("/indexnow");
        url.set_query(None);
        url.to_string()
    }
}

impl fmt::Display for IndexNowEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexNowEngine {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indexnow" | "" => Ok(IndexNowEngine::IndexNow),
            "bing" => Ok(IndexNowEngine::Bing),
            "seznam" => Ok(IndexNowEngine::Seznam),
            "yandex" => Ok(IndexNowEngine::Yandex),
            _ => {
                let url = Url::parse(s.trim())?;
                match url.host_str() {
                    Some("api.indexnow.org") => Ok(IndexNowEngine::IndexNow),
                    Some("www.bing.com" | "bing.com") => Ok(IndexNowEngine::Bing),
                    Some("search.seznam.cz" | "seznam.cz") => Ok(IndexNowEngine::Seznam),
                    Some("yandex.com") => Ok(IndexNowEngine::Yandex),
                    Some(_) => Ok(IndexNowEngine::Custom(url)),
                    None => Err(AppError::invalid_argument(format!(
                        "engine URL '{s}' has no host"
                    ))),
                }
            }
        }
    }
}

/// Client posting URL sets to one engine's IndexNow endpoint.
pub struct IndexNowClient {
    client: reqwest::Client,
    engine: IndexNowEngine,
    endpoint: String,
}

impl IndexNowClient {
    pub fn new(client: reqwest::Client, engine: IndexNowEngine) -> Self {
        let endpoint = engine.endpoint();
        Self {
            client,
            engine,
            endpoint,
        }
    }
}

#[async_trait]
impl UrlSetNotifier for IndexNowClient {
    async fn notify_set(&self, set: &UrlSet<'_>) -> std::result::Result<SetResponse, NotifyError<SetResponse>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(set)
            .send()
            .await
            .map_err(NotifyError::transport)?;

        let status = response.status();
        let reply = SetResponse {
            status: status.as_u16(),
            url_count: set.url_list.len(),
        };
        if status.as_u16() < 300 {
            return Ok(reply);
        }
        Err(NotifyError::status(status.as_u16(), status_line(status)).with_response(reply))
    }

    fn name(&self) -> &str {
        self.engine.name()
    }
}
