// src/clients/google.rs

//! Single-URL indexing API client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::{NotifyError, TokenSource, UrlNotifier};
use crate::models::{NotificationKind, PublishResponse, UrlNotification};
use crate::utils::status_line;

#[derive(Debug, Serialize)]
struct PublishBody<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    kind: NotificationKind,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishReply {
    #[serde(default)]
    url_notification_metadata: Option<NotificationMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationMetadata {
    #[serde(default)]
    latest_update: Option<UrlNotification>,
    #[serde(default)]
    latest_remove: Option<UrlNotification>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the `urlNotifications:publish` endpoint.
pub struct GoogleIndexingClient {
    client: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn TokenSource>,
}

impl GoogleIndexingClient {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            tokens,
        }
    }

    fn response(url: &str, kind: NotificationKind, status: u16, body: &str) -> PublishResponse {
        let metadata = serde_json::from_str::<PublishReply>(body)
            .unwrap_or_default()
            .url_notification_metadata
            .unwrap_or_default();
        PublishResponse {
            url: url.to_string(),
            kind,
            status,
            latest_update: metadata.latest_update,
            latest_remove: metadata.latest_remove,
        }
    }
}

#[async_trait]
impl UrlNotifier for GoogleIndexingClient {
    async fn notify(
        &self,
        url: &str,
        kind: NotificationKind,
    ) -> Result<PublishResponse, NotifyError<PublishResponse>> {
        let token = self
            .tokens
            .token()
            .await
            .map_err(|e| NotifyError::transport(format!("token: {e}")))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&PublishBody { url, kind })
            .send()
            .await
            .map_err(NotifyError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(NotifyError::transport)?;
        let parsed = Self::response(url, kind, status.as_u16(), &body);

        if status.is_success() {
            return Ok(parsed);
        }

        let message = serde_json::from_str::<ErrorReply>(&body)
            .ok()
            .map(|e| e.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status_line(status));
        Err(NotifyError::status(status.as_u16(), message).with_response(parsed))
    }

    fn name(&self) -> &str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::StaticToken;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GoogleIndexingClient {
        GoogleIndexingClient::new(
            reqwest::Client::new(),
            format!("{}/v3/urlNotifications:publish", server.uri()),
            Arc::new(StaticToken::new("test-token")),
        )
    }

    #[tokio::test]
    async fn test_publish_success_parses_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/urlNotifications:publish"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(serde_json::json!({
                "url": "https://a.example/1",
                "type": "URL_UPDATED"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "urlNotificationMetadata": {
                    "url": "https://a.example/1",
                    "latestUpdate": {
                        "url": "https://a.example/1",
                        "type": "URL_UPDATED",
                        "notifyTime": "2024-05-01T10:00:00Z"
                    }
                }
            })))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .notify("https://a.example/1", NotificationKind::Updated)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        let update = response.latest_update.unwrap();
        assert_eq!(update.kind, Some(NotificationKind::Updated));
        assert!(response.latest_remove.is_none());
    }

    #[tokio::test]
    async fn test_publish_error_carries_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "code": 429, "message": "Quota exceeded for quota metric" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .notify("https://a.example/1", NotificationKind::Deleted)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(429));
        assert_eq!(err.message, "Quota exceeded for quota metric");
        assert_eq!(err.response.unwrap().kind, NotificationKind::Deleted);
    }

    #[tokio::test]
    async fn test_publish_error_without_body_uses_status_line() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .notify("https://a.example/1", NotificationKind::Updated)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(503));
        assert_eq!(err.message, "503 Service Unavailable");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_has_no_status() {
        let client = GoogleIndexingClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/publish",
            Arc::new(StaticToken::new("t")),
        );
        let err = client
            .notify("https://a.example/1", NotificationKind::Updated)
            .await
            .unwrap_err();
        assert!(err.status.is_none());
    }
}
