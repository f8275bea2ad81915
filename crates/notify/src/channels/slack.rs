//! Slack-compatible incoming webhook channel.

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::NotifyChannel;

/// Slack incoming-webhook notification channel.
pub struct SlackChannel {
    webhook_url: Url,
    client: reqwest::Client,
}

impl SlackChannel {
    /// Create a Slack channel posting to `webhook_url`.
    ///
    /// # Errors
    /// Returns [`ChannelError::InvalidUrl`] unless the URL parses as http(s).
    pub fn new(webhook_url: &str) -> Result<Self, ChannelError> {
        let invalid = |reason: String| ChannelError::InvalidUrl {
            url: webhook_url.to_string(),
            reason,
        };
        let parsed = Url::parse(webhook_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        Ok(Self {
            webhook_url: parsed,
            client: reqwest::Client::new(),
        })
    }

    /// Webhook URL this channel posts to.
    #[must_use]
    pub fn webhook_url(&self) -> &Url {
        &self.webhook_url
    }

    /// Encode `text` as the webhook JSON body.
    ///
    /// # Errors
    /// Returns [`ChannelError::Serialization`] if encoding fails.
    pub fn format_payload(text: &str) -> Result<String, ChannelError> {
        Ok(serde_json::to_string(&SlackPayload { text })?)
    }
}

#[async_trait]
impl NotifyChannel for SlackChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, text: &str) -> Result<String, ChannelError> {
        let body = Self::format_payload(text)?;

        debug!(channel = "slack", bytes = body.len(), "Sending notification");

        let response = self
            .client
            .post(self.webhook_url.clone())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            debug!(channel = "slack", "Notification sent successfully");
            Ok(body)
        } else {
            warn!(
                channel = "slack",
                status = %status,
                body = %body,
                "Slack webhook request failed"
            );

            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

// =============================================================================
// Slack API types
// =============================================================================

#[derive(Debug, Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_payload_escapes_quotes_and_newlines() {
        let payload =
            SlackChannel::format_payload("say \"hi\" ( https://a.b/?q=\\ )\n").unwrap();
        assert_eq!(payload, r#"{"text":"say \"hi\" ( https://a.b/?q=\\ )\n"}"#);

        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["text"], "say \"hi\" ( https://a.b/?q=\\ )\n");
    }

    #[test]
    fn test_payload_for_empty_text() {
        assert_eq!(SlackChannel::format_payload("").unwrap(), r#"{"text":""}"#);
    }

    #[test]
    fn test_new_channel_keeps_url() {
        let channel = SlackChannel::new("https://hooks.example.com/T/B/X").unwrap();
        assert_eq!(channel.name(), "slack");
        assert_eq!(channel.webhook_url().as_str(), "https://hooks.example.com/T/B/X");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let err = SlackChannel::new("not a url").err().unwrap();
        assert!(matches!(err, ChannelError::InvalidUrl { .. }));
        assert!(!err.is_transport());

        let err = SlackChannel::new("ftp://hooks.example.com/x").err().unwrap();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[tokio::test]
    async fn test_send_posts_json_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({ "text": "a \"quoted\" title\n" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let channel = SlackChannel::new(&format!("{}/hook", server.uri())).unwrap();
        let response = channel.send("a \"quoted\" title\n").await.unwrap();
        assert_eq!(response, "ok");
    }

    #[tokio::test]
    async fn test_send_rejected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let channel = SlackChannel::new(&server.uri()).unwrap();
        let err = channel.send("hello").await.unwrap_err();
        match err {
            ChannelError::Rejected { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no_service");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_send_transport_failure() {
        // Nothing listens on port 9 of the loopback interface.
        let channel = SlackChannel::new("http://127.0.0.1:9/hook").unwrap();
        let err = channel.send("hello").await.unwrap_err();
        assert!(err.is_transport());
    }
}
