//! Run configuration, built once at startup and passed into the pipeline.

use std::fmt;

use reqwest::Url;

use crate::error::{PocketError, Result};

/// Default number of items to fetch.
pub const DEFAULT_COUNT: u32 = 10;

/// Pocket API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    consumer_key: String,
    access_token: String,
}

impl Credentials {
    pub fn new(consumer_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            access_token: access_token.into(),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Where the finished digest goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Print to standard output.
    Stdout,
    /// POST to a chat webhook.
    Webhook(String),
}

/// Everything one digest run needs.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub credentials: Credentials,
    /// Maximum number of items to fetch.
    pub count: u32,
    /// Archive each item after it is added to the digest.
    pub archive: bool,
    pub delivery: Delivery,
}

impl DigestConfig {
    /// Build and validate a configuration.
    ///
    /// `send` selects webhook delivery, which then requires `webhook_url`.
    pub fn new(
        credentials: Credentials,
        count: u32,
        archive: bool,
        send: bool,
        webhook_url: Option<String>,
    ) -> Result<Self> {
        if credentials.consumer_key().is_empty() {
            return Err(PocketError::config("consumer key is empty"));
        }
        if credentials.access_token().is_empty() {
            return Err(PocketError::config("access token is empty"));
        }
        if count == 0 {
            return Err(PocketError::config("item count must be at least 1"));
        }

        let delivery = if send {
            match webhook_url.filter(|url| !url.trim().is_empty()) {
                Some(url) => Delivery::Webhook(validate_webhook_url(url)?),
                None => {
                    return Err(PocketError::config(
                        "--send requires a webhook URL (--url or SLACK_POCKET_URL)",
                    ))
                }
            }
        } else {
            Delivery::Stdout
        };

        Ok(Self {
            credentials,
            count,
            archive,
            delivery,
        })
    }
}

/// Webhook URLs must parse as absolute http(s) URLs.
fn validate_webhook_url(url: String) -> Result<String> {
    let parsed = Url::parse(&url)
        .map_err(|e| PocketError::config(format!("invalid webhook URL '{url}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PocketError::config(format!(
            "invalid webhook URL '{url}': unsupported scheme '{}'",
            parsed.scheme()
        )));
    }
    Ok(url)
}
