//! Pocket v3 API client.

use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::debug;

use crate::config::Credentials;
use crate::error::{PocketError, Result};
use crate::item::{FetchItem, FetchResult};

/// Base URL for the Pocket API.
pub const API_BASE_URL: &str = "https://getpocket.com/v3";

/// One entry of the `actions` array accepted by the `send` endpoint.
#[derive(Debug, Serialize)]
pub struct ArchiveAction<'a> {
    action: &'static str,
    item_id: &'a str,
    time: String,
}

impl<'a> ArchiveAction<'a> {
    /// Archive `item_id`, stamped with `time` (unix seconds).
    pub fn new(item_id: &'a str, time: i64) -> Self {
        Self {
            action: "archive",
            item_id,
            time: time.to_string(),
        }
    }
}

/// Client for the `get` and `send` endpoints.
#[derive(Clone)]
pub struct PocketClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl PocketClient {
    /// Create a client against the public Pocket API.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, API_BASE_URL)
    }

    /// Create a client against a different API root.
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Fetch up to `count` unread items, newest first.
    pub async fn fetch(&self, count: u32) -> Result<FetchResult> {
        let url = self.endpoint("get")?;
        let count = count.to_string();
        debug!(url = %url, count = %count, "GET request");

        let response = self
            .client
            .get(url)
            .header("X-Accept", "application/json")
            .query(&[
                ("state", "unread"),
                ("sort", "newest"),
                ("count", count.as_str()),
                ("consumer_key", self.credentials.consumer_key()),
                ("access_token", self.credentials.access_token()),
            ])
            .send()
            .await?;

        let body = Self::read_ok(response).await?;
        serde_json::from_str(&body).map_err(PocketError::Malformed)
    }

    /// Archive a single item, returning a confirmation line.
    pub async fn archive(&self, item: &FetchItem) -> Result<String> {
        let url = self.endpoint("send")?;
        let actions = serde_json::to_string(&[ArchiveAction::new(
            &item.item_id,
            Utc::now().timestamp(),
        )])
        .map_err(|e| PocketError::Request {
            reason: format!("failed to encode archive action: {e}"),
        })?;
        debug!(url = %url, item_id = %item.item_id, "GET request");

        let response = self
            .client
            .get(url)
            .header("X-Accept", "application/json")
            .query(&[
                ("actions", actions.as_str()),
                ("consumer_key", self.credentials.consumer_key()),
                ("access_token", self.credentials.access_token()),
            ])
            .send()
            .await?;

        Self::read_ok(response).await?;
        Ok(format!("Title: \"{}\" is archived", item.title()))
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        let raw = format!("{}/{name}", self.base_url);
        Url::parse(&raw).map_err(|e| PocketError::Request {
            reason: format!("invalid URL '{raw}': {e}"),
        })
    }

    /// Read the body, turning anything but 200 into a rejection.
    async fn read_ok(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::OK {
            Ok(body)
        } else {
            debug!(status = %status, "Pocket rejected request");
            Err(PocketError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
