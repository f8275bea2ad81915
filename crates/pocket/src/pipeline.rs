//! Digest pipeline - fetch, format/archive each item, then deliver.

use std::io::Write;
use std::sync::Arc;

use notify::{NotifyChannel, SlackChannel};
use tracing::{debug, info, warn};

use crate::client::PocketClient;
use crate::config::{Delivery, DigestConfig};
use crate::error::Result;

/// An item whose archive call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFailure {
    pub item_id: String,
    pub error: String,
}

/// How the digest left the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Written to the output stream.
    Printed,
    /// Posted to the webhook; holds the raw response body.
    Posted { response: String },
}

/// Result of a single run.
#[derive(Debug)]
pub struct RunReport {
    /// Digest text, one line per item.
    pub text: String,
    /// Number of items fetched.
    pub fetched: usize,
    /// Ids of items archived.
    pub archived: Vec<String>,
    /// Items whose archive call failed.
    pub archive_failures: Vec<ArchiveFailure>,
    pub delivery: DeliveryOutcome,
}

/// Digest pipeline orchestrator.
pub struct Pipeline {
    config: DigestConfig,
    client: PocketClient,
    /// Set exactly when the digest is posted instead of printed.
    channel: Option<Arc<dyn NotifyChannel>>,
}

impl Pipeline {
    /// Create a pipeline; webhook delivery gets a Slack channel.
    ///
    /// The webhook URL is checked here, before any request is sent.
    pub fn new(config: DigestConfig, client: PocketClient) -> Result<Self> {
        let channel: Option<Arc<dyn NotifyChannel>> = match &config.delivery {
            Delivery::Stdout => None,
            Delivery::Webhook(url) => Some(Arc::new(SlackChannel::new(url)?)),
        };

        Ok(Self {
            config,
            client,
            channel,
        })
    }

    /// Post the digest through `channel` instead of the configured delivery.
    #[must_use]
    pub fn with_channel(mut self, channel: Arc<dyn NotifyChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Run once, writing confirmations and printed output to `out`.
    ///
    /// Fetch and delivery failures abort the run. Archive failures are
    /// logged, recorded in the report, and the loop moves on.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunReport> {
        info!(
            count = self.config.count,
            archive = self.config.archive,
            "Starting digest run"
        );

        let items = self.client.fetch(self.config.count).await?.into_items();
        info!(fetched = items.len(), "Fetched unread items");

        let mut text = String::new();
        let mut archived = Vec::new();
        let mut archive_failures = Vec::new();

        for item in &items {
            text.push_str(&item.digest_line());

            if !self.config.archive {
                continue;
            }

            match self.client.archive(item).await {
                Ok(confirmation) => {
                    debug!(item_id = %item.item_id, "Archived item");
                    writeln!(out, "{confirmation}")?;
                    archived.push(item.item_id.clone());
                }
                Err(e) => {
                    warn!(item_id = %item.item_id, error = %e, "Archive failed");
                    archive_failures.push(ArchiveFailure {
                        item_id: item.item_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let delivery = self.deliver(&text, out).await?;

        info!(
            fetched = items.len(),
            archived = archived.len(),
            failed = archive_failures.len(),
            "Digest run complete"
        );

        Ok(RunReport {
            text,
            fetched: items.len(),
            archived,
            archive_failures,
            delivery,
        })
    }

    /// Print the digest or post it, even when it is empty.
    async fn deliver<W: Write>(&self, text: &str, out: &mut W) -> Result<DeliveryOutcome> {
        match &self.channel {
            None => {
                out.write_all(text.as_bytes())?;
                out.flush()?;
                Ok(DeliveryOutcome::Printed)
            }
            Some(channel) => {
                info!(channel = channel.name(), bytes = text.len(), "Posting digest");
                let response = channel.send(text).await?;
                writeln!(out, "{response}")?;
                Ok(DeliveryOutcome::Posted { response })
            }
        }
    }
}
