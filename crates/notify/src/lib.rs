//! Webhook notifications for the Pocket digest.
//!
//! Posts a block of text to a chat webhook as `{"text": "..."}`.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{NotifyChannel, SlackChannel};
//!
//! # async fn run() -> Result<(), notify::ChannelError> {
//! let channel = SlackChannel::new("https://hooks.slack.com/services/T000/B000/XXXX")?;
//! let response = channel.send("Some article ( https://example.com )\n").await?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for notification channels
//! - [`SlackChannel`] implements Slack-compatible incoming webhooks

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;

pub use channels::slack::SlackChannel;
pub use channels::NotifyChannel;
pub use error::ChannelError;
