//! Error types for the Pocket client and digest pipeline.

use thiserror::Error;

/// Coarse classification of a [`PocketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never completed a round trip.
    Transport,
    /// The service answered with a non-success status.
    Rejected,
    /// The response body did not have the expected shape.
    Malformed,
    /// The outbound request could not be built.
    Request,
    /// Configuration was incomplete or invalid.
    Config,
    /// Writing the digest to the output stream failed.
    Output,
}

/// Errors returned by the Pocket API client and the digest pipeline.
#[derive(Error, Debug)]
pub enum PocketError {
    #[error("Pocket request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-200 answer; displays the upstream body verbatim.
    #[error("{body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to decode Pocket response: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Failed to build request: {reason}")]
    Request { reason: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Webhook delivery failed: {0}")]
    Notify(#[from] notify::ChannelError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl PocketError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(e) | Self::Notify(notify::ChannelError::Http(e)) if e.is_builder() => {
                ErrorKind::Request
            }
            Self::Transport(_) | Self::Notify(notify::ChannelError::Http(_)) => {
                ErrorKind::Transport
            }
            Self::Rejected { .. } | Self::Notify(notify::ChannelError::Rejected { .. }) => {
                ErrorKind::Rejected
            }
            Self::Malformed(_) => ErrorKind::Malformed,
            Self::Request { .. }
            | Self::Notify(
                notify::ChannelError::Serialization(_) | notify::ChannelError::InvalidUrl { .. },
            ) => ErrorKind::Request,
            Self::Config { .. } => ErrorKind::Config,
            Self::Output(_) => ErrorKind::Output,
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, PocketError>;
