//! Pocket unread digest.
//!
//! This crate provides:
//! - A Pocket v3 API client for fetching unread items and archiving them
//! - The saved-item data model with typed flags and timestamps
//! - A pipeline that formats each item as `title ( url )`, optionally
//!   archives it, then prints the digest or posts it to a chat webhook

pub mod client;
pub mod config;
pub mod error;
pub mod item;
pub mod pipeline;

// Re-export main types
pub use client::PocketClient;
pub use config::{Credentials, Delivery, DigestConfig};
pub use error::{ErrorKind, PocketError};
pub use item::{FetchItem, FetchResult, ItemStatus, MediaPresence};
pub use pipeline::{ArchiveFailure, DeliveryOutcome, Pipeline, RunReport};
