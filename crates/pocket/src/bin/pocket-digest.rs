//! pocket-digest - post your unread Pocket items to a chat webhook.
//!
//! Fetches the newest unread items, prints one `title ( url )` line per item,
//! and optionally archives each item and forwards the digest to a webhook.
//!
//! # Environment Variables
//!
//! - `POCKET_CONSUMER_KEY` - Pocket API consumer key (required)
//! - `POCKET_ACCESS_TOKEN` - Pocket API access token (required)
//! - `SLACK_POCKET_URL` - Default webhook URL for `--send`
//! - `RUST_LOG` - Log filter (logs go to stderr)
//!
//! # Examples
//!
//! ```bash
//! # Print the 10 newest unread items
//! pocket-digest
//!
//! # Post the 5 newest to the webhook and archive them
//! pocket-digest -n 5 -s -a
//!
//! # Post to a different webhook
//! pocket-digest -s --url https://hooks.slack.com/services/T000/B000/XXXX
//! ```

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pocket::client::API_BASE_URL;
use pocket::config::DEFAULT_COUNT;
use pocket::{Credentials, DigestConfig, Pipeline, PocketClient};

/// Fetch unread Pocket items, optionally archive them, and print or post the digest.
#[derive(Parser, Debug)]
#[command(name = "pocket-digest")]
#[command(about = "Digest of unread Pocket items for a chat webhook")]
#[command(version)]
struct Cli {
    /// Archive each fetched item
    #[arg(short, long)]
    archive: bool,

    /// Maximum number of items to fetch
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_COUNT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    count: u32,

    /// Post the digest to the webhook instead of printing it
    #[arg(short, long)]
    send: bool,

    /// Webhook URL (or set `SLACK_POCKET_URL` env var)
    #[arg(long, env = "SLACK_POCKET_URL")]
    url: Option<String>,

    /// Pocket consumer key (or set `POCKET_CONSUMER_KEY` env var)
    #[arg(long, env = "POCKET_CONSUMER_KEY", hide_env_values = true)]
    consumer_key: String,

    /// Pocket access token (or set `POCKET_ACCESS_TOKEN` env var)
    #[arg(long, env = "POCKET_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Pocket API root
    #[arg(long, env = "POCKET_API_URL", default_value = API_BASE_URL, hide = true)]
    api_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_parts(self) -> Result<(DigestConfig, String)> {
        let config = DigestConfig::new(
            Credentials::new(self.consumer_key, self.access_token),
            self.count,
            self.archive,
            self.send,
            self.url,
        )?;
        Ok((config, self.api_url))
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("pocket=debug,notify=debug,info")
        } else {
            EnvFilter::new("pocket=info,notify=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut stdout = std::io::stdout();
    run(cli, &mut stdout).await
}

/// One digest run; an `Err` here makes the process exit non-zero.
async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let (config, api_url) = cli.into_parts()?;
    let client = PocketClient::with_base_url(config.credentials.clone(), api_url);
    let pipeline = Pipeline::new(config, client)?;

    let report = pipeline
        .run(out)
        .await
        .context("Pocket digest failed")?;

    if !report.archive_failures.is_empty() {
        tracing::warn!(
            failed = report.archive_failures.len(),
            archived = report.archived.len(),
            "Some items could not be archived"
        );
    }

    Ok(())
}
