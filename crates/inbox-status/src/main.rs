//! `inbox-status` - list Gmail labels with a cached `OAuth2` credential.
//!
//! The first run prints an authorization URL and reads the pasted code from
//! stdin; later runs reuse the token cached under the user config dir.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod labels;

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use inbox_status_core::CredentialManager;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Overrides the Gmail API root (used against mock servers).
const ENV_API_BASE: &str = "INBOX_STATUS_API_BASE";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the prompt and the label list.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "inbox_status=info,inbox_status_core=info,inbox_status_oauth=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let api_base = api_base()?;
    let mut manager = CredentialManager::new().await?;
    info!(source = ?manager.source(), "Credential ready");

    if let Some(e) = manager.save_error() {
        warn!(error = e as &dyn std::error::Error, "Continuing without a cached token");
    }

    let client = manager.client();
    let labels = match labels::list_labels(&client, &api_base).await {
        Ok(labels) => labels,
        Err(e @ inbox_status_oauth::Error::RefreshFailed(_)) => {
            return Err(anyhow::Error::new(e).context(format!(
                "stored credential is no longer valid; delete {} and run again",
                manager.token_path().display()
            )));
        }
        Err(e) => return Err(anyhow::Error::new(e).context("unable to retrieve labels")),
    };
    print!("{}", labels::render(&labels));

    let latest = client.current_token().await;
    if &latest != manager.token() {
        info!("Access token was refreshed, updating cache");
        if let Err(e) = manager.update_token(latest).await {
            warn!(error = &e as &dyn std::error::Error, "Refreshed token not cached");
        }
    }

    Ok(())
}

fn api_base() -> anyhow::Result<Url> {
    let raw = env::var(ENV_API_BASE).unwrap_or_else(|_| labels::GMAIL_API_BASE.to_string());
    // `Url::join` drops the last segment unless the base ends with a slash.
    let raw = if raw.ends_with('/') { raw } else { format!("{raw}/") };
    Url::parse(&raw).with_context(|| format!("invalid {ENV_API_BASE}: {raw}"))
}
