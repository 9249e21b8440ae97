//! Synology to Slack notification relay.
//!
//! Main entry point. Loads and validates configuration before binding any
//! socket, so a missing setting or a weak API key stops the process with a
//! non-zero exit instead of serving insecurely.

use anyhow::{Context, Result};
use synoslack_api::{AppState, Config};
use tracing::info;

const DEFAULT_LOG_FILTER: &str =
    "info,synoslack=debug,synoslack_api=debug,synoslack_delivery=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting synoslack relay");

    let config = Config::load()?;
    let addr = config.parse_server_addr()?;
    info!(
        server_addr = %addr,
        slack_webhook = %config.slack_webhook_masked(),
        slack_username = %config.slack_username,
        "Configuration loaded"
    );

    let state = AppState::new(config).context("Failed to build Slack client")?;

    synoslack_api::start_server(state, addr).await.context("HTTP server failed")?;

    info!("synoslack shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Invalid RUST_LOG environment variable")?;

    let fmt_layer = fmt::layer().with_target(true).with_thread_ids(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
    Ok(())
}
