//! Inbound gate of the Synology to Slack relay.
//!
//! Exposes one authenticated route that turns a Synology webhook
//! notification into a Slack incoming-webhook message.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{sync::Arc, time::Instant};

use synoslack_delivery::{DeliveryClient, DeliveryError, MessageStyle};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use config::Config;
pub use error::RelayError;
pub use server::{create_router, start_server};

/// State shared by every request handler.
///
/// Built once at startup and never mutated; cloning only bumps reference
/// counts.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Validated relay configuration.
    pub config: Arc<Config>,
    /// Outbound styling derived from `config`.
    pub style: Arc<MessageStyle>,
    /// Slack webhook client.
    pub client: DeliveryClient,
    /// When the state was built.
    pub started_at: Instant,
}

impl AppState {
    /// Builds handler state from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` if the HTTP client cannot
    /// be built.
    pub fn new(config: Config) -> Result<Self, DeliveryError> {
        let client = DeliveryClient::new(config.to_client_config())?;
        let style = Arc::new(config.message_style());

        Ok(Self { config: Arc::new(config), style, client, started_at: Instant::now() })
    }
}
