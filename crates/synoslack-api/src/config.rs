//! Configuration management for the Synology to Slack relay.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use synoslack_delivery::{ClientConfig, MessageStyle};

const CONFIG_FILE: &str = "config.toml";

/// Shortest shared secret the relay will start with, in bytes.
pub const MIN_API_KEY_LENGTH: usize = 32;

/// String settings taken verbatim from the environment.
///
/// `Env` parses values into typed data, so `SLACK_USERNAME=true` would
/// otherwise arrive as a bool and fail extraction.
const STRING_ENV_KEYS: [&str; 6] = [
    "LISTEN_HOST",
    "API_KEY",
    "SLACK_WEBHOOK",
    "SLACK_ATTACHMENT_COLOR",
    "SLACK_USERNAME",
    "SLACK_ICONEMOJI",
];

/// Relay configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// `API_KEY` and `SLACK_WEBHOOK` have no usable default and must be
/// supplied. The value is immutable once loaded and shared by every
/// request handler.
///
/// # Example
///
/// ```no_run
/// use synoslack_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Relay will bind to {}:{}", config.listen_host, config.listen_port);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Address the relay binds.
    ///
    /// Environment variable: `LISTEN_HOST`
    #[serde(default = "default_listen_host")]
    pub listen_host: String,
    /// Port the relay binds.
    ///
    /// Environment variable: `LISTEN_PORT`
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Inbound request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Largest inbound body the relay will read, in bytes.
    ///
    /// Environment variable: `MAX_BODY_BYTES`
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    // Authentication
    /// Shared secret expected in the `api_key` request header.
    ///
    /// Environment variable: `API_KEY`
    #[serde(default)]
    pub api_key: String,

    // Slack
    /// Slack incoming webhook URL.
    ///
    /// Environment variable: `SLACK_WEBHOOK`
    #[serde(default)]
    pub slack_webhook: String,
    /// Attachment color tag.
    ///
    /// Environment variable: `SLACK_ATTACHMENT_COLOR`
    #[serde(default = "default_attachment_color")]
    pub slack_attachment_color: String,
    /// Sender display name.
    ///
    /// Environment variable: `SLACK_USERNAME`
    #[serde(default = "default_username")]
    pub slack_username: String,
    /// Sender icon emoji shortcode.
    ///
    /// Environment variable: `SLACK_ICONEMOJI`
    #[serde(default = "default_icon_emoji")]
    pub slack_iconemoji: String,
    /// Outbound webhook call timeout in seconds.
    ///
    /// Environment variable: `SLACK_TIMEOUT_SECONDS`
    #[serde(default = "default_slack_timeout")]
    pub slack_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides, then validate it.
    ///
    /// # Errors
    ///
    /// Fails when a value cannot be parsed, a required value is missing,
    /// or the API key is shorter than [`MIN_API_KEY_LENGTH`]. A relay with
    /// a weak secret must not start.
    pub fn load() -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::raw());

        for key in STRING_ENV_KEYS {
            if let Ok(value) = std::env::var(key) {
                figment = figment.merge(Serialized::default(&key.to_ascii_lowercase(), value));
            }
        }

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let host = if self.listen_host.contains(':') {
            format!("[{}]", self.listen_host)
        } else {
            self.listen_host.clone()
        };
        SocketAddr::from_str(&format!("{host}:{}", self.listen_port))
            .context("Invalid server address")
    }

    /// Styling applied to every outbound message.
    pub fn message_style(&self) -> MessageStyle {
        MessageStyle {
            username: self.slack_username.clone(),
            icon_emoji: self.slack_iconemoji.clone(),
            color: self.slack_attachment_color.clone(),
        }
    }

    /// Convert to the delivery crate's client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.slack_timeout_seconds),
            ..ClientConfig::default()
        }
    }

    /// Inbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Get the webhook URL with its secret path hidden for logging.
    ///
    /// Slack webhook paths embed the token, so only scheme and host are
    /// kept.
    pub fn slack_webhook_masked(&self) -> String {
        match reqwest::Url::parse(&self.slack_webhook) {
            Ok(url) => format!("{}://{}/***", url.scheme(), url.host_str().unwrap_or("")),
            Err(_) => "***".to_string(),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!("API_KEY must be set");
        }

        let key_length = self.api_key.len();
        if key_length < MIN_API_KEY_LENGTH {
            anyhow::bail!(
                "api key not long enough it should be {MIN_API_KEY_LENGTH} characters long not {key_length}"
            );
        }

        if self.slack_webhook.is_empty() {
            anyhow::bail!("SLACK_WEBHOOK must be set");
        }

        let webhook = reqwest::Url::parse(&self.slack_webhook)
            .context("SLACK_WEBHOOK is not a valid URL")?;
        if !matches!(webhook.scheme(), "http" | "https") {
            anyhow::bail!("SLACK_WEBHOOK must use http or https, got {}", webhook.scheme());
        }

        if self.listen_port == 0 {
            anyhow::bail!("listen_port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.slack_timeout_seconds == 0 {
            anyhow::bail!("slack_timeout_seconds must be greater than 0");
        }

        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }

        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen_host", &self.listen_host)
            .field("listen_port", &self.listen_port)
            .field("request_timeout", &self.request_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("api_key", &"***")
            .field("slack_webhook", &self.slack_webhook_masked())
            .field("slack_attachment_color", &self.slack_attachment_color)
            .field("slack_username", &self.slack_username)
            .field("slack_iconemoji", &self.slack_iconemoji)
            .field("slack_timeout_seconds", &self.slack_timeout_seconds)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            request_timeout: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            api_key: String::new(),
            slack_webhook: String::new(),
            slack_attachment_color: default_attachment_color(),
            slack_username: default_username(),
            slack_iconemoji: default_icon_emoji(),
            slack_timeout_seconds: default_slack_timeout(),
        }
    }
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_attachment_color() -> String {
    "warning".to_string()
}

fn default_username() -> String {
    "Synology".to_string()
}

fn default_icon_emoji() -> String {
    ":robot_face:".to_string()
}

fn default_slack_timeout() -> u64 {
    synoslack_delivery::DEFAULT_TIMEOUT_SECONDS
}
