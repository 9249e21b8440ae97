//! Outbound half of the relay: Slack envelope and webhook client.
//!
//! A notification becomes a [`WebhookMessage`] through [`MessageStyle::render`]
//! and is posted once with [`DeliveryClient::deliver`]. There is no queue and
//! no retry; a failed call is reported to the caller and forgotten.
//!
//! # Example
//!
//! ```no_run
//! use synoslack_delivery::{DeliveryClient, DeliveryError, MessageStyle};
//!
//! # async fn example() -> Result<(), DeliveryError> {
//! let style = MessageStyle {
//!     username: "Synology".into(),
//!     icon_emoji: ":robot_face:".into(),
//!     color: "warning".into(),
//! };
//! let client = DeliveryClient::with_defaults()?;
//! client
//!     .deliver("https://hooks.slack.com/services/T000/B000/XXXX", &style.render("disk failure"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod message;

pub use client::{ClientConfig, DeliveryClient, DeliveryResponse};
pub use error::{DeliveryError, ErrorCategory, Result};
pub use message::{Attachment, MessageStyle, WebhookMessage};

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
