//! HTTP request handlers.
//!
//! - `relay` - the authenticated notification endpoint
//! - `health` - unauthenticated health checks
//!
//! Handlers return fixed plain-text bodies on failure and log the detail.

pub mod health;
pub mod relay;

pub use health::{health_check, liveness_check};
pub use relay::{relay_notification, InboundNotification};
