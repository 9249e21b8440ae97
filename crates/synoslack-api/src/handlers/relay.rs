//! Notification relay handler.
//!
//! Accepts a Synology notification, wraps its text in the configured Slack
//! envelope, and posts it to the webhook once. Authentication has already
//! happened in middleware by the time this runs.

use axum::{
    body::{self, Body},
    extract::State,
    http::{Method, StatusCode},
};
use serde_json::Value;
use synoslack_delivery::ErrorCategory;
use tracing::{debug, error, info, instrument};

use crate::{error::RelayError, AppState};

/// Field carrying the notification text.
const MESSAGE_FIELD: &str = "message";

/// Notification document sent by the NAS.
///
/// The `message` key matches case-insensitively, an exact match wins.
/// A missing or `null` message is treated as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundNotification {
    /// Free-text notification body.
    pub message: String,
}

impl InboundNotification {
    /// Parses a notification from raw request bytes.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Parse` when the bytes are not a JSON object of
    /// the expected shape.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RelayError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| RelayError::Parse(e.to_string()))?;

        let Value::Object(fields) = value else {
            return Err(RelayError::Parse("expected a JSON object".to_string()));
        };

        let field = fields.get(MESSAGE_FIELD).or_else(|| {
            fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(MESSAGE_FIELD))
                .map(|(_, value)| value)
        });

        match field {
            None | Some(Value::Null) => Ok(Self { message: String::new() }),
            Some(Value::String(text)) => Ok(Self { message: text.clone() }),
            Some(other) => Err(RelayError::Parse(format!(
                "invalid type for {MESSAGE_FIELD}: expected a string, found {other}"
            ))),
        }
    }
}

/// Relays one notification to Slack.
///
/// # Errors
///
/// - 405 for any method other than POST
/// - 500 when the body cannot be read or parsed
/// - 500 when the Slack webhook call fails
#[instrument(name = "relay_notification", skip_all, fields(method = %method))]
pub async fn relay_notification(
    State(state): State<AppState>,
    method: Method,
    body: Body,
) -> Result<StatusCode, RelayError> {
    if method != Method::POST {
        debug!("Rejecting non-POST request");
        return Err(RelayError::MethodNotAllowed(method.to_string()));
    }

    let read = body::to_bytes(body, state.config.max_body_bytes);
    let bytes = match tokio::time::timeout(state.config.request_timeout(), read).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            error!(error = %e, "error reading request body");
            return Err(RelayError::BodyRead(e.to_string()));
        },
        Err(_) => {
            let timeout_seconds = state.config.request_timeout;
            error!(timeout_seconds, "error reading request body: timed out");
            return Err(RelayError::BodyRead(format!("timed out after {timeout_seconds}s")));
        },
    };

    let notification = InboundNotification::from_slice(&bytes).inspect_err(|e| {
        error!(error = %e, payload_bytes = bytes.len(), "error reading request body");
    })?;

    let message = state.style.render(&notification.message);

    let response = state
        .client
        .deliver(&state.config.slack_webhook, &message)
        .await
        .inspect_err(|e| {
            error!(
                error = %e,
                category = %ErrorCategory::from(e),
                slack_status = ?e.status_code(),
                "error sending slack message"
            );
        })?;

    info!(
        message_chars = notification.message.chars().count(),
        slack_status = response.status_code,
        duration_ms = response.duration.as_millis(),
        "Notification relayed"
    );

    Ok(StatusCode::OK)
}
