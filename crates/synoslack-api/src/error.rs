//! Request-level errors and their HTTP mapping.
//!
//! Each variant ends the request. Response bodies are fixed strings so no
//! client input or internal detail leaks back to the caller; the detail
//! goes to the log instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use synoslack_delivery::DeliveryError;
use thiserror::Error;

/// Body returned for credential failures.
pub const INVALID_API_KEY: &str = "invalid api key";
/// Body returned for any method other than POST.
pub const INVALID_METHOD: &str = "invalid request method";
/// Body returned when the request body cannot be read or parsed.
pub const BODY_READ_FAILED: &str = "error reading request body";
/// Body returned when the Slack webhook call fails.
///
/// The misspelling is part of the wire contract existing senders match on.
pub const SLACK_DELIVERY_FAILED: &str = "error sendming slack message";

/// Ways a relay request can fail.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `api_key` header missing or not equal to the configured secret.
    #[error("invalid api key")]
    InvalidApiKey,

    /// Request used a method other than POST.
    #[error("invalid request method: {0}")]
    MethodNotAllowed(String),

    /// Body could not be read from the connection.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// Body was read but is not a notification document.
    #[error("failed to parse request body: {0}")]
    Parse(String),

    /// Slack webhook call failed.
    #[error("failed to send slack message: {0}")]
    Downstream(#[from] DeliveryError),
}

impl RelayError {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::BodyRead(_) | Self::Parse(_) | Self::Downstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Fixed response body reported to the caller.
    ///
    /// Read and parse failures share one message.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidApiKey => INVALID_API_KEY,
            Self::MethodNotAllowed(_) => INVALID_METHOD,
            Self::BodyRead(_) | Self::Parse(_) => BODY_READ_FAILED,
            Self::Downstream(_) => SLACK_DELIVERY_FAILED,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}
