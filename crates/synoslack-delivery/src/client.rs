//! HTTP client for Slack webhook delivery with a bounded timeout.
//!
//! Handles request construction, response processing, and error
//! categorization. Each call makes exactly one attempt.

use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::Response;
use tracing::{info_span, Instrument};

use crate::{
    error::{DeliveryError, Result},
    message::WebhookMessage,
};

const MAX_RESPONSE_BODY_SIZE: usize = 64 * 1024;
const MAX_LOGGED_BODY_SIZE: usize = 1024;

/// Configuration for the webhook delivery client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound for a single webhook call, connect to last byte.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            user_agent: format!("synoslack/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Successful webhook response.
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    /// HTTP status code (2xx).
    pub status_code: u16,
    /// Response body, truncated for logging.
    pub body: String,
    /// Total duration of the request.
    pub duration: Duration,
}

/// HTTP client posting messages to Slack incoming webhooks.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl DeliveryClient {
    /// Creates a new delivery client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` if the HTTP client cannot
    /// be configured with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                DeliveryError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Creates a new delivery client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Posts `message` to the webhook at `url`.
    ///
    /// # Errors
    ///
    /// - `SerializationError` if the message cannot be encoded
    /// - `Timeout` when the configured timeout elapses
    /// - `NetworkError` for any other transport failure
    /// - `ClientError` / `ServerError` / `UnexpectedStatus` for non-2xx
    ///   responses
    pub async fn deliver(&self, url: &str, message: &WebhookMessage) -> Result<DeliveryResponse> {
        let payload = serde_json::to_vec(message)
            .map(Bytes::from)
            .map_err(|e| DeliveryError::serialization(e.to_string()))?;

        let span = info_span!("slack_delivery", payload_bytes = payload.len());

        async move {
            let start_time = Instant::now();
            tracing::debug!("Posting message to Slack webhook");

            let response = match self
                .client
                .post(url)
                .header("content-type", "application/json")
                .body(payload)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let duration = start_time.elapsed();
                    tracing::warn!(duration_ms = duration.as_millis(), "Request failed: {}", e);

                    if e.is_timeout() {
                        return Err(DeliveryError::timeout(self.config.timeout.as_secs()));
                    }
                    if e.is_connect() {
                        return Err(DeliveryError::network(format!("connection failed: {e}")));
                    }
                    return Err(DeliveryError::network(e.to_string()));
                },
            };

            let status_code = response.status().as_u16();
            let is_success = response.status().is_success();
            let body = read_body(response).await;
            let duration = start_time.elapsed();

            tracing::debug!(status = status_code, duration_ms = duration.as_millis(), "Received response");

            if !is_success {
                tracing::warn!(status = status_code, body = %body, "Slack webhook rejected message");
                return Err(DeliveryError::from_status(status_code, body));
            }

            tracing::info!(status = status_code, "Slack message delivered");
            Ok(DeliveryResponse { status_code, body, duration })
        }
        .instrument(span)
        .await
    }
}

/// Reads the response body for diagnostics, bounded in size.
async fn read_body(response: Response) -> String {
    match response.bytes().await {
        Ok(bytes) if bytes.len() > MAX_RESPONSE_BODY_SIZE => {
            let suffix = "... (truncated)";
            let max_content = MAX_LOGGED_BODY_SIZE - suffix.len();
            let truncated = String::from_utf8_lossy(&bytes[..max_content]);
            format!("{truncated}{suffix}")
        },
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!("Failed to read response body: {}", e);
            format!("[Failed to read response body: {e}]")
        },
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::message::MessageStyle;

    fn test_message() -> WebhookMessage {
        MessageStyle {
            username: "Synology".to_string(),
            icon_emoji: ":robot_face:".to_string(),
            color: "warning".to_string(),
        }
        .render("disk failure")
    }

    #[tokio::test]
    async fn successful_delivery() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/services/T000/B000/XXXX"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let url = format!("{}/services/T000/B000/XXXX", mock_server.uri());

        let response = client.deliver(&url, &test_message()).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn payload_is_sent_as_json() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::header("content-type", "application/json"))
            .and(matchers::body_json(serde_json::json!({
                "username": "Synology",
                "icon_emoji": ":robot_face:",
                "attachments": [{ "color": "warning", "text": "disk failure" }]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let result = client.deliver(&mock_server.uri(), &test_message()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn client_error_is_a_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let error = client.deliver(&mock_server.uri(), &test_message()).await.unwrap_err();

        match error {
            DeliveryError::ClientError { status_code, body } => {
                assert_eq!(status_code, 404);
                assert_eq!(body, "no_service");
            },
            other => panic!("expected client error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_a_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let error = client.deliver(&mock_server.uri(), &test_message()).await.unwrap_err();

        assert!(matches!(error, DeliveryError::ServerError { status_code: 500, .. }));
    }

    #[tokio::test]
    async fn slow_webhook_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::new(ClientConfig {
            timeout: Duration::from_millis(200),
            ..ClientConfig::default()
        })
        .unwrap();

        let error = client.deliver(&mock_server.uri(), &test_message()).await.unwrap_err();
        assert!(matches!(error, DeliveryError::Timeout { .. }));
    }

    #[tokio::test]
    async fn unreachable_webhook_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = DeliveryClient::with_defaults().unwrap();
        let error = client.deliver(&format!("http://{addr}/hook"), &test_message()).await.unwrap_err();

        assert!(matches!(error, DeliveryError::NetworkError { .. }));
    }
}
