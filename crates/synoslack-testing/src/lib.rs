//! Test infrastructure for the relay.
//!
//! [`TestEnv`] pairs a fully configured router with a wiremock stand-in for
//! the Slack webhook, so tests can drive the inbound side with
//! `tower::ServiceExt::oneshot` and inspect exactly what reached Slack.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use synoslack_api::{create_router, middleware::auth::API_KEY_HEADER, AppState, Config};
use synoslack_delivery::WebhookMessage;
use tower::ServiceExt;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

/// Shared secret configured in every test environment.
pub const TEST_API_KEY: &str = "abcdefghijklmnopqrstuvwxyz012345";

/// Path the stub webhook listens on, shaped like a real Slack hook.
pub const WEBHOOK_PATH: &str = "/services/T0000/B0000/XXXXXXXXXXXXXXXX";

/// Relay wired to a stubbed Slack webhook.
pub struct TestEnv {
    /// Stub Slack webhook.
    pub slack: MockServer,
    /// Configuration the router was built with.
    pub config: Config,
    router: Router,
}

/// Captured relay response.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Body decoded as UTF-8.
    pub body: String,
    /// `X-Request-Id` header, when present.
    pub request_id: Option<String>,
}

impl TestEnv {
    /// Starts a stub webhook and builds a relay pointing at it.
    ///
    /// No responses are mounted; call [`TestEnv::mock_slack`] before
    /// sending requests that should reach Slack.
    pub async fn new() -> Result<Self> {
        Self::with_overrides(|_| {}).await
    }

    /// Like [`TestEnv::new`], with `overrides` applied to the configuration
    /// before the router is built.
    pub async fn with_overrides(overrides: impl FnOnce(&mut Config)) -> Result<Self> {
        let slack = MockServer::start().await;
        let webhook = format!("{}{WEBHOOK_PATH}", slack.uri());
        let mut config = Config { slack_webhook: webhook, ..test_config() };
        overrides(&mut config);
        Self::with_config(slack, config)
    }

    /// Builds a relay whose webhook URL points at a closed local port.
    pub async fn with_unreachable_webhook() -> Result<Self> {
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").context("failed to reserve a port")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let slack = MockServer::start().await;
        let webhook = format!("http://{addr}{WEBHOOK_PATH}");
        Self::with_config(slack, Config { slack_webhook: webhook, ..test_config() })
    }

    fn with_config(slack: MockServer, config: Config) -> Result<Self> {
        config.validate()?;
        let state = AppState::new(config.clone())?;
        Ok(Self { slack, config, router: create_router(state) })
    }

    /// Mounts a webhook response with `status`, expecting `calls` requests.
    ///
    /// Expectations are verified when the environment is dropped.
    pub async fn mock_slack(&self, status: u16, calls: u64) {
        Mock::given(matchers::method("POST"))
            .and(matchers::path(WEBHOOK_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("ok"))
            .expect(calls)
            .mount(&self.slack)
            .await;
    }

    /// Mounts a webhook response that arrives only after `delay`.
    pub async fn mock_slow_slack(&self, status: u16, delay: Duration) {
        Mock::given(matchers::method("POST"))
            .and(matchers::path(WEBHOOK_PATH))
            .respond_with(ResponseTemplate::new(status).set_delay(delay))
            .mount(&self.slack)
            .await;
    }

    /// Clears mounted mocks and recorded requests.
    pub async fn reset(&self) {
        self.slack.reset().await;
    }

    /// Sends a request through the full router.
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = String::from_utf8(bytes.to_vec()).context("response body is not UTF-8")?;

        Ok(TestResponse { status, body, request_id })
    }

    /// Posts a notification carrying the test credential.
    pub async fn post_notification(&self, message: &str) -> Result<TestResponse> {
        let body = serde_json::json!({ "message": message }).to_string();
        self.send(relay_request(Method::POST, Some(TEST_API_KEY), body)).await
    }

    /// Every message the stub webhook received, in arrival order.
    pub async fn received_messages(&self) -> Result<Vec<WebhookMessage>> {
        let requests = self.slack.received_requests().await.unwrap_or_default();
        requests
            .iter()
            .map(|r| serde_json::from_slice(&r.body).context("webhook received invalid JSON"))
            .collect()
    }

    /// Number of calls the stub webhook received.
    pub async fn slack_call_count(&self) -> usize {
        self.slack.received_requests().await.map_or(0, |r| r.len())
    }
}

/// Builds a request to the relay route.
pub fn relay_request(method: Method, api_key: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    relay_request_to("/", method, api_key, body)
}

/// Builds a relay request for an arbitrary path.
pub fn relay_request_to(
    path: &str,
    method: Method,
    api_key: Option<&str>,
    body: impl Into<Body>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(key) = api_key {
        builder = builder.header(API_KEY_HEADER, key);
    }
    builder
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap_or_else(|e| panic!("invalid test request: {e}"))
}

/// Valid configuration minus the webhook URL.
pub fn test_config() -> Config {
    Config {
        api_key: TEST_API_KEY.to_string(),
        slack_webhook: "http://127.0.0.1:9/unused".to_string(),
        listen_host: "127.0.0.1".to_string(),
        slack_timeout_seconds: 5,
        ..Config::default()
    }
}
