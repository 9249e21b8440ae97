//! Integration tests for shared-secret authentication.
//!
//! Tests that the credential check runs first: no method, body, or
//! downstream processing happens for unauthenticated requests.

use axum::http::{Method, StatusCode};
use synoslack_testing::{relay_request, TestEnv, TEST_API_KEY};

/// Test a valid key passes the gate and reaches Slack.
#[tokio::test]
async fn valid_key_is_accepted() {
    let env = TestEnv::new().await.expect("test env setup");
    env.mock_slack(200, 1).await;

    let response = env
        .send(relay_request(Method::POST, Some(TEST_API_KEY), r#"{"message":"disk failure"}"#))
        .await
        .expect("request execution");

    assert_eq!(response.status, StatusCode::OK);
}

/// Test a wrong key is rejected with 401 and Slack is never called.
#[tokio::test]
async fn wrong_key_is_rejected() {
    let env = TestEnv::new().await.expect("test env setup");
    env.mock_slack(200, 0).await;

    let response = env
        .send(relay_request(Method::POST, Some("wrong"), r#"{"message":"disk failure"}"#))
        .await
        .expect("request execution");

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, "invalid api key");
    assert_eq!(env.slack_call_count().await, 0);
}

/// Test a missing header is treated like a wrong key.
#[tokio::test]
async fn missing_key_is_rejected() {
    let env = TestEnv::new().await.expect("test env setup");
    env.mock_slack(200, 0).await;

    let response = env
        .send(relay_request(Method::POST, None, r#"{"message":"disk failure"}"#))
        .await
        .expect("request execution");

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, "invalid api key");
}

/// Test near-miss keys are rejected.
#[tokio::test]
async fn near_miss_keys_are_rejected() {
    let env = TestEnv::new().await.expect("test env setup");
    env.mock_slack(200, 0).await;

    let truncated = &TEST_API_KEY[..TEST_API_KEY.len() - 1];
    let extended = format!("{TEST_API_KEY}6");
    let upper = TEST_API_KEY.to_uppercase();

    for key in [truncated, extended.as_str(), upper.as_str(), ""] {
        let response = env
            .send(relay_request(Method::POST, Some(key), r#"{"message":"x"}"#))
            .await
            .expect("request execution");

        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "key {key:?} must be rejected");
    }
}

/// Test authentication runs before the method check.
#[tokio::test]
async fn auth_precedes_method_check() {
    let env = TestEnv::new().await.expect("test env setup");

    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = env
            .send(relay_request(method.clone(), Some("wrong"), ""))
            .await
            .expect("request execution");

        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} without key");
    }
}

/// Test authentication runs before the body is parsed.
#[tokio::test]
async fn auth_precedes_body_parsing() {
    let env = TestEnv::new().await.expect("test env setup");

    let response = env
        .send(relay_request(Method::POST, None, "this is not json"))
        .await
        .expect("request execution");

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, "invalid api key");
}
