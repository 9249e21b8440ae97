//! Property-based tests for the relay pipeline.
//!
//! Whatever text a notification carries, Slack must receive exactly that
//! text, and whatever credential a caller presents other than the
//! configured one, Slack must receive nothing.

use axum::http::{Method, StatusCode};
use proptest::{prelude::*, test_runner::Config as ProptestConfig, test_runner::TestRunner};
use synoslack_testing::{relay_request, TestEnv, TEST_API_KEY};
use tokio::runtime::Runtime;

/// Deterministic property test configuration for CI stability.
fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: 32,
        fork: false,
        failure_persistence: None,
        source_file: None,
        ..ProptestConfig::default()
    }
}

#[test]
fn relayed_text_equals_inbound_text() {
    let runtime = Runtime::new().expect("tokio runtime");
    let env = runtime.block_on(TestEnv::new()).expect("test env setup");
    let mut runner = TestRunner::new(proptest_config());

    runner
        .run(&any::<String>(), |message| {
            let (status, received) = runtime.block_on(async {
                env.reset().await;
                env.mock_slack(200, 1).await;

                let response = env.post_notification(&message).await.expect("request execution");
                let received = env.received_messages().await.expect("webhook payloads");
                (response.status, received)
            });

            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(received.len(), 1);
            prop_assert_eq!(received[0].text(), Some(message.as_str()));
            Ok(())
        })
        .expect("identity property holds");
}

#[test]
fn foreign_credentials_never_reach_slack() {
    let runtime = Runtime::new().expect("tokio runtime");
    let env = runtime.block_on(TestEnv::new()).expect("test env setup");
    let mut runner = TestRunner::new(proptest_config());

    let key_strategy = prop::string::string_regex("[!-~]{0,64}")
        .expect("valid regex")
        .prop_filter("must differ from the configured key", |k| k != TEST_API_KEY);
    let method_strategy = prop::sample::select(vec![
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
    ]);

    runner
        .run(&(key_strategy, method_strategy), |(key, method)| {
            let (status, calls) = runtime.block_on(async {
                let response = env
                    .send(relay_request(method, Some(key.as_str()), r#"{"message":"disk failure"}"#))
                    .await
                    .expect("request execution");
                (response.status, env.slack_call_count().await)
            });

            prop_assert_eq!(status, StatusCode::UNAUTHORIZED);
            prop_assert_eq!(calls, 0);
            Ok(())
        })
        .expect("authentication property holds");
}
