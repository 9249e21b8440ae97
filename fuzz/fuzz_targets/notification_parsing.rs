#![no_main]

//! Fuzz target for inbound notification parsing.
//!
//! Any byte sequence must either parse into a notification or produce a
//! parse error. Parsed text must come back unchanged from the Slack
//! envelope round trip.

use libfuzzer_sys::fuzz_target;
use synoslack_api::{handlers::InboundNotification, RelayError};
use synoslack_delivery::{MessageStyle, WebhookMessage};

fuzz_target!(|data: &[u8]| {
    fuzz_notification_parsing(data);
});

fn fuzz_notification_parsing(data: &[u8]) {
    let notification = match InboundNotification::from_slice(data) {
        Ok(notification) => notification,
        Err(RelayError::Parse(_)) => return,
        Err(other) => panic!("parsing produced a non-parse error: {other}"),
    };

    let style = MessageStyle {
        username: "Synology".to_string(),
        icon_emoji: ":robot_face:".to_string(),
        color: "warning".to_string(),
    };
    let message = style.render(&notification.message);

    let encoded = serde_json::to_vec(&message).expect("envelope always serializes");
    let decoded: WebhookMessage = serde_json::from_slice(&encoded).expect("envelope round trips");

    assert_eq!(decoded.text().unwrap_or_default(), notification.message);
}
