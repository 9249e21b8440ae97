//! Slack incoming-webhook envelope.
//!
//! Field names and omission rules follow Slack's webhook contract: empty
//! strings and empty attachment lists are left out of the JSON entirely.

use serde::{Deserialize, Serialize};

/// Message posted to a Slack incoming webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    /// Display name shown as the sender.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// Emoji shortcode used as the sender icon, e.g. `:robot_face:`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_emoji: String,
    /// Attachments rendered below the (absent) top-level text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// A single Slack message attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Sidebar color: `good`, `warning`, `danger` or a hex code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    /// Attachment body.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

/// Visual styling applied to every relayed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageStyle {
    /// Sender display name.
    pub username: String,
    /// Sender icon shortcode.
    pub icon_emoji: String,
    /// Attachment color tag.
    pub color: String,
}

impl MessageStyle {
    /// Wraps `text` in a webhook message carrying this style.
    ///
    /// The text is copied as-is into a single attachment.
    pub fn render(&self, text: &str) -> WebhookMessage {
        WebhookMessage {
            username: self.username.clone(),
            icon_emoji: self.icon_emoji.clone(),
            attachments: vec![Attachment { color: self.color.clone(), text: text.to_owned() }],
        }
    }
}

impl WebhookMessage {
    /// Text of the first attachment, if any.
    pub fn text(&self) -> Option<&str> {
        self.attachments.first().map(|a| a.text.as_str())
    }
}
