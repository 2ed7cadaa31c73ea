//! Push payload decoding.
//!
//! Payloads arrive as opaque bytes. A JSON object is decoded into its
//! fields; anything else (plain text, invalid JSON, a non-object JSON value)
//! becomes a text-only payload.

use serde::{Deserialize, Serialize};

/// A button shown on the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The JSON fields a push payload may carry. All are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
    pub tag: Option<String>,
    pub actions: Vec<NotificationAction>,
    pub renotify: Option<bool>,
}

/// A decoded push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushPayload {
    Decoded(NotificationPayload),
    Raw { text: String },
}

impl PushPayload {
    /// Decode a push message. Never fails.
    pub fn parse(data: &[u8]) -> Self {
        match serde_json::from_slice::<NotificationPayload>(data) {
            Ok(payload) => PushPayload::Decoded(payload),
            Err(e) => {
                tracing::debug!(error = %e, "push payload is not a JSON object, using raw text");
                PushPayload::Raw { text: String::from_utf8_lossy(data).into_owned() }
            }
        }
    }

    /// Normalize to the field set, with the raw text as the body.
    pub fn into_payload(self) -> NotificationPayload {
        match self {
            PushPayload::Decoded(payload) => payload,
            PushPayload::Raw { text } => NotificationPayload { body: Some(text), ..Default::default() },
        }
    }
}
