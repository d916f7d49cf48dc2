// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utilities::id_generator::generate_notification_id;

/// Widest alert the wire payload will carry without trimming.
pub const DEFAULT_TRUNCATE_AT: usize = 130;
/// Sound file substituted when a notification asks for the default sound.
pub const DEFAULT_SOUND: &str = "1.aiff";

pub(crate) const ELLIPSIS: &str = "...";

/// Sound slot of a payload: either a named file shipped with the app, or
/// the default-sound sentinel that goes over the wire as `1.aiff`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sound {
    Named(String),
    Default,
}

impl Sound {
    pub fn wire_value(&self) -> &str {
        match self {
            Sound::Named(name) => name,
            Sound::Default => DEFAULT_SOUND,
        }
    }
}

/// A push notification staged for delivery to a single device.
///
/// Records are persisted through a `NotificationRepository`; `sent_at`
/// stays `None` until a dispatcher marks the record sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub device_id: Option<String>,
    pub alert: Option<String>,
    pub badge: Option<u32>,
    pub sound: Option<Sound>,
    pub custom_properties: Option<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new() -> Self {
        Self {
            id: generate_notification_id(),
            device_id: None,
            alert: None,
            badge: None,
            sound: None,
            custom_properties: None,
            created_at: Utc::now(),
            sent_at: None,
        }
    }

    pub fn for_device(device_id: impl Into<String>) -> Self {
        let mut notification = Self::new();
        notification.device_id = Some(device_id.into());
        notification
    }

    /// Stores the alert text. Messages over 130 characters are trimmed to
    /// 127 characters plus a `...` marker.
    pub fn set_alert(&mut self, message: impl Into<String>) {
        self.set_alert_truncated(message, DEFAULT_TRUNCATE_AT);
    }

    pub fn set_alert_truncated(&mut self, message: impl Into<String>, truncate_at: usize) {
        let message = message.into();
        self.alert = Some(truncate_alert(&message, truncate_at));
    }

    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }
}

/// Keeps the first `truncate_at - 3` characters and appends the marker, so
/// the result is exactly `truncate_at` characters long. Counts characters,
/// not bytes, so multi-byte text never splits mid-character.
pub(crate) fn truncate_alert(message: &str, truncate_at: usize) -> String {
    if message.chars().count() <= truncate_at {
        return message.to_string();
    }
    let kept: String = message
        .chars()
        .take(truncate_at.saturating_sub(ELLIPSIS.len()))
        .collect();
    format!("{}{}", kept, ELLIPSIS)
}
