// src/services/payload_services.rs

use serde_json::{Map, Value};

use crate::models::device::{DEVICE_TOKEN_BYTES, Device};
use crate::models::errors::NotificationError;
use crate::models::notification::{
    DEFAULT_TRUNCATE_AT, ELLIPSIS, Notification, truncate_alert,
};
use crate::repositories::device_repository::DeviceRepository;
use crate::repositories::notification_repository::NotificationRepository;
use crate::utilities::logging::{log_error, log_info, log_warn};

/// Ceiling for a legacy binary-protocol payload, in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 2048;
/// Floor of the shrink loop; an alert trimmed below this is unusable.
pub const TRUNCATE_FLOOR: usize = 80;
pub const TRUNCATE_STEP: usize = 10;
/// Alert prefix kept by the last-resort truncation in `message_for_sending`.
/// Not the same threshold as `DEFAULT_TRUNCATE_AT`; the two must stay
/// independent.
pub const FORCED_ALERT_PREFIX: usize = 80;

/// Builds the JSON object for a payload: system fields under `aps`, custom
/// properties as top-level siblings in insertion order.
pub fn apple_payload(notification: &Notification, truncate_at: usize) -> Map<String, Value> {
    let mut aps = Map::new();
    if let Some(alert) = &notification.alert {
        aps.insert(
            "alert".to_string(),
            Value::String(truncate_alert(alert, truncate_at)),
        );
    }
    if let Some(badge) = notification.badge {
        aps.insert("badge".to_string(), Value::from(badge));
    }
    if let Some(sound) = &notification.sound {
        aps.insert(
            "sound".to_string(),
            Value::String(sound.wire_value().to_string()),
        );
    }

    let mut payload = Map::new();
    payload.insert("aps".to_string(), Value::Object(aps));
    if let Some(properties) = &notification.custom_properties {
        for (key, value) in properties {
            payload.insert(key.clone(), Value::String(stringify(value)));
        }
    }
    payload
}

/// Custom property values cross the wire in string form; JSON strings keep
/// their content rather than gaining a second layer of quotes.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Serializes the payload, narrowing the alert threshold in steps of 10
/// until the JSON fits in 2048 bytes. Fails once the threshold reaches 80.
pub fn wire_json(
    notification: &Notification,
    truncate_at: usize,
) -> Result<String, NotificationError> {
    let mut truncate_at = truncate_at;
    loop {
        if truncate_at <= TRUNCATE_FLOOR {
            return Err(NotificationError::TruncationFailure {
                notification_id: notification.id.clone(),
                alert: notification.alert.clone(),
            });
        }
        let json = serde_json::to_string(&apple_payload(notification, truncate_at))?;
        if json.len() <= MAX_PAYLOAD_BYTES {
            return Ok(json);
        }
        truncate_at -= TRUNCATE_STEP;
    }
}

/// Assembles the binary frame of the simple notification format: command
/// byte, 2-byte token length, 32 token bytes, 2-byte payload-length slot,
/// then the UTF-8 JSON payload.
pub fn binary_frame(
    notification: &Notification,
    device: &Device,
) -> Result<Vec<u8>, NotificationError> {
    let json = wire_json(notification, DEFAULT_TRUNCATE_AT)?;
    let token = device.token_bytes()?;

    let mut frame = Vec::with_capacity(5 + DEVICE_TOKEN_BYTES + json.len());
    frame.push(0x00);
    frame.extend_from_slice(&(DEVICE_TOKEN_BYTES as u16).to_be_bytes());
    frame.extend_from_slice(&token);
    // Only the low byte of the payload-length slot is ever populated, so it
    // silently caps at 255. Consumers cannot trust it for payloads between
    // 256 and 2048 bytes; the JSON itself carries the real length.
    frame.push(0x00);
    frame.push(json.len().min(255) as u8);
    frame.extend_from_slice(json.as_bytes());
    Ok(frame)
}

/// Produces the frame for one send attempt. Frames over 2048 bytes get one
/// last-resort pass with the alert cut to an 80-character prefix; if that
/// still does not fit, `auto_truncate` decides between failing and handing
/// back the oversized frame.
pub fn message_for_sending(
    notification: &Notification,
    device: &Device,
    auto_truncate: bool,
) -> Result<Vec<u8>, NotificationError> {
    let frame = binary_frame(notification, device)?;
    if frame.len() <= MAX_PAYLOAD_BYTES {
        return Ok(frame);
    }

    let mut retried = notification.clone();
    if let Some(alert) = retried.alert.take() {
        let prefix: String = alert.chars().take(FORCED_ALERT_PREFIX).collect();
        retried.alert = Some(format!("{}{}", prefix, ELLIPSIS));
        log_info("alert_force_truncated", &retried.id);
    }

    let frame = binary_frame(&retried, device)?;
    if frame.len() <= MAX_PAYLOAD_BYTES {
        return Ok(frame);
    }

    if auto_truncate {
        log_warn("oversized_frame_accepted", &retried.id);
        return Ok(frame);
    }
    log_error("message_size_exceeded", &retried.id);
    Err(NotificationError::ExceededMessageSize { message: frame })
}

/// Encodes every unsent record into a frame, resolving each record's device
/// through the repository. Records without a resolvable device are skipped.
/// Nothing is transmitted and nothing is marked sent here.
pub async fn frames_for_unsent(
    notifications: &dyn NotificationRepository,
    devices: &dyn DeviceRepository,
    auto_truncate: bool,
) -> Result<Vec<(String, Vec<u8>)>, NotificationError> {
    let mut frames = Vec::new();
    for notification in notifications.unsent().await? {
        let device_id = match &notification.device_id {
            Some(device_id) => device_id.clone(),
            None => {
                log_warn("notification_without_device", &notification.id);
                continue;
            }
        };
        let device = match devices.get_device(&device_id).await? {
            Some(device) => device,
            None => {
                log_warn("device_not_found", &notification.id);
                continue;
            }
        };
        let frame = message_for_sending(&notification, &device, auto_truncate)?;
        frames.push((notification.id.clone(), frame));
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::Sound;
    use serde_json::json;

    fn notification_with_everything() -> Notification {
        let mut notification = Notification::new();
        notification.set_alert("Hello!");
        notification.badge = Some(5);
        notification.sound = Some(Sound::Named("my_sound.aiff".to_string()));
        let mut properties = Map::new();
        properties.insert("typ".to_string(), json!("1"));
        notification.custom_properties = Some(properties);
        notification
    }

    #[test]
    fn payload_carries_all_fields() {
        let notification = notification_with_everything();
        let payload = Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT));
        let expected: Value = serde_json::from_str(
            r#"{"typ":"1","aps":{"badge":5,"sound":"my_sound.aiff","alert":"Hello!"}}"#,
        )
        .unwrap();
        assert_eq!(payload, expected);
    }

    #[test]
    fn payload_drops_fields_one_by_one() {
        let mut notification = notification_with_everything();

        notification.custom_properties = None;
        let payload = Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT));
        assert_eq!(
            payload,
            json!({"aps": {"badge": 5, "sound": "my_sound.aiff", "alert": "Hello!"}})
        );

        notification.badge = None;
        let payload = Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT));
        assert_eq!(
            payload,
            json!({"aps": {"sound": "my_sound.aiff", "alert": "Hello!"}})
        );

        notification.alert = None;
        let payload = Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT));
        assert_eq!(payload, json!({"aps": {"sound": "my_sound.aiff"}}));

        notification.sound = None;
        let payload = Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT));
        assert_eq!(payload, json!({"aps": {}}));

        notification.sound = Some(Sound::Default);
        let payload = Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT));
        assert_eq!(payload, json!({"aps": {"sound": "1.aiff"}}));
    }

    #[test]
    fn badge_zero_is_still_present() {
        let mut notification = Notification::new();
        notification.badge = Some(0);
        notification.sound = Some(Sound::Default);
        let payload = Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT));
        assert_eq!(payload, json!({"aps": {"badge": 0, "sound": "1.aiff"}}));
    }

    #[test]
    fn custom_property_values_are_stringified() {
        let mut notification = Notification::new();
        let mut properties = Map::new();
        properties.insert("typ".to_string(), json!(1));
        properties.insert("flag".to_string(), json!(true));
        notification.custom_properties = Some(properties);

        let payload = Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT));
        assert_eq!(payload, json!({"aps": {}, "typ": "1", "flag": "true"}));
    }

    #[test]
    fn custom_properties_stay_outside_aps() {
        let notification = notification_with_everything();
        let payload = apple_payload(&notification, DEFAULT_TRUNCATE_AT);
        assert!(payload.contains_key("typ"));
        assert!(!payload["aps"].as_object().unwrap().contains_key("typ"));
    }

    #[test]
    fn payload_re_truncates_a_directly_written_alert() {
        let mut notification = Notification::new();
        // Written directly, bypassing the mutator.
        notification.alert = Some("a".repeat(200));
        let payload = apple_payload(&notification, DEFAULT_TRUNCATE_AT);
        let alert = payload["aps"]["alert"].as_str().unwrap();
        assert_eq!(alert.len(), 130);
        assert!(alert.ends_with("..."));
    }

    #[test]
    fn wire_json_serializes_compactly() {
        let notification = notification_with_everything();
        let json = wire_json(&notification, DEFAULT_TRUNCATE_AT).unwrap();
        assert!(!json.contains(' '));
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed,
            Value::Object(apple_payload(&notification, DEFAULT_TRUNCATE_AT))
        );
    }

    #[test]
    fn wire_json_rejects_thresholds_at_or_below_the_floor() {
        let notification = Notification::new();
        assert!(matches!(
            wire_json(&notification, TRUNCATE_FLOOR),
            Err(NotificationError::TruncationFailure { .. })
        ));
        assert!(matches!(
            wire_json(&notification, 70),
            Err(NotificationError::TruncationFailure { .. })
        ));
    }

    #[test]
    fn wire_json_narrows_until_the_payload_fits() {
        let mut notification = Notification::new();
        notification.set_alert("a".repeat(200));
        let mut properties = Map::new();
        properties.insert("data".to_string(), json!("x".repeat(1908)));
        notification.custom_properties = Some(properties);

        // 30 bytes of JSON scaffolding + alert + 1908 property bytes: too
        // big at 130 and 120, exactly 2048 at 110.
        let json = wire_json(&notification, DEFAULT_TRUNCATE_AT).unwrap();
        assert_eq!(json.len(), 2048);

        let parsed: Value = serde_json::from_str(&json).unwrap();
        let alert = parsed["aps"]["alert"].as_str().unwrap();
        assert_eq!(alert.chars().count(), 110);
        assert!(alert.ends_with("..."));
    }

    #[test]
    fn wire_json_fails_when_no_threshold_can_fit() {
        let mut notification = Notification::new();
        notification.set_alert("too big to save");
        let mut properties = Map::new();
        properties.insert("data".to_string(), json!("x".repeat(2500)));
        notification.custom_properties = Some(properties);

        match wire_json(&notification, DEFAULT_TRUNCATE_AT) {
            Err(NotificationError::TruncationFailure {
                notification_id,
                alert,
            }) => {
                assert_eq!(notification_id, notification.id);
                assert_eq!(alert.as_deref(), Some("too big to save"));
            }
            other => panic!("expected TruncationFailure, got {:?}", other),
        }
    }
}
