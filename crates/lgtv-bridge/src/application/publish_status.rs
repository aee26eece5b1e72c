//! Status translation: TV subscription payloads → bus status topics.
//!
//! The TV Connection Manager delivers raw subscription payloads; the
//! functions here turn them into `(topic, payload)` pairs for the bus.  They
//! are pure — the bridge loop feeds the results through the dedup cache and
//! the MQTT publish path.
//!
//! String rendering matches the bus contract the bridge has always had:
//! missing values render as the string `"undefined"` (subscribers on the bus
//! side already key off that value), numbers render without quotes, booleans
//! as `"1"`/`"0"` where the topic is documented as a flag.

use serde_json::{json, Value};

use lgtv_core::LIVE_TV_APP_ID;

/// One outbound status publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Fully-formed bus topic.
    pub topic: String,
    /// Payload string.
    pub payload: String,
}

/// Result of translating a foreground-app delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundStatus {
    /// The `<prefix>/status/foregroundApp` publish.
    pub update: StatusUpdate,
    /// The new Foreground App value (`None` when the TV reports no/empty app,
    /// i.e. it is presumed fully off rather than in quick-start standby).
    pub app: Option<String>,
    /// `true` when the reported app is the built-in live-TV tuner.
    pub is_live_tv: bool,
}

/// Translates a volume/mute subscription delivery.
///
/// The TV includes a `changed` array naming the fields that actually changed;
/// only those are republished.  A payload without a `changed` array produces
/// nothing.
pub fn volume_status(prefix: &str, payload: &Value) -> Vec<StatusUpdate> {
    let changed: Vec<&str> = payload
        .get("changed")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut updates = Vec::new();
    if changed.contains(&"volume") {
        updates.push(StatusUpdate {
            topic: format!("{prefix}/status/volume"),
            payload: value_to_string(payload.get("volume")),
        });
    }
    if changed.contains(&"muted") {
        updates.push(StatusUpdate {
            topic: format!("{prefix}/status/mute"),
            payload: if payload.get("muted").and_then(Value::as_bool).unwrap_or(false) {
                "1".to_string()
            } else {
                "0".to_string()
            },
        });
    }
    updates
}

/// Translates a foreground-app subscription delivery.
///
/// Unlike volume/mute this always publishes — the subscription itself only
/// fires on change, and the app id is the bridge's power-state oracle, so
/// every delivery is forwarded.
pub fn foreground_status(prefix: &str, payload: &Value) -> ForegroundStatus {
    let app_id = payload.get("appId").and_then(Value::as_str);

    ForegroundStatus {
        update: StatusUpdate {
            topic: format!("{prefix}/status/foregroundApp"),
            payload: value_to_string(payload.get("appId")),
        },
        app: app_id.filter(|id| !id.is_empty()).map(str::to_string),
        is_live_tv: app_id == Some(LIVE_TV_APP_ID),
    }
}

/// Translates a current-channel subscription delivery into the JSON envelope
/// `{"val": <channelNumber>, "lgtv": <raw payload>}`.
pub fn channel_status(prefix: &str, payload: &Value) -> StatusUpdate {
    let envelope = json!({
        "val": payload.get("channelNumber").cloned().unwrap_or(Value::Null),
        "lgtv": payload,
    });
    StatusUpdate {
        topic: format!("{prefix}/status/currentChannel"),
        payload: envelope.to_string(),
    }
}

/// Renders a JSON value the way the bus contract expects.
///
/// `None`/`null` become `"undefined"`; strings are used verbatim (no JSON
/// quoting); anything else uses its JSON rendering.
fn value_to_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "lgtv";

    // ── volume_status ─────────────────────────────────────────────────────────

    #[test]
    fn test_volume_change_publishes_volume_only() {
        // Arrange
        let payload = json!({"volume": 12, "muted": false, "changed": ["volume"]});

        // Act
        let updates = volume_status(PREFIX, &payload);

        // Assert
        assert_eq!(
            updates,
            vec![StatusUpdate {
                topic: "lgtv/status/volume".to_string(),
                payload: "12".to_string(),
            }]
        );
    }

    #[test]
    fn test_mute_change_publishes_mute_flag() {
        let payload = json!({"volume": 12, "muted": true, "changed": ["muted"]});
        let updates = volume_status(PREFIX, &payload);
        assert_eq!(
            updates,
            vec![StatusUpdate {
                topic: "lgtv/status/mute".to_string(),
                payload: "1".to_string(),
            }]
        );
    }

    #[test]
    fn test_unmuted_renders_zero() {
        let payload = json!({"muted": false, "changed": ["muted"]});
        let updates = volume_status(PREFIX, &payload);
        assert_eq!(updates[0].payload, "0");
    }

    #[test]
    fn test_both_changed_publishes_both() {
        let payload = json!({"volume": 7, "muted": false, "changed": ["volume", "muted"]});
        let updates = volume_status(PREFIX, &payload);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].topic, "lgtv/status/volume");
        assert_eq!(updates[1].topic, "lgtv/status/mute");
    }

    #[test]
    fn test_missing_changed_array_publishes_nothing() {
        let payload = json!({"volume": 7, "muted": false});
        assert!(volume_status(PREFIX, &payload).is_empty());
    }

    // ── foreground_status ─────────────────────────────────────────────────────

    #[test]
    fn test_foreground_app_is_published_and_tracked() {
        // Arrange
        let payload = json!({"appId": "netflix", "returnValue": true});

        // Act
        let status = foreground_status(PREFIX, &payload);

        // Assert
        assert_eq!(status.update.topic, "lgtv/status/foregroundApp");
        assert_eq!(status.update.payload, "netflix");
        assert_eq!(status.app.as_deref(), Some("netflix"));
        assert!(!status.is_live_tv);
    }

    #[test]
    fn test_missing_app_id_renders_undefined_and_clears_state() {
        // The TV reports no foreground app while fully off.
        let payload = json!({"returnValue": true});
        let status = foreground_status(PREFIX, &payload);
        assert_eq!(status.update.payload, "undefined");
        assert_eq!(status.app, None);
        assert!(!status.is_live_tv);
    }

    #[test]
    fn test_empty_app_id_clears_state_but_publishes_empty() {
        let payload = json!({"appId": ""});
        let status = foreground_status(PREFIX, &payload);
        assert_eq!(status.update.payload, "");
        assert_eq!(status.app, None, "empty app id means no foreground app");
    }

    #[test]
    fn test_live_tv_app_sets_flag() {
        let payload = json!({"appId": "com.webos.app.livetv"});
        let status = foreground_status(PREFIX, &payload);
        assert!(status.is_live_tv);
        assert_eq!(status.app.as_deref(), Some("com.webos.app.livetv"));
    }

    // ── channel_status ────────────────────────────────────────────────────────

    #[test]
    fn test_channel_envelope_carries_val_and_raw_payload() {
        // Arrange
        let payload = json!({"channelNumber": "13", "channelName": "News HD"});

        // Act
        let update = channel_status(PREFIX, &payload);

        // Assert
        assert_eq!(update.topic, "lgtv/status/currentChannel");
        let envelope: Value = serde_json::from_str(&update.payload).unwrap();
        assert_eq!(envelope["val"], "13");
        assert_eq!(envelope["lgtv"]["channelName"], "News HD");
    }

    #[test]
    fn test_channel_without_number_has_null_val() {
        let payload = json!({"channelName": "News HD"});
        let update = channel_status(PREFIX, &payload);
        let envelope: Value = serde_json::from_str(&update.payload).unwrap();
        assert!(envelope["val"].is_null());
    }

    // ── value_to_string ───────────────────────────────────────────────────────

    #[test]
    fn test_value_to_string_renderings() {
        assert_eq!(value_to_string(None), "undefined");
        assert_eq!(value_to_string(Some(&Value::Null)), "undefined");
        assert_eq!(value_to_string(Some(&json!("abc"))), "abc");
        assert_eq!(value_to_string(Some(&json!(42))), "42");
        assert_eq!(value_to_string(Some(&json!(true))), "true");
    }
}
