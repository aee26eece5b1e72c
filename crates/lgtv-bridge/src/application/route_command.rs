//! Command routing: inbound bus messages → TV command actions.
//!
//! This module is the bridge's dispatch table.  It is stateless per message
//! and has no I/O side effects: `(topic, payload)` goes in, a
//! [`CommandAction`] (or nothing) comes out.  The infrastructure layer then
//! carries the action out against the TV connection.
//!
//! # Topic shape
//!
//! ```text
//! <prefix>/set/<command>[/more/path...]
//! ```
//!
//! A single leading `/` is tolerated and stripped.  Messages whose second
//! segment is not `set` are ignored — there is no TV command they could map
//! to.  An unrecognized `<command>` falls through to the generic case: the
//! whole remaining path becomes a literal SSAP endpoint path and a non-empty
//! payload is parsed as its JSON parameters.  That pass-through is the escape
//! hatch for every SSAP endpoint the named table doesn't cover.
//!
//! # Payload coercion policy
//!
//! The TV's protocol is tolerant, and the table mirrors that: only JSON
//! payloads are validated (a parse failure drops the single command with a
//! warning).  Boolean-ish commands treat `"false"` and `"0"` as false and
//! anything else as true.  `volume` requires a base-10 integer; a non-numeric
//! payload is dropped with a warning.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use lgtv_core::ssap::messages::uris;
use lgtv_core::PointerEvent;

/// What an inbound `set` message asks the bridge to do.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandAction {
    /// Send a one-shot SSAP request.
    Request {
        /// Endpoint path, e.g. `ssap://audio/setVolume`.
        uri: String,
        /// Optional JSON parameters.
        payload: Option<Value>,
    },
    /// Send an event on the pointer-input socket.
    Pointer(PointerEvent),
    /// Wake the TV (wake-on-LAN plus the firmware toggle workaround).
    PowerOn,
    /// Turn the TV off.
    PowerOff,
    /// Open a target, then run the delayed maximize pointer sequence.
    OpenMax {
        /// Target identifier or URL passed to `system.launcher/open`.
        target: String,
    },
}

/// JSON payload shape for the `move`, `drag`, and `scroll` commands.
#[derive(Debug, Deserialize)]
struct Deltas {
    dx: i32,
    dy: i32,
}

/// Routes one inbound bus message to a [`CommandAction`].
///
/// Returns `None` for messages that produce no TV command: topics outside
/// `<prefix>/set/...`, and payloads that fail the coercion rules above
/// (logged, dropped).
pub fn dispatch(prefix: &str, topic: &str, payload: &str) -> Option<CommandAction> {
    let topic = topic.strip_prefix('/').unwrap_or(topic);
    let parts: Vec<&str> = topic.split('/').collect();

    if parts.get(1).copied() != Some("set") {
        return None;
    }
    let command = *parts.get(2)?;

    match command {
        "toast" => Some(CommandAction::Request {
            uri: uris::CREATE_TOAST.to_string(),
            payload: Some(json!({ "message": payload })),
        }),

        "volume" => match payload.trim().parse::<i32>() {
            Ok(volume) => Some(CommandAction::Request {
                uri: uris::SET_VOLUME.to_string(),
                payload: Some(json!({ "volume": volume })),
            }),
            Err(_) => {
                warn!("volume payload is not an integer: {payload:?}");
                None
            }
        },

        "mute" => Some(CommandAction::Request {
            uri: uris::SET_MUTE.to_string(),
            payload: Some(json!({ "mute": parse_bool(payload) })),
        }),

        "input" => Some(CommandAction::Request {
            uri: uris::SWITCH_INPUT.to_string(),
            payload: Some(json!({ "inputId": payload })),
        }),

        "launch" => Some(CommandAction::Request {
            uri: uris::LAUNCH.to_string(),
            payload: Some(json!({ "id": payload })),
        }),

        "system_launch_json" => json_params(command, payload).map(|params| {
            CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(params),
            }
        }),

        "am_launch_json" => json_params(command, payload).map(|params| {
            CommandAction::Request {
                uri: uris::AM_LAUNCH.to_string(),
                payload: Some(params),
            }
        }),

        // The event type on the pointer socket is `move` for both moves and
        // drags; only the drag flag differs.
        "move" | "drag" => deltas(command, payload).map(|d| {
            CommandAction::Pointer(PointerEvent::Move {
                dx: d.dx,
                dy: d.dy,
                drag: command == "drag",
            })
        }),

        "scroll" => deltas(command, payload)
            .map(|d| CommandAction::Pointer(PointerEvent::Scroll { dx: d.dx, dy: d.dy })),

        "click" => Some(CommandAction::Pointer(PointerEvent::Click)),

        "power" => {
            if parse_bool(payload) {
                Some(CommandAction::PowerOn)
            } else {
                Some(CommandAction::PowerOff)
            }
        }

        "button" => Some(CommandAction::Pointer(PointerEvent::Button {
            name: payload.to_uppercase(),
        })),

        "open" => Some(CommandAction::Request {
            uri: uris::OPEN.to_string(),
            payload: Some(json!({ "target": payload })),
        }),

        "open_max" => Some(CommandAction::OpenMax {
            target: payload.to_string(),
        }),

        // Streaming-service shortcuts.  The launch parameters (app ids,
        // content-id URL shapes) are what the respective apps accept.
        "netflix" => {
            let params = if payload.is_empty() {
                json!({ "id": "netflix" })
            } else {
                json!({
                    "id": "netflix",
                    "contentId": format!(
                        "m=http://api.netflix.com/catalog/titles/movies/{payload}&source_type=4"
                    ),
                })
            };
            Some(CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(params),
            })
        }

        "amazon_prime" => Some(CommandAction::Request {
            uri: uris::LAUNCH.to_string(),
            payload: Some(json!({ "id": "amazon" })),
        }),

        "web_video_caster" => Some(CommandAction::Request {
            uri: uris::LAUNCH.to_string(),
            payload: Some(json!({ "id": "com.instantbits.cast.webvideo" })),
        }),

        "youtube" => {
            let params = if payload.is_empty() {
                json!({ "id": "youtube.leanback.v4" })
            } else {
                json!({
                    "id": "youtube.leanback.v4",
                    "params": {
                        "contentTarget": format!("https://www.youtube.com/tv?v={payload}"),
                    },
                })
            };
            Some(CommandAction::Request {
                uri: uris::AM_LAUNCH.to_string(),
                payload: Some(params),
            })
        }

        "plex" => Some(CommandAction::Request {
            uri: uris::LAUNCH.to_string(),
            payload: Some(json!({ "id": "cdp-30" })),
        }),

        // Generic pass-through: the remaining path is a literal SSAP endpoint
        // and the payload — if non-empty — is its JSON parameters.
        _ => {
            let path = parts[2..].join("/");
            let params = if payload.is_empty() {
                None
            } else {
                match json_params(&path, payload) {
                    Some(params) => Some(params),
                    None => return None,
                }
            };
            Some(CommandAction::Request {
                uri: format!("ssap://{path}"),
                payload: params,
            })
        }
    }
}

/// Boolean coercion shared by `mute` and `power`: the strings `"false"` and
/// `"0"` are false, anything else (including empty) is true.
fn parse_bool(payload: &str) -> bool {
    !(payload == "false" || payload == "0")
}

/// Parses a JSON command payload, logging and returning `None` on failure.
fn json_params(command: &str, payload: &str) -> Option<Value> {
    match serde_json::from_str(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{command}: invalid JSON payload {payload:?}: {e}");
            None
        }
    }
}

/// Parses a `{dx, dy}` pointer payload, logging and returning `None` on failure.
fn deltas(command: &str, payload: &str) -> Option<Deltas> {
    match serde_json::from_str(payload) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!("{command}: invalid pointer payload {payload:?}: {e}");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "lgtv";

    fn set(command: &str) -> String {
        format!("{PREFIX}/set/{command}")
    }

    // ── Topic parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_non_set_topic_is_ignored() {
        assert_eq!(dispatch(PREFIX, "lgtv/status/volume", "5"), None);
        assert_eq!(dispatch(PREFIX, "lgtv/get/volume", "5"), None);
    }

    #[test]
    fn test_topic_without_command_segment_is_ignored() {
        assert_eq!(dispatch(PREFIX, "lgtv/set", "x"), None);
    }

    #[test]
    fn test_leading_slash_is_stripped() {
        // Arrange / Act
        let action = dispatch(PREFIX, "/lgtv/set/mute", "1").unwrap();

        // Assert
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::SET_MUTE.to_string(),
                payload: Some(json!({"mute": true})),
            }
        );
    }

    // ── Named commands ────────────────────────────────────────────────────────

    #[test]
    fn test_toast_wraps_payload_in_message() {
        let action = dispatch(PREFIX, &set("toast"), "hello there").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::CREATE_TOAST.to_string(),
                payload: Some(json!({"message": "hello there"})),
            }
        );
    }

    #[test]
    fn test_volume_parses_decimal_payload() {
        // Arrange / Act
        let action = dispatch(PREFIX, &set("volume"), "37").unwrap();

        // Assert: exactly the setVolume endpoint with an integer parameter
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::SET_VOLUME.to_string(),
                payload: Some(json!({"volume": 37})),
            }
        );
    }

    #[test]
    fn test_volume_tolerates_surrounding_whitespace() {
        let action = dispatch(PREFIX, &set("volume"), " 12 ").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::SET_VOLUME.to_string(),
                payload: Some(json!({"volume": 12})),
            }
        );
    }

    #[test]
    fn test_volume_non_numeric_payload_is_dropped() {
        // The original forwarded NaN here; integer parsing makes that
        // unrepresentable, so the command is dropped instead (see DESIGN.md).
        assert_eq!(dispatch(PREFIX, &set("volume"), "loud"), None);
    }

    #[test]
    fn test_mute_false_strings() {
        for payload in ["false", "0"] {
            let action = dispatch(PREFIX, &set("mute"), payload).unwrap();
            assert_eq!(
                action,
                CommandAction::Request {
                    uri: uris::SET_MUTE.to_string(),
                    payload: Some(json!({"mute": false})),
                },
                "payload {payload:?} must mute=false"
            );
        }
    }

    #[test]
    fn test_mute_any_other_string_is_true() {
        for payload in ["1", "true", "yes", ""] {
            let action = dispatch(PREFIX, &set("mute"), payload).unwrap();
            assert_eq!(
                action,
                CommandAction::Request {
                    uri: uris::SET_MUTE.to_string(),
                    payload: Some(json!({"mute": true})),
                },
                "payload {payload:?} must mute=true"
            );
        }
    }

    #[test]
    fn test_input_passes_input_id() {
        let action = dispatch(PREFIX, &set("input"), "HDMI_2").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::SWITCH_INPUT.to_string(),
                payload: Some(json!({"inputId": "HDMI_2"})),
            }
        );
    }

    #[test]
    fn test_launch_passes_app_id() {
        let action = dispatch(PREFIX, &set("launch"), "netflix").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(json!({"id": "netflix"})),
            }
        );
    }

    #[test]
    fn test_system_launch_json_forwards_parsed_object() {
        let action =
            dispatch(PREFIX, &set("system_launch_json"), r#"{"id":"hdmi2","params":{}}"#).unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(json!({"id": "hdmi2", "params": {}})),
            }
        );
    }

    #[test]
    fn test_system_launch_json_invalid_payload_is_dropped() {
        assert_eq!(dispatch(PREFIX, &set("system_launch_json"), "{oops"), None);
    }

    #[test]
    fn test_am_launch_json_targets_application_manager() {
        let action = dispatch(PREFIX, &set("am_launch_json"), r#"{"id":"youtube.leanback.v4"}"#)
            .unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::AM_LAUNCH.to_string(),
                payload: Some(json!({"id": "youtube.leanback.v4"})),
            }
        );
    }

    #[test]
    fn test_am_launch_json_malformed_payload_produces_nothing() {
        // A parse failure must drop the single command, not panic.
        assert_eq!(dispatch(PREFIX, &set("am_launch_json"), "not json"), None);
    }

    // ── Pointer commands ──────────────────────────────────────────────────────

    #[test]
    fn test_move_produces_pointer_move_without_drag() {
        let action = dispatch(PREFIX, &set("move"), r#"{"dx":5,"dy":-3}"#).unwrap();
        assert_eq!(
            action,
            CommandAction::Pointer(PointerEvent::Move {
                dx: 5,
                dy: -3,
                drag: false,
            })
        );
    }

    #[test]
    fn test_drag_produces_pointer_move_with_drag() {
        let action = dispatch(PREFIX, &set("drag"), r#"{"dx":5,"dy":-3}"#).unwrap();
        assert_eq!(
            action,
            CommandAction::Pointer(PointerEvent::Move {
                dx: 5,
                dy: -3,
                drag: true,
            })
        );
    }

    #[test]
    fn test_move_invalid_json_is_dropped() {
        assert_eq!(dispatch(PREFIX, &set("move"), "up and left"), None);
    }

    #[test]
    fn test_scroll_produces_scroll_event() {
        let action = dispatch(PREFIX, &set("scroll"), r#"{"dx":0,"dy":120}"#).unwrap();
        assert_eq!(
            action,
            CommandAction::Pointer(PointerEvent::Scroll { dx: 0, dy: 120 })
        );
    }

    #[test]
    fn test_click_ignores_payload() {
        let action = dispatch(PREFIX, &set("click"), "whatever").unwrap();
        assert_eq!(action, CommandAction::Pointer(PointerEvent::Click));
    }

    #[test]
    fn test_button_uppercases_payload() {
        let action = dispatch(PREFIX, &set("button"), "volumeup").unwrap();
        assert_eq!(
            action,
            CommandAction::Pointer(PointerEvent::Button {
                name: "VOLUMEUP".to_string(),
            })
        );
    }

    // ── Power ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_power_false_strings_turn_off() {
        assert_eq!(dispatch(PREFIX, &set("power"), "false"), Some(CommandAction::PowerOff));
        assert_eq!(dispatch(PREFIX, &set("power"), "0"), Some(CommandAction::PowerOff));
    }

    #[test]
    fn test_power_other_strings_turn_on() {
        assert_eq!(dispatch(PREFIX, &set("power"), "1"), Some(CommandAction::PowerOn));
        assert_eq!(dispatch(PREFIX, &set("power"), "true"), Some(CommandAction::PowerOn));
    }

    // ── Open / open_max ───────────────────────────────────────────────────────

    #[test]
    fn test_open_targets_system_launcher() {
        let action = dispatch(PREFIX, &set("open"), "http://example.com").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::OPEN.to_string(),
                payload: Some(json!({"target": "http://example.com"})),
            }
        );
    }

    #[test]
    fn test_open_max_carries_target() {
        let action = dispatch(PREFIX, &set("open_max"), "http://example.com/video").unwrap();
        assert_eq!(
            action,
            CommandAction::OpenMax {
                target: "http://example.com/video".to_string(),
            }
        );
    }

    // ── Streaming shortcuts ───────────────────────────────────────────────────

    #[test]
    fn test_netflix_without_payload_launches_plain() {
        let action = dispatch(PREFIX, &set("netflix"), "").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(json!({"id": "netflix"})),
            }
        );
    }

    #[test]
    fn test_netflix_with_payload_builds_content_id() {
        let action = dispatch(PREFIX, &set("netflix"), "70143836").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(json!({
                    "id": "netflix",
                    "contentId":
                        "m=http://api.netflix.com/catalog/titles/movies/70143836&source_type=4",
                })),
            }
        );
    }

    #[test]
    fn test_amazon_prime_launches_amazon_app() {
        let action = dispatch(PREFIX, &set("amazon_prime"), "").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(json!({"id": "amazon"})),
            }
        );
    }

    #[test]
    fn test_web_video_caster_launches_by_package_id() {
        let action = dispatch(PREFIX, &set("web_video_caster"), "").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(json!({"id": "com.instantbits.cast.webvideo"})),
            }
        );
    }

    #[test]
    fn test_youtube_without_payload_launches_plain() {
        let action = dispatch(PREFIX, &set("youtube"), "").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::AM_LAUNCH.to_string(),
                payload: Some(json!({"id": "youtube.leanback.v4"})),
            }
        );
    }

    #[test]
    fn test_youtube_with_video_id_builds_content_target() {
        let action = dispatch(PREFIX, &set("youtube"), "dQw4w9WgXcQ").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::AM_LAUNCH.to_string(),
                payload: Some(json!({
                    "id": "youtube.leanback.v4",
                    "params": {"contentTarget": "https://www.youtube.com/tv?v=dQw4w9WgXcQ"},
                })),
            }
        );
    }

    #[test]
    fn test_plex_launches_by_store_id() {
        let action = dispatch(PREFIX, &set("plex"), "").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: uris::LAUNCH.to_string(),
                payload: Some(json!({"id": "cdp-30"})),
            }
        );
    }

    // ── Generic pass-through ──────────────────────────────────────────────────

    #[test]
    fn test_unknown_command_becomes_generic_request() {
        // Arrange / Act
        let action =
            dispatch(PREFIX, "lgtv/set/com.example/doSomething", r#"{"a":1}"#).unwrap();

        // Assert: the remaining path is forwarded verbatim as an SSAP endpoint
        assert_eq!(
            action,
            CommandAction::Request {
                uri: "ssap://com.example/doSomething".to_string(),
                payload: Some(json!({"a": 1})),
            }
        );
    }

    #[test]
    fn test_generic_request_with_empty_payload_has_no_params() {
        let action = dispatch(PREFIX, "lgtv/set/system/turnOn", "").unwrap();
        assert_eq!(
            action,
            CommandAction::Request {
                uri: "ssap://system/turnOn".to_string(),
                payload: None,
            }
        );
    }

    #[test]
    fn test_generic_request_with_invalid_json_is_dropped() {
        assert_eq!(
            dispatch(PREFIX, "lgtv/set/com.example/doSomething", "not json"),
            None
        );
    }

    // ── Boolean coercion helper ───────────────────────────────────────────────

    #[test]
    fn test_parse_bool_false_strings() {
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn test_parse_bool_everything_else_is_true() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool(""));
        assert!(parse_bool("FALSE")); // case-sensitive, as in the original
    }
}
