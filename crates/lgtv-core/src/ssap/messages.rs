//! SSAP message envelope types and endpoint URIs.
//!
//! # JSON discriminant
//!
//! Every frame is a JSON object with a `"type"` field that identifies the
//! variant; all other fields are flattened into the same object.  For example:
//!
//! ```json
//! {"type":"request","id":"request_3","uri":"ssap://audio/setVolume","payload":{"volume":37}}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles this automatically.
//!
//! # Why separate client→TV and TV→client message types?
//!
//! The two directions carry different information: the client *sends*
//! commands and subscription requests; the TV *sends* replies and state
//! deliveries.  Using two distinct enums makes it a compile-time error to
//! accidentally treat a reply as a command, and vice versa.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// TCP port of the TV's SSAP WebSocket endpoint.
pub const SSAP_PORT: u16 = 3000;

/// App id the TV reports while the built-in live-TV tuner is in the
/// foreground.  Observing this id gates the current-channel subscription.
pub const LIVE_TV_APP_ID: &str = "com.webos.app.livetv";

/// SSAP endpoint URIs used by the bridge.
///
/// These are the hierarchical command paths the TV's control service exposes.
/// Anything not listed here can still be reached through the dispatcher's
/// generic pass-through case.
pub mod uris {
    /// Power the TV off (also used as the post-wake toggle workaround).
    pub const TURN_OFF: &str = "ssap://system/turnOff";
    /// Show an on-screen notification toast.
    pub const CREATE_TOAST: &str = "ssap://system.notifications/createToast";
    /// Set the audio volume level.
    pub const SET_VOLUME: &str = "ssap://audio/setVolume";
    /// Set the audio mute state.
    pub const SET_MUTE: &str = "ssap://audio/setMute";
    /// Switch the active external input.
    pub const SWITCH_INPUT: &str = "ssap://tv/switchInput";
    /// Launch an application through the system launcher.
    pub const LAUNCH: &str = "ssap://system.launcher/launch";
    /// Launch an application through the application manager (some apps only
    /// accept deep-link parameters on this endpoint).
    pub const AM_LAUNCH: &str = "ssap://com.webos.applicationManager/launch";
    /// Open a target (URL or content id) through the system launcher.
    pub const OPEN: &str = "ssap://system.launcher/open";
    /// Volume/mute state (subscription).
    pub const GET_VOLUME: &str = "ssap://audio/getVolume";
    /// Foreground application state (subscription).
    pub const GET_FOREGROUND_APP: &str =
        "ssap://com.webos.applicationManager/getForegroundAppInfo";
    /// Current live-TV channel (subscription).
    pub const GET_CURRENT_CHANNEL: &str = "ssap://tv/getCurrentChannel";
    /// External input list (subscription).
    pub const GET_EXTERNAL_INPUT_LIST: &str = "ssap://tv/getExternalInputList";
    /// Pointer-input socket acquisition handshake.
    pub const GET_POINTER_INPUT_SOCKET: &str =
        "ssap://com.webos.service.networkinput/getPointerInputSocket";
}

// ── Client → TV frames ────────────────────────────────────────────────────────

/// All frames the bridge can send on the main SSAP socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Pairing/authorization handshake.  Must be the first frame after the
    /// WebSocket is established; the TV answers with `registered` (possibly
    /// after the user confirms an on-screen prompt).
    Register {
        /// Client-chosen correlation id.
        id: String,
        /// The pairing manifest, built by [`register_payload`].
        payload: Value,
    },

    /// A one-shot command addressed by SSAP URI.
    Request {
        /// Client-chosen correlation id; the reply carries the same id.
        id: String,
        /// Endpoint path, e.g. `ssap://audio/setVolume`.
        uri: String,
        /// Optional JSON parameters for the endpoint.
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// A standing subscription.  The TV delivers a `response` frame with this
    /// id on every state change until the socket closes.
    Subscribe {
        /// Client-chosen correlation id shared by all deliveries.
        id: String,
        /// Endpoint path, e.g. `ssap://audio/getVolume`.
        uri: String,
        /// Optional JSON parameters for the endpoint.
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
}

impl ClientMessage {
    /// Returns the correlation id of this frame.
    pub fn id(&self) -> &str {
        match self {
            ClientMessage::Register { id, .. }
            | ClientMessage::Request { id, .. }
            | ClientMessage::Subscribe { id, .. } => id,
        }
    }
}

// ── TV → client frames ────────────────────────────────────────────────────────

/// All frames the TV can send on the main SSAP socket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TvMessage {
    /// Pairing accepted.  The payload carries the `client-key` to persist for
    /// prompt-free re-registration on the next connection.
    Registered {
        /// Echoes the `register` frame's id.
        id: String,
        /// Contains `client-key` among other fields.
        #[serde(default)]
        payload: Value,
    },

    /// Reply to a `request`, a subscription delivery, or the intermediate
    /// pairing frame (`payload.pairingType == "PROMPT"`) shown while the TV
    /// waits for the user to confirm authorization.
    Response {
        /// Echoes the originating frame's id.
        id: String,
        /// Endpoint-specific response fields.
        #[serde(default)]
        payload: Value,
    },

    /// The TV rejected a frame or a subscription delivery failed.
    Error {
        /// Echoes the originating frame's id when the TV knows it.
        #[serde(default)]
        id: Option<String>,
        /// Human-readable error, e.g. `"401 insufficient permissions"`.
        #[serde(default)]
        error: Option<String>,
        /// Endpoint-specific error details, if any.
        #[serde(default)]
        payload: Value,
    },
}

/// `true` when a `response` payload is the intermediate pairing-prompt frame.
pub fn is_pairing_prompt(payload: &Value) -> bool {
    payload.get("pairingType").and_then(Value::as_str) == Some("PROMPT")
}

// ── Register payload ──────────────────────────────────────────────────────────

/// Permissions requested during pairing.
///
/// The list covers everything the command table and the standing
/// subscriptions need; a TV may silently grant a subset.
const PERMISSIONS: &[&str] = &[
    "LAUNCH",
    "LAUNCH_WEBAPP",
    "APP_TO_APP",
    "CONTROL_AUDIO",
    "CONTROL_DISPLAY",
    "CONTROL_INPUT_JOYSTICK",
    "CONTROL_INPUT_MEDIA_PLAYBACK",
    "CONTROL_INPUT_TV",
    "CONTROL_POWER",
    "READ_APP_STATUS",
    "READ_CURRENT_CHANNEL",
    "READ_INPUT_DEVICE_LIST",
    "READ_INSTALLED_APPS",
    "READ_NETWORK_STATE",
    "READ_RUNNING_APPS",
    "READ_TV_CHANNEL_LIST",
    "WRITE_NOTIFICATION_TOAST",
];

/// Builds the pairing manifest for a `register` frame.
///
/// When `client_key` is `Some`, the TV re-authorizes the client without
/// showing the on-screen prompt; when `None`, the TV displays the prompt and
/// the eventual `registered` reply carries a fresh key to persist.
pub fn register_payload(client_key: Option<&str>) -> Value {
    let mut payload = json!({
        "forcePairing": false,
        "pairingType": "PROMPT",
        "manifest": {
            "manifestVersion": 1,
            "permissions": PERMISSIONS,
        },
    });
    if let Some(key) = client_key {
        payload["client-key"] = Value::String(key.to_string());
    }
    payload
}

// ── Tests ─────────────────────────────────────────────────────────────────────
