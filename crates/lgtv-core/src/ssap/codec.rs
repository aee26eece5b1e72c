//! Text-frame codec for SSAP messages.
//!
//! SSAP frames are JSON objects carried in WebSocket *text* frames — there is
//! no binary framing layer and no length prefix, because WebSocket already
//! delivers whole messages.  The codec here is therefore thin: serialize a
//! [`ClientMessage`] to a JSON string, and parse an incoming text frame into
//! a [`TvMessage`].
//!
//! Keeping it behind typed functions (instead of calling `serde_json` at every
//! call site) gives the connection manager a single choke point with a typed
//! error, which the tests below pin down.

use thiserror::Error;

use crate::ssap::messages::{ClientMessage, TvMessage};

/// Errors that can occur while encoding or decoding SSAP frames.
#[derive(Debug, Error)]
pub enum SsapError {
    /// A [`ClientMessage`] could not be serialized to JSON.
    #[error("failed to encode SSAP frame: {0}")]
    Encode(#[source] serde_json::Error),

    /// An incoming text frame was not a valid SSAP JSON object (bad JSON,
    /// missing `type`, or an unknown `type` value).
    #[error("malformed SSAP frame: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Encodes a [`ClientMessage`] into the JSON text to send on the WebSocket.
///
/// # Errors
///
/// Returns [`SsapError::Encode`] if serialization fails.
pub fn encode_frame(msg: &ClientMessage) -> Result<String, SsapError> {
    serde_json::to_string(msg).map_err(SsapError::Encode)
}

/// Decodes one incoming WebSocket text frame into a [`TvMessage`].
///
/// # Errors
///
/// Returns [`SsapError::Malformed`] if the text is not a recognized SSAP
/// frame.  The caller logs and skips the frame — one garbled message must not
/// tear down the connection.
pub fn decode_frame(text: &str) -> Result<TvMessage, SsapError> {
    serde_json::from_str(text).map_err(SsapError::Malformed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
