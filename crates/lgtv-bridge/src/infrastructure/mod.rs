//! Infrastructure layer for lgtv-bridge.
//!
//! All I/O lives here: the MQTT broker connection, the SSAP WebSocket to the
//! TV (and its secondary pointer socket), the pairing-key file, wake-on-LAN
//! packets, and the event loop that wires both sides together.
//!
//! # What does NOT belong here?
//!
//! - The command table and payload coercion (application layer)
//! - Status topic translation (application layer)
//! - Configuration parsing (done in `main.rs`)

pub mod bridge;
pub mod key_store;
pub mod mqtt_conn;
pub mod tv_conn;
pub mod wol;

// Re-export the primary entry point so `main.rs` can call it concisely.
pub use bridge::run_bridge;
