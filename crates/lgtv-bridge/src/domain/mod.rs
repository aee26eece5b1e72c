//! Domain layer for lgtv-bridge.
//!
//! Pure types with no dependencies on I/O, networking, or external
//! frameworks.  Configuration lives here as a plain struct; the
//! infrastructure layer is responsible for populating it from CLI arguments
//! and environment variables.

pub mod config;

pub use config::{BridgeConfig, MqttSettings, TvSettings};
