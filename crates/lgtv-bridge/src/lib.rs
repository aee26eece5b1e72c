//! lgtv-bridge library crate.
//!
//! This crate bridges an MQTT bus to an LG webOS television: bus clients
//! publish control messages on `<prefix>/set/...` topics and the bridge
//! translates each into an SSAP remote-control request; TV state changes
//! (volume, mute, foreground app, current channel, connectivity) are
//! republished as `<prefix>/status/...` and `<prefix>/connected` topics.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! MQTT broker (bus topics)                LG TV (SSAP over WebSocket)
//!         ↕                                        ↕
//! [lgtv-bridge]
//!   ├── domain/           Pure types: BridgeConfig
//!   ├── application/      Translation: topic → command, TV state → status,
//!   │                     dedup publish cache, command execution use case
//!   └── infrastructure/
//!         ├── mqtt_conn/  rumqttc connection manager (last will, QoS-1)
//!         ├── tv_conn/    SSAP WebSocket connection manager (pairing,
//!         │               subscriptions, pointer socket)
//!         ├── key_store/  pairing client-key persistence
//!         ├── wol/        wake-on-LAN magic packets
//!         └── bridge/     the event loop wiring both sides together
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `application` depends on `domain` and `lgtv-core` only; its single async
//!   seam is the `CommandSink` trait, implemented by the infrastructure.
//! - `infrastructure` depends on all other layers plus `tokio`, `rumqttc`,
//!   and `tungstenite`.
//!
//! The two connections fail independently: the TV reconnect loop keeps
//! running while the bus is down and vice versa.  Commands that arrive while
//! the TV is disconnected are dropped by the send path — the bridge is
//! best-effort translation, not a queue.

/// Domain layer: pure configuration types (no I/O).
pub mod domain;

/// Application layer: command routing, execution, and status translation.
pub mod application;

/// Infrastructure layer: MQTT and TV connection managers, the bridge loop.
pub mod infrastructure;
