//! # lgtv-core
//!
//! Shared library for lgtv-bridge containing the SSAP protocol types, the bus
//! topic model, and the pointer-socket wire format.
//!
//! This crate is pure data and string manipulation: it has zero dependencies
//! on sockets, async runtimes, or the MQTT client.  Everything here can be
//! unit-tested without any network.
//!
//! # Architecture overview
//!
//! lgtv-bridge connects a publish/subscribe message bus (MQTT) to an LG webOS
//! television.  Bus clients publish control messages (`<prefix>/set/volume`,
//! `<prefix>/set/launch`, ...) and the bridge translates them into SSAP
//! remote-control requests; TV state changes come back as bus status topics.
//!
//! This crate is the shared foundation.  It defines:
//!
//! - **`ssap`** – The TV's control protocol.  SSAP is JSON over a persistent
//!   WebSocket: the client sends `register`/`request`/`subscribe` envelopes
//!   and the TV answers with id-correlated `registered`/`response`/`error`
//!   frames.  A secondary "pointer input" WebSocket carries a line-oriented
//!   text format for cursor and button events.
//!
//! - **`topic`** – The bus topic model: a canonical normalizer for topic
//!   segments and a join helper.  Every component that builds or compares
//!   topic strings goes through these functions.

// Declare the two top-level modules.  Rust will look for each in a file or
// subdirectory with the same name (e.g., src/ssap/mod.rs).
pub mod ssap;
pub mod topic;

// Re-export the most-used items at the crate root so callers can write
// `lgtv_core::PointerEvent` instead of `lgtv_core::ssap::pointer::PointerEvent`.
pub use ssap::codec::{decode_frame, encode_frame, SsapError};
pub use ssap::messages::{ClientMessage, TvMessage, LIVE_TV_APP_ID, SSAP_PORT};
pub use ssap::pointer::PointerEvent;
pub use ssap::sequence::SequenceCounter;
pub use topic::{join_topic, normalize};
