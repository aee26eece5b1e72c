//! SSAP — the LG webOS remote-control protocol.
//!
//! SSAP runs over a persistent WebSocket to port 3000 on the television.
//! Every client→TV frame is a JSON object with a `type` discriminant
//! (`register`, `request`, `subscribe`) and a client-chosen `id`; the TV
//! answers with `registered`/`response`/`error` frames carrying the same `id`,
//! which is how replies and subscription deliveries are correlated.
//!
//! Commands are addressed by hierarchical URIs such as
//! `ssap://audio/setVolume` or `ssap://system.launcher/launch`, with optional
//! JSON parameters in the `payload` field.
//!
//! Cursor and button input does not travel on the main socket: the client
//! first requests `ssap://com.webos.service.networkinput/getPointerInputSocket`
//! and receives the URL of a secondary WebSocket that accepts a line-oriented
//! text format (see [`pointer`]).

pub mod codec;
pub mod messages;
pub mod pointer;
pub mod sequence;

pub use codec::{decode_frame, encode_frame, SsapError};
pub use messages::{ClientMessage, TvMessage};
pub use pointer::PointerEvent;
pub use sequence::SequenceCounter;
