//! Application layer for lgtv-bridge.
//!
//! The application layer knows *what* the bridge does, but delegates *how*
//! to the infrastructure layer:
//!
//! - [`route_command`] — parse an inbound bus message into a [`CommandAction`]
//! - [`execute_command`] — carry an action out against the [`CommandSink`] seam
//! - [`publish_status`] — translate TV subscription payloads into bus topics
//! - [`publish_cache`] — suppress consecutive duplicate outbound publishes
//!
//! Everything except the `CommandSink` trait calls is pure and synchronous,
//! which is what makes the command table and the status translation fully
//! unit-testable without a broker or a TV.

pub mod execute_command;
pub mod publish_cache;
pub mod publish_status;
pub mod route_command;

pub use execute_command::{execute, CommandSink};
pub use publish_cache::PublishCache;
pub use route_command::{dispatch, CommandAction};
