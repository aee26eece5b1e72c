//! Command execution: carries a routed [`CommandAction`] out against the TV.
//!
//! This use case sits at the application layer and delegates all I/O to the
//! [`CommandSink`] trait.  The infrastructure layer implements the trait on
//! top of the real TV connection, the pointer socket, and the wake-on-LAN
//! sender; tests implement it with a recording double.
//!
//! The one piece of real logic here is the power-on sequence: the wake packet
//! is sent unconditionally, and the extra `turnOff` request is sent if — and
//! only if — no foreground application is currently known.  A TV that reports
//! a foreground app is in quick-start standby and wakes cleanly; a TV with no
//! foreground app is presumed fully off, and certain firmware then stays in a
//! half-on state after wake-on-LAN unless it additionally receives `turnOff`.
//! That is an empirically-derived workaround, not a clean protocol operation —
//! the conditional is preserved verbatim.

use async_trait::async_trait;
use serde_json::{json, Value};

use lgtv_core::ssap::messages::uris;
use lgtv_core::PointerEvent;

use crate::application::route_command::CommandAction;

/// The application layer's outbound seam towards the television.
///
/// Implemented by the infrastructure layer; every method is best-effort and
/// must not fail the caller — a send towards a disconnected TV is dropped by
/// the transport (logged, not escalated).
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Sends a one-shot SSAP request.
    async fn request(&self, uri: &str, payload: Option<Value>);

    /// Sends an event on the pointer-input socket (acquiring the socket first
    /// if needed; acquisition failure silently drops the event).
    async fn pointer(&self, event: PointerEvent);

    /// Sends the wake-on-LAN magic packet.
    async fn wake(&self);

    /// Schedules the delayed maximize pointer sequence (5000 ms after the
    /// open, 22 move events, click after another 1000 ms).
    async fn schedule_maximize(&self);
}

/// Executes one routed command.
///
/// `foreground_known` is the caller's snapshot of whether a foreground
/// application is currently known — it decides the power-on toggle.
pub async fn execute(action: CommandAction, sink: &dyn CommandSink, foreground_known: bool) {
    match action {
        CommandAction::Request { uri, payload } => sink.request(&uri, payload).await,

        CommandAction::Pointer(event) => sink.pointer(event).await,

        CommandAction::PowerOff => sink.request(uris::TURN_OFF, None).await,

        CommandAction::PowerOn => {
            sink.wake().await;
            // Full-off workaround: without a known foreground app the TV is
            // presumed completely off, and needs the extra turnOff request to
            // finish powering up after the wake packet.
            if !foreground_known {
                sink.request(uris::TURN_OFF, None).await;
            }
        }

        CommandAction::OpenMax { target } => {
            sink.request(uris::OPEN, Some(json!({ "target": target })))
                .await;
            sink.schedule_maximize().await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
