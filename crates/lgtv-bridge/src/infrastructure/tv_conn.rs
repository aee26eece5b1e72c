//! SSAP WebSocket connection management for the television.
//!
//! Architecture mirrors the bus side: one Tokio task owns the reconnect loop
//! and the read half of the socket, and reports lifecycle transitions and
//! subscription deliveries to the bridge loop over an mpsc channel.  The
//! write half lives behind a shared `Option` — while the TV is disconnected
//! the `Option` is `None` and every send is dropped with a debug log.  The
//! bridge never queues commands for an absent TV: the TV's own displayed
//! state already determines whether a command was meaningful, so replaying
//! stale ones after a reconnect would do more harm than good.
//!
//! # Pairing
//!
//! Every session starts with a `register` frame.  With a persisted client
//! key the TV re-authorizes silently; without one it shows an on-screen
//! prompt (surfaced as [`TvEvent::Prompt`]) until the user confirms, then
//! answers `registered` with a fresh key that is stored for next time.
//!
//! # Request/response correlation
//!
//! SSAP replies carry the id of the originating frame.  One-shot requests
//! that need their reply park a oneshot sender in a pending map; subscription
//! ids are remembered for the life of the connection and every delivery with
//! such an id becomes a [`TvEvent::Subscription`].  Pending and subscription
//! state is per-connection and cleared on disconnect — parked callers see the
//! dropped sender as an error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use anyhow::{anyhow, Context};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::{
    connect_async,
    tungstenite::Message as WsMessage,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use lgtv_core::ssap::messages::{is_pairing_prompt, register_payload, uris};
use lgtv_core::{decode_frame, encode_frame, ClientMessage, PointerEvent, SequenceCounter, TvMessage};

use crate::domain::TvSettings;
use crate::infrastructure::key_store;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// How long a reply-carrying request waits before giving up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Events emitted by the TV layer to the bridge loop.
#[derive(Debug)]
pub enum TvEvent {
    /// Registration completed; the control channel is usable.
    Connected,
    /// The socket closed after a registered session; the loop reconnects.
    Disconnected,
    /// The TV is showing the pairing dialog and waits for the user.
    Prompt,
    /// A standing subscription delivered a payload.
    Subscription {
        /// The subscribed endpoint URI.
        uri: String,
        /// The delivery payload.
        payload: Value,
    },
    /// A transport or protocol error.  Connect failures repeat once per
    /// reconnect attempt; the bridge loop suppresses duplicate log lines.
    Error(String),
}

/// Shared state between the connection task and the command handles.
struct TvShared {
    settings: TvSettings,
    /// Write half of the main socket; `None` while disconnected.
    sink: Mutex<Option<WsSink>>,
    /// Parked reply-carrying requests, by frame id.
    pending: StdMutex<HashMap<String, oneshot::Sender<Value>>>,
    /// Standing subscriptions, frame id → endpoint URI.
    subscriptions: StdMutex<HashMap<String, String>>,
    /// Cached pointer-input socket, acquired on first use per connection.
    pointer: Mutex<Option<PointerHandle>>,
    /// Frame-id generator, shared by all handles.
    seq: SequenceCounter,
    /// `true` between registration and socket close.
    connected: AtomicBool,
}

/// Handle for sending commands to the television.
///
/// Cheap to clone; all clones share one connection.  Every send is
/// best-effort: while the TV is disconnected, frames are dropped with a
/// debug log instead of queued.
#[derive(Clone)]
pub struct TvHandle {
    shared: Arc<TvShared>,
}

/// Spawns the TV reconnect loop and returns the command handle plus the
/// receiver for [`TvEvent`]s.
pub fn start(settings: TvSettings) -> (TvHandle, mpsc::Receiver<TvEvent>) {
    let shared = Arc::new(TvShared {
        settings,
        sink: Mutex::new(None),
        pending: StdMutex::new(HashMap::new()),
        subscriptions: StdMutex::new(HashMap::new()),
        pointer: Mutex::new(None),
        seq: SequenceCounter::new(),
        connected: AtomicBool::new(false),
    });
    let (tx, rx) = mpsc::channel(128);

    let loop_shared = Arc::clone(&shared);
    tokio::spawn(async move {
        let url = loop_shared.settings.websocket_url();
        loop {
            info!("tv trying to connect {url}");
            match connect_async(url.as_str()).await {
                Ok((ws, _)) => {
                    let was_registered = run_session(&loop_shared, ws, &tx).await;

                    // Per-connection state dies with the socket.  Dropping the
                    // pending senders wakes parked request_with_reply callers
                    // with an error.
                    loop_shared.connected.store(false, Ordering::Relaxed);
                    *loop_shared.sink.lock().await = None;
                    loop_shared.pending.lock().unwrap().clear();
                    loop_shared.subscriptions.lock().unwrap().clear();
                    *loop_shared.pointer.lock().await = None;

                    if was_registered {
                        info!("tv disconnected");
                        if tx.send(TvEvent::Disconnected).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    if tx.send(TvEvent::Error(e.to_string())).await.is_err() {
                        return;
                    }
                }
            }

            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(loop_shared.settings.reconnect_interval).await;
        }
    });

    (TvHandle { shared }, rx)
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Drives one socket session: register handshake, then the read loop.
///
/// Returns `true` when the session reached the registered state.
async fn run_session(
    shared: &Arc<TvShared>,
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    tx: &mpsc::Sender<TvEvent>,
) -> bool {
    let (sink, stream) = ws.split();
    *shared.sink.lock().await = Some(sink);

    // Register with the persisted client key when one exists; the TV answers
    // `registered` directly, or shows the pairing prompt first.
    let client_key = key_store::load(&shared.settings.key_file());
    let register_id = shared.seq.next_id("register");
    let register = ClientMessage::Register {
        id: register_id.clone(),
        payload: register_payload(client_key.as_deref()),
    };
    if !send_frame(shared, &register).await {
        return false;
    }

    read_loop(shared, stream, &register_id, tx).await;
    shared.connected.load(Ordering::Relaxed)
}

/// Consumes frames from the main socket until it closes.
async fn read_loop(
    shared: &Arc<TvShared>,
    mut stream: WsStream,
    register_id: &str,
    tx: &mpsc::Sender<TvEvent>,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                if handle_frame(shared, register_id, &text, tx).await.is_err() {
                    // Bridge loop is gone; tear the session down.
                    return;
                }
            }
            Ok(WsMessage::Close(_)) => {
                debug!("tv sent Close frame");
                return;
            }
            // Protocol-level ping/pong is handled by tungstenite; binary and
            // raw frames do not occur on the SSAP socket.
            Ok(_) => {}
            Err(e) => {
                let _ = tx.send(TvEvent::Error(e.to_string())).await;
                return;
            }
        }
    }
}

/// Routes one decoded frame.  Errors only when the event channel is closed.
async fn handle_frame(
    shared: &Arc<TvShared>,
    register_id: &str,
    text: &str,
    tx: &mpsc::Sender<TvEvent>,
) -> Result<(), ()> {
    let message = match decode_frame(text) {
        Ok(message) => message,
        Err(e) => {
            // Some firmware sends informational frames (e.g. a hello banner)
            // that are not part of the request/response protocol.
            debug!("ignoring unrecognized tv frame: {e}");
            return Ok(());
        }
    };

    match message {
        TvMessage::Registered { payload, .. } => {
            if let Some(key) = payload.get("client-key").and_then(Value::as_str) {
                let path = shared.settings.key_file();
                if let Err(e) = key_store::store(&path, key) {
                    // Non-fatal: the user just sees the prompt again next time.
                    warn!("could not persist client key: {e}");
                }
            }
            shared.connected.store(true, Ordering::Relaxed);
            tx.send(TvEvent::Connected).await.map_err(|_| ())
        }

        TvMessage::Response { id, payload } => {
            if id == register_id && is_pairing_prompt(&payload) {
                return tx.send(TvEvent::Prompt).await.map_err(|_| ());
            }
            let pending = shared.pending.lock().unwrap().remove(&id);
            if let Some(sender) = pending {
                // The parked caller may have timed out; a dead receiver is fine.
                let _ = sender.send(payload);
                return Ok(());
            }
            let uri = shared.subscriptions.lock().unwrap().get(&id).cloned();
            if let Some(uri) = uri {
                return tx
                    .send(TvEvent::Subscription { uri, payload })
                    .await
                    .map_err(|_| ());
            }
            debug!("unmatched tv response id {id}");
            Ok(())
        }

        TvMessage::Error { id, error, .. } => {
            if let Some(id) = &id {
                // Dropping the sender fails the parked caller.
                shared.pending.lock().unwrap().remove(id);
            }
            let text = error.unwrap_or_else(|| "unknown tv error".to_string());
            tx.send(TvEvent::Error(text)).await.map_err(|_| ())
        }
    }
}

/// Encodes and sends one frame on the main socket.
///
/// Returns `false` when the frame was dropped (disconnected or send failure).
async fn send_frame(shared: &TvShared, message: &ClientMessage) -> bool {
    let text = match encode_frame(message) {
        Ok(text) => text,
        Err(e) => {
            warn!("could not encode tv frame: {e}");
            return false;
        }
    };

    let mut guard = shared.sink.lock().await;
    match guard.as_mut() {
        Some(sink) => match sink.send(WsMessage::Text(text)).await {
            Ok(()) => true,
            Err(e) => {
                warn!("tv send failed: {e}");
                false
            }
        },
        None => {
            debug!("tv send skipped (not connected): {}", message.id());
            false
        }
    }
}

// ── Command handle ────────────────────────────────────────────────────────────

impl TvHandle {
    /// `true` between registration and socket close.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Relaxed)
    }

    /// Sends a one-shot request without waiting for the reply.
    ///
    /// This is the normal command path — the TV's observable state is the
    /// acknowledgement.  Dropped silently while disconnected.
    pub async fn request(&self, uri: &str, payload: Option<Value>) {
        let message = ClientMessage::Request {
            id: self.shared.seq.next_id("request"),
            uri: uri.to_string(),
            payload,
        };
        send_frame(&self.shared, &message).await;
    }

    /// Sends a request and waits for its reply payload.
    ///
    /// # Errors
    ///
    /// Fails when the TV is disconnected, the reply does not arrive within
    /// [`REQUEST_TIMEOUT`], or the connection drops while waiting.
    pub async fn request_with_reply(&self, uri: &str, payload: Option<Value>) -> anyhow::Result<Value> {
        let id = self.shared.seq.next_id("request");
        let (sender, receiver) = oneshot::channel();
        self.shared
            .pending
            .lock()
            .unwrap()
            .insert(id.clone(), sender);

        let message = ClientMessage::Request {
            id: id.clone(),
            uri: uri.to_string(),
            payload,
        };
        if !send_frame(&self.shared, &message).await {
            self.shared.pending.lock().unwrap().remove(&id);
            return Err(anyhow!("tv not connected"));
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, receiver).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(_)) => Err(anyhow!("tv connection lost while waiting for {uri}")),
            Err(_) => {
                self.shared.pending.lock().unwrap().remove(&id);
                Err(anyhow!("timed out waiting for {uri}"))
            }
        }
    }

    /// Establishes a standing subscription.  Deliveries surface as
    /// [`TvEvent::Subscription`] events carrying `uri`.
    pub async fn subscribe(&self, uri: &str) {
        let id = self.shared.seq.next_id("subscribe");
        self.shared
            .subscriptions
            .lock()
            .unwrap()
            .insert(id.clone(), uri.to_string());

        let message = ClientMessage::Subscribe {
            id,
            uri: uri.to_string(),
            payload: None,
        };
        if !send_frame(&self.shared, &message).await {
            debug!("subscription to {uri} not sent (not connected)");
        }
    }

    /// Sends an event on the pointer-input socket, acquiring (and caching)
    /// the socket first if needed.
    ///
    /// Returns `false` when the event was dropped — no pointer channel could
    /// be obtained, or the send failed.  Failures are logged, not escalated.
    pub async fn pointer_send(&self, event: &PointerEvent) -> bool {
        self.pointer_send_raw(&event.encode()).await
    }

    /// Sends pre-encoded pointer-socket text (used by the maximize sequence,
    /// whose move command is a preserved verbatim constant).
    pub async fn pointer_send_raw(&self, text: &str) -> bool {
        let handle = {
            let mut guard = self.shared.pointer.lock().await;
            match guard.as_ref() {
                Some(handle) => handle.clone(),
                None => match self.acquire_pointer().await {
                    Ok(handle) => {
                        *guard = Some(handle.clone());
                        handle
                    }
                    Err(e) => {
                        warn!("could not obtain pointer socket: {e}");
                        return false;
                    }
                },
            }
        };

        if handle.send_raw(text).await {
            true
        } else {
            // A dead pointer socket is re-acquired on the next event.
            *self.shared.pointer.lock().await = None;
            false
        }
    }

    /// Performs the pointer-socket acquisition handshake: ask the TV for a
    /// socket path, then open a second WebSocket to it.
    async fn acquire_pointer(&self) -> anyhow::Result<PointerHandle> {
        let reply = self
            .request_with_reply(uris::GET_POINTER_INPUT_SOCKET, None)
            .await?;
        let path = reply
            .get("socketPath")
            .and_then(Value::as_str)
            .context("pointer socket reply carried no socketPath")?;

        let (ws, _) = connect_async(path)
            .await
            .with_context(|| format!("failed to open pointer socket at {path}"))?;
        let (sink, mut stream) = ws.split();

        // The pointer socket never sends application data; drain it so
        // protocol-level frames are processed until the TV closes it.
        tokio::spawn(async move { while let Some(Ok(_)) = stream.next().await {} });

        debug!("pointer socket established");
        Ok(PointerHandle {
            sink: Arc::new(Mutex::new(sink)),
        })
    }
}

/// Write handle for the secondary pointer-input socket.
#[derive(Clone)]
pub struct PointerHandle {
    sink: Arc<Mutex<WsSink>>,
}

impl PointerHandle {
    /// Sends raw pointer-socket text.  Returns `false` on failure.
    pub async fn send_raw(&self, text: &str) -> bool {
        match self
            .sink
            .lock()
            .await
            .send(WsMessage::Text(text.to_string()))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!("pointer send failed: {e}");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
