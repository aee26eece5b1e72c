//! The bridge event loop.
//!
//! One task owns all mutable bridge state and consumes both event streams
//! with `tokio::select!`:
//!
//! - MQTT events drive the command path: parse the topic, route it through
//!   the application-layer dispatch table, execute the action against the TV.
//! - TV events drive the status path: translate subscription payloads into
//!   status topics and publish them through the dedup cache.
//!
//! Because the dedup cache, the foreground-app field, the channel latch, and
//! the last-error field are only ever touched from this single task, no
//! locking discipline is needed around them.
//!
//! The two connections fail independently; neither side blocks on the other.
//! Timers (the delayed channel subscription and the maximize sequence) run as
//! spawned tasks with no cancellation — each one re-checks TV liveness before
//! acting and logs the skip at debug level when it finds a stale connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use lgtv_core::ssap::messages::uris;
use lgtv_core::ssap::pointer::{MAXIMIZE_MOVE, MAXIMIZE_MOVE_COUNT};
use lgtv_core::PointerEvent;

use crate::application::publish_status::{channel_status, foreground_status, volume_status};
use crate::application::{dispatch, execute, CommandSink, PublishCache};
use crate::domain::BridgeConfig;
use crate::infrastructure::mqtt_conn::{MqttEvent, MqttLink};
use crate::infrastructure::tv_conn::{self, TvEvent, TvHandle};
use crate::infrastructure::wol;

/// Delay before subscribing to the current channel once live TV is first seen
/// in the foreground.  Subscribing immediately races the tuner startup on
/// real hardware.
pub const CHANNEL_SUBSCRIBE_DELAY: Duration = Duration::from_millis(2500);

/// Delay between the `open` request and the maximize pointer sequence —
/// long enough for the opened content's player chrome to appear.
pub const OPEN_MAX_DELAY: Duration = Duration::from_millis(5000);

/// Delay between the maximize move burst and the final click.
pub const MAXIMIZE_CLICK_DELAY: Duration = Duration::from_millis(1000);

/// How often the loop checks the shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

// ── Bridge state ──────────────────────────────────────────────────────────────

/// Mutable state owned by the bridge loop task.
#[derive(Debug, Default)]
pub struct BridgeState {
    /// Last known TV connectivity, republished on every bus reconnect.
    tv_connected: bool,
    /// Last known foreground application id; `None` means no/unknown app
    /// (read by the power-on sequence to decide on the extra toggle).
    foreground_app: Option<String>,
    /// One-shot latch: has the current-channel subscription been armed for
    /// this TV connection?
    channels_subscribed: bool,
    /// Last logged TV error, for duplicate suppression.  Not
    /// correctness-affecting — it only throttles the log.
    last_error: Option<String>,
}

impl BridgeState {
    /// Creates the initial (all-disconnected) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a TV connect: clears error suppression and re-arms the
    /// channel-subscription latch for the new connection.
    pub fn on_tv_connected(&mut self) {
        self.tv_connected = true;
        self.last_error = None;
        self.channels_subscribed = false;
    }

    /// Applies a TV disconnect.
    pub fn on_tv_disconnected(&mut self) {
        self.tv_connected = false;
        self.last_error = None;
    }

    /// Applies a foreground-app delivery.
    ///
    /// Returns `true` exactly when the current-channel subscription should be
    /// armed now: the live-TV app is in front and the latch for this
    /// connection was still unset.  Repeated deliveries of the same app
    /// within one connection return `false`.
    pub fn on_foreground(&mut self, app: Option<String>, is_live_tv: bool) -> bool {
        self.foreground_app = app;
        if is_live_tv && !self.channels_subscribed {
            self.channels_subscribed = true;
            true
        } else {
            false
        }
    }

    /// `true` when this error differs from the previously logged one.
    /// Always records the error as the new suppression baseline.
    pub fn should_log_tv_error(&mut self, err: &str) -> bool {
        let log = self.last_error.as_deref() != Some(err);
        self.last_error = Some(err.to_string());
        log
    }

    /// `true` while a foreground application is known.
    pub fn foreground_known(&self) -> bool {
        self.foreground_app.is_some()
    }
}

// ── Command sink over the real TV connection ──────────────────────────────────

/// [`CommandSink`] implementation backed by the TV connection, the pointer
/// socket, and the wake-on-LAN sender.
pub struct TvCommandSink {
    tv: TvHandle,
    mac: Option<String>,
    broadcast_addr: String,
}

impl TvCommandSink {
    /// Builds the sink from the TV handle and the wake-on-LAN settings.
    pub fn new(tv: TvHandle, mac: Option<String>, broadcast_addr: String) -> Self {
        Self {
            tv,
            mac,
            broadcast_addr,
        }
    }
}

#[async_trait]
impl CommandSink for TvCommandSink {
    async fn request(&self, uri: &str, payload: Option<Value>) {
        match &payload {
            Some(params) => info!("lg > {uri}:{params}"),
            None => info!("lg > {uri}"),
        }
        self.tv.request(uri, payload).await;
    }

    async fn pointer(&self, event: PointerEvent) {
        if !self.tv.pointer_send(&event).await {
            debug!("pointer event dropped: {event:?}");
        }
    }

    async fn wake(&self) {
        match &self.mac {
            Some(mac) => match wol::send_wake(mac, &self.broadcast_addr).await {
                Ok(()) => info!("WOL: wake packet sent to {mac}"),
                // Power-on still proceeds with the firmware toggle; the
                // packet may also have been lost in transit, which a caller
                // could not distinguish anyway.
                Err(e) => warn!("WOL: {e}"),
            },
            None => warn!("power_on requested but no TV hardware address is configured"),
        }
    }

    async fn schedule_maximize(&self) {
        let tv = self.tv.clone();
        tokio::spawn(async move {
            tokio::time::sleep(OPEN_MAX_DELAY).await;
            if !tv.is_connected() {
                debug!("maximize sequence skipped (tv disconnected)");
                return;
            }
            for _ in 0..MAXIMIZE_MOVE_COUNT {
                tv.pointer_send_raw(MAXIMIZE_MOVE).await;
            }

            tokio::time::sleep(MAXIMIZE_CLICK_DELAY).await;
            if !tv.is_connected() {
                debug!("maximize click skipped (tv disconnected)");
                return;
            }
            tv.pointer_send(&PointerEvent::Click).await;
        });
    }
}

// ── The bridge loop ───────────────────────────────────────────────────────────

/// Everything the event loop needs in one place.
struct Bridge {
    config: BridgeConfig,
    mqtt: MqttLink,
    tv: TvHandle,
    sink: TvCommandSink,
    state: BridgeState,
    cache: PublishCache,
}

/// Runs the bridge until `running` is cleared or an event source ends.
///
/// # Errors
///
/// The loop itself does not fail — both connection managers recover on their
/// own — but the signature leaves room for fatal setup errors.
pub async fn run_bridge(config: BridgeConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let (mqtt, mut mqtt_events) = MqttLink::start(&config.mqtt);
    let (tv, mut tv_events) = tv_conn::start(config.tv.clone());

    let sink = TvCommandSink::new(
        tv.clone(),
        config.tv.mac.clone(),
        config.tv.broadcast_addr.clone(),
    );

    let mut bridge = Bridge {
        config,
        mqtt,
        tv,
        sink,
        state: BridgeState::new(),
        cache: PublishCache::new(),
    };

    let mut shutdown_tick = tokio::time::interval(SHUTDOWN_POLL);

    loop {
        tokio::select! {
            _ = shutdown_tick.tick() => {
                if !running.load(Ordering::Relaxed) {
                    info!("shutdown flag set; stopping bridge loop");
                    break;
                }
            }
            event = mqtt_events.recv() => match event {
                Some(event) => bridge.handle_mqtt_event(event).await,
                None => break,
            },
            event = tv_events.recv() => match event {
                Some(event) => bridge.handle_tv_event(event).await,
                None => break,
            },
        }
    }

    Ok(())
}

impl Bridge {
    /// Publishes through the dedup cache: unchanged payloads are suppressed.
    async fn publish_if_changed(&mut self, topic: &str, payload: &str) {
        if self.cache.attempt(topic, payload) {
            self.mqtt.publish(topic, payload).await;
        } else {
            debug!(" * not published (unchanged): [{topic}:{payload}]");
        }
    }

    async fn handle_mqtt_event(&mut self, event: MqttEvent) {
        match event {
            MqttEvent::Connected => {
                // A reconnected session starts from a clean slate: peers
                // cannot be assumed to hold our previous retained values.
                self.cache.reset();

                if let Some(topic) = self.config.mqtt.availability_topic() {
                    self.mqtt.publish(&topic, "1").await;
                }

                let connected_topic = format!("{}/connected", self.config.topic_prefix);
                let payload = if self.state.tv_connected { "1" } else { "0" };
                self.publish_if_changed(&connected_topic, payload).await;

                self.mqtt
                    .subscribe(&format!("{}/set/#", self.config.topic_prefix))
                    .await;
            }

            MqttEvent::Disconnected => {
                error!("mqtt disconnected");
            }

            MqttEvent::Message { topic, payload } => {
                info!("mqtt < {topic}:{payload}");
                if let Some(action) = dispatch(&self.config.topic_prefix, &topic, &payload) {
                    let foreground_known = self.state.foreground_known();
                    execute(action, &self.sink, foreground_known).await;
                }
            }
        }
    }

    async fn handle_tv_event(&mut self, event: TvEvent) {
        match event {
            TvEvent::Connected => {
                info!("tv connected");
                self.state.on_tv_connected();

                let connected_topic = format!("{}/connected", self.config.topic_prefix);
                self.publish_if_changed(&connected_topic, "1").await;

                // Standing subscriptions, re-established on every connect.
                self.tv.subscribe(uris::GET_VOLUME).await;
                self.tv.subscribe(uris::GET_FOREGROUND_APP).await;
                self.tv.subscribe(uris::GET_EXTERNAL_INPUT_LIST).await;
            }

            TvEvent::Disconnected => {
                self.state.on_tv_disconnected();
                let connected_topic = format!("{}/connected", self.config.topic_prefix);
                self.publish_if_changed(&connected_topic, "0").await;
            }

            TvEvent::Prompt => {
                info!("authorization required — confirm the pairing prompt on the TV");
            }

            TvEvent::Error(text) => {
                if self.state.should_log_tv_error(&text) {
                    error!("tv error: {text}");
                }
            }

            TvEvent::Subscription { uri, payload } => {
                self.handle_subscription(&uri, payload).await;
            }
        }
    }

    async fn handle_subscription(&mut self, uri: &str, payload: Value) {
        let prefix = self.config.topic_prefix.clone();

        match uri {
            uris::GET_VOLUME => {
                for update in volume_status(&prefix, &payload) {
                    self.publish_if_changed(&update.topic, &update.payload).await;
                }
            }

            uris::GET_FOREGROUND_APP => {
                let status = foreground_status(&prefix, &payload);
                self.publish_if_changed(&status.update.topic, &status.update.payload)
                    .await;

                if self.state.on_foreground(status.app, status.is_live_tv) {
                    // First live-TV sighting this connection: arm the delayed
                    // channel subscription.  The timer outlives this handler;
                    // it re-checks liveness before acting.
                    let tv = self.tv.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(CHANNEL_SUBSCRIBE_DELAY).await;
                        if !tv.is_connected() {
                            debug!("channel subscription skipped (tv disconnected)");
                            return;
                        }
                        tv.subscribe(uris::GET_CURRENT_CHANNEL).await;
                    });
                }
            }

            uris::GET_CURRENT_CHANNEL => {
                let update = channel_status(&prefix, &payload);
                self.publish_if_changed(&update.topic, &update.payload).await;
            }

            uris::GET_EXTERNAL_INPUT_LIST => {
                // Logged only; reserved for future use.
                info!("external input list: {payload}");
            }

            other => {
                debug!("unhandled subscription delivery from {other}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
