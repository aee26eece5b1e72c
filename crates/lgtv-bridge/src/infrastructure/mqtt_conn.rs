//! MQTT connection management.
//!
//! Owns one long-lived rumqttc client.  The event loop runs in its own Tokio
//! task and reports lifecycle transitions and inbound messages to the bridge
//! loop over an mpsc channel; reconnection is a plain retry-with-delay around
//! `EventLoop::poll`, which re-establishes the session transparently.
//!
//! # Last-will availability
//!
//! When a process name is configured, the broker is given a last-will of
//! `"0"` (retained) on the availability topic at connect time.  The bridge
//! publishes `"1"` on the same topic after every successful connect, so bus
//! peers observe `"1"` while the bridge is alive and `"0"` after an ungraceful
//! death — without the bridge having to do anything on the way down.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, LastWill, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::domain::MqttSettings;

/// Delay before re-polling after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// rumqttc request-queue capacity.
const CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the MQTT layer to the bridge loop.
#[derive(Debug)]
pub enum MqttEvent {
    /// The broker accepted the connection (initial or reconnect).
    Connected,
    /// The connection was lost; the poll loop keeps retrying.
    Disconnected,
    /// A message arrived on a subscribed topic.
    Message {
        /// Full topic the message was published on.
        topic: String,
        /// Payload decoded as UTF-8 (lossily — command payloads are text).
        payload: String,
    },
}

/// Handle for publishing and subscribing on the shared client.
///
/// Cheap to clone; all clones talk to the same broker connection.
#[derive(Clone)]
pub struct MqttLink {
    client: AsyncClient,
}

impl MqttLink {
    /// Builds the client, spawns the event-loop task, and returns the handle
    /// plus the receiver for [`MqttEvent`]s.
    ///
    /// No connection exists yet when this returns — the first
    /// [`MqttEvent::Connected`] signals that the session is up.
    pub fn start(settings: &MqttSettings) -> (Self, mpsc::Receiver<MqttEvent>) {
        let options = build_mqtt_options(settings);
        let (client, mut event_loop) = AsyncClient::new(options, CHANNEL_CAPACITY);
        let (tx, rx) = mpsc::channel(128);

        tokio::spawn(async move {
            // Tracks the session state so transitions are reported once, not
            // once per failed poll.
            let mut connected = false;

            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        if !connected {
                            connected = true;
                            info!("mqtt connected");
                            if tx.send(MqttEvent::Connected).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let event = MqttEvent::Message {
                            topic: publish.topic.clone(),
                            payload: String::from_utf8_lossy(&publish.payload).to_string(),
                        };
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("mqtt: {e}");
                        if connected {
                            connected = false;
                            if tx.send(MqttEvent::Disconnected).await.is_err() {
                                return;
                            }
                        }
                        if tx.is_closed() {
                            return;
                        }
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        (Self { client }, rx)
    }

    /// Publishes a retained, QoS-1 message.
    ///
    /// All outbound topics use retained at-least-once delivery so late
    /// subscribers immediately see the current state.  Failures are logged
    /// and swallowed — the dedup cache was already updated by the caller, and
    /// the reconnect/reset cycle re-sends current state anyway.
    pub async fn publish(&self, topic: &str, payload: &str) {
        debug!(" => published: [{topic}:{payload}]");
        if let Err(e) = self
            .client
            .publish(topic, QoS::AtLeastOnce, true, payload.as_bytes().to_vec())
            .await
        {
            error!("mqtt publish to {topic} failed: {e}");
        }
    }

    /// Subscribes to a topic filter at QoS 1.
    pub async fn subscribe(&self, filter: &str) {
        info!("mqtt subscribe {filter}");
        if let Err(e) = self.client.subscribe(filter, QoS::AtLeastOnce).await {
            error!("mqtt subscribe to {filter} failed: {e}");
        }
    }
}

/// Builds the rumqttc options from the bridge settings.
fn build_mqtt_options(settings: &MqttSettings) -> MqttOptions {
    let mut options = MqttOptions::new(
        settings.client_id.clone(),
        settings.host.clone(),
        settings.port,
    );
    options.set_keep_alive(Duration::from_secs(30));

    if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
        options.set_credentials(user.clone(), pass.clone());
    }

    if let Some(topic) = settings.availability_topic() {
        options.set_last_will(LastWill::new(
            topic,
            "0".as_bytes().to_vec(),
            QoS::AtLeastOnce,
            true,
        ));
    }

    options
}

// ── Tests ─────────────────────────────────────────────────────────────────────
