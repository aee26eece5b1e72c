//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! It is constructed once at startup from CLI arguments / environment
//! variables (see `main.rs`) and then shared by reference with both
//! connection managers.  Keeping it as a plain struct — no global state, no
//! environment reads inside the domain — makes the bridge easy to drive from
//! tests.

use std::path::PathBuf;
use std::time::Duration;

use lgtv_core::{join_topic, SSAP_PORT};

/// All runtime configuration for the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Bus-side settings.
    pub mqtt: MqttSettings,
    /// TV-side settings.
    pub tv: TvSettings,
    /// Root segment of every bus topic this bridge reads or writes
    /// (`<prefix>/set/#` inbound, `<prefix>/status/...` and
    /// `<prefix>/connected` outbound).
    pub topic_prefix: String,
}

/// Settings for the MQTT broker connection.
#[derive(Debug, Clone)]
pub struct MqttSettings {
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Optional username; credentials are only sent when both username and
    /// password are configured.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Optional process name for the availability topic.  When set, the
    /// bridge publishes `status/<name>` `"1"` retained on every connect and
    /// registers a last-will of `"0"` on the same topic, so bus peers can
    /// tell whether the bridge process itself is alive — independently of
    /// whether the TV is reachable.
    pub availability_name: Option<String>,
}

impl MqttSettings {
    /// The availability (last-will) topic for this process, if a name is
    /// configured.
    pub fn availability_topic(&self) -> Option<String> {
        self.availability_name
            .as_deref()
            .map(|name| join_topic(["status", name]))
    }
}

/// Settings for the television connection.
#[derive(Debug, Clone)]
pub struct TvSettings {
    /// TV hostname or IP address.
    pub host: String,
    /// Hardware (MAC) address for wake-on-LAN, e.g. `"38:8C:50:AA:BB:CC"`.
    /// Power-on is degraded to a warning when absent.
    pub mac: Option<String>,
    /// Broadcast address the wake packet is sent to.
    pub broadcast_addr: String,
    /// Directory holding the persisted pairing client-key file.
    pub key_dir: PathBuf,
    /// Delay between reconnect attempts.
    pub reconnect_interval: Duration,
}

impl TvSettings {
    /// The SSAP WebSocket URL of the TV's main control socket.
    pub fn websocket_url(&self) -> String {
        format!("ws://{}:{}", self.host, SSAP_PORT)
    }

    /// Path of the pairing client-key file for this TV.
    ///
    /// One file per TV host, so several bridges can share a key directory.
    pub fn key_file(&self) -> PathBuf {
        self.key_dir.join(format!("keyfile-{}", self.host))
    }
}

impl Default for BridgeConfig {
    /// Defaults suitable for tests and local experiments.  Production values
    /// come from CLI arguments / environment variables in `main.rs`.
    fn default() -> Self {
        Self {
            mqtt: MqttSettings {
                host: "localhost".to_string(),
                port: 1883,
                username: None,
                password: None,
                client_id: "lgtv2mqtt".to_string(),
                availability_name: None,
            },
            tv: TvSettings {
                host: "localhost".to_string(),
                mac: None,
                broadcast_addr: "255.255.255.255".to_string(),
                key_dir: PathBuf::from("/usr/node_app/lgkey/"),
                reconnect_interval: Duration::from_millis(1000),
            },
            topic_prefix: "lgtv".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url_uses_ssap_port() {
        // Arrange
        let config = BridgeConfig::default();

        // Act / Assert
        assert_eq!(config.tv.websocket_url(), "ws://localhost:3000");
    }

    #[test]
    fn test_key_file_is_per_host() {
        let mut config = BridgeConfig::default();
        config.tv.host = "10.1.2.3".to_string();
        assert_eq!(
            config.tv.key_file(),
            PathBuf::from("/usr/node_app/lgkey/keyfile-10.1.2.3")
        );
    }

    #[test]
    fn test_availability_topic_absent_without_name() {
        let config = BridgeConfig::default();
        assert!(config.mqtt.availability_topic().is_none());
    }

    #[test]
    fn test_availability_topic_is_normalized() {
        let mut config = BridgeConfig::default();
        config.mqtt.availability_name = Some("Living Room Bridge".to_string());
        assert_eq!(
            config.mqtt.availability_topic().as_deref(),
            Some("status/living_room_bridge")
        );
    }

    #[test]
    fn test_default_reconnect_interval_is_one_second() {
        // Mirrors the TV library default the bridge was tuned against.
        let config = BridgeConfig::default();
        assert_eq!(config.tv.reconnect_interval, Duration::from_millis(1000));
    }
}
