//! lgtv-bridge — entry point.
//!
//! This binary connects an MQTT broker to an LG webOS television.  Bus
//! clients publish control messages on `<prefix>/set/...` topics; the bridge
//! translates each into an SSAP remote-control request over the TV's
//! WebSocket.  TV state changes flow back as retained `<prefix>/status/...`
//! topics, and `<prefix>/connected` mirrors the TV's reachability.
//!
//! # Usage
//!
//! ```text
//! lgtv-bridge [OPTIONS]
//!
//! Options:
//!   --mqtt-host <HOST>        MQTT broker hostname [env: MQTT_HOST]
//!   --mqtt-port <PORT>        MQTT broker port [env: MQTT_PORT] [default: 1883]
//!   --mqtt-user <USER>        MQTT username [env: MQTT_USER]
//!   --mqtt-pass <PASS>        MQTT password [env: MQTT_PASS]
//!   --mqtt-client-id <ID>     MQTT client id [env: MQTT_CLIENT_ID] [default: lgtv2mqtt]
//!   --mqtt-name <NAME>        availability-topic name [env: MQTT_NAME]
//!   --topic-prefix <PREFIX>   root of the bridge's topic space [env: TOPIC_PREFIX]
//!   --tv-host <HOST>          TV hostname or IP [env: TV_IP]
//!   --tv-mac <MAC>            TV hardware address for wake-on-LAN [env: TV_MAC]
//!   --broadcast-ip <ADDR>     wake-on-LAN broadcast address [env: BROADCAST_IP]
//!   --key-dir <DIR>           pairing-key directory [env: CLIENT_KEY_PATH]
//! ```
//!
//! `--mqtt-host`, `--topic-prefix`, and `--tv-host` are required: a bridge
//! without a broker, a topic space, or a TV has nothing to retry against, so
//! a missing value is an operator configuration error and terminates startup
//! immediately (clap prints the usage error and exits non-zero).
//!
//! The log level is controlled by `RUST_LOG` (e.g. `RUST_LOG=debug`).

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lgtv_bridge::domain::{BridgeConfig, MqttSettings, TvSettings};
use lgtv_bridge::infrastructure::run_bridge;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// MQTT to LG webOS TV bridge.
///
/// Every option can also come from the environment variable named in its
/// `env` attribute; CLI arguments take precedence when both are present.
#[derive(Debug, Parser)]
#[command(
    name = "lgtv-bridge",
    about = "Bridges MQTT bus topics to an LG webOS television's remote-control protocol",
    version
)]
struct Cli {
    /// MQTT broker hostname or IP address.
    #[arg(long, env = "MQTT_HOST")]
    mqtt_host: String,

    /// MQTT broker port.
    #[arg(long, default_value_t = 1883, env = "MQTT_PORT")]
    mqtt_port: u16,

    /// MQTT username (credentials are sent only when both user and pass are set).
    #[arg(long, env = "MQTT_USER")]
    mqtt_user: Option<String>,

    /// MQTT password.
    #[arg(long, env = "MQTT_PASS")]
    mqtt_pass: Option<String>,

    /// Client identifier presented to the broker.
    #[arg(long, default_value = "lgtv2mqtt", env = "MQTT_CLIENT_ID")]
    mqtt_client_id: String,

    /// Process name for the availability topic (`status/<name>`).
    ///
    /// When set, `status/<name>` carries `"1"` while the bridge is connected
    /// and flips to `"0"` through the broker's last-will mechanism when the
    /// bridge dies ungracefully.
    #[arg(long, env = "MQTT_NAME")]
    mqtt_name: Option<String>,

    /// Root segment of the bridge's topic space (`<prefix>/set/#` inbound,
    /// `<prefix>/status/...` outbound).
    #[arg(long, env = "TOPIC_PREFIX")]
    topic_prefix: String,

    /// TV hostname or IP address (SSAP WebSocket, port 3000).
    #[arg(long, env = "TV_IP")]
    tv_host: String,

    /// TV hardware (MAC) address for wake-on-LAN, e.g. `38:8C:50:AA:BB:CC`.
    ///
    /// Without it, `set/power` with a truthy payload logs a warning instead
    /// of waking the TV.
    #[arg(long, env = "TV_MAC")]
    tv_mac: Option<String>,

    /// Broadcast address the wake packet is sent to.
    #[arg(long, default_value = "255.255.255.255", env = "BROADCAST_IP")]
    broadcast_ip: String,

    /// Directory holding the persisted pairing client-key file.
    #[arg(long, default_value = "/usr/node_app/lgkey/", env = "CLIENT_KEY_PATH")]
    key_dir: PathBuf,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`BridgeConfig`].
    fn into_bridge_config(self) -> BridgeConfig {
        BridgeConfig {
            mqtt: MqttSettings {
                host: self.mqtt_host,
                port: self.mqtt_port,
                username: self.mqtt_user,
                password: self.mqtt_pass,
                client_id: self.mqtt_client_id,
                availability_name: self.mqtt_name,
            },
            tv: TvSettings {
                host: self.tv_host,
                mac: self.tv_mac,
                broadcast_addr: self.broadcast_ip,
                key_dir: self.key_dir,
                reconnect_interval: Duration::from_millis(1000),
            },
            topic_prefix: self.topic_prefix,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `EnvFilter::try_from_default_env()` reads the `RUST_LOG` environment
    // variable; absent or invalid values fall back to `info` level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing required arguments (broker host, topic prefix, TV host) exit
    // here with a usage error — the fatal-startup path.
    let cli = Cli::parse();
    let config = cli.into_bridge_config();

    info!(
        "lgtv-bridge {} starting — mqtt={}:{}, tv={}, prefix={}",
        env!("CARGO_PKG_VERSION"),
        config.mqtt.host,
        config.mqtt.port,
        config.tv.host,
        config.topic_prefix
    );

    // Graceful shutdown flag, cleared by Ctrl+C.  The bridge loop checks it
    // every 200 ms and exits cleanly.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_bridge(config, running).await?;

    info!("lgtv-bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// The minimum argument set: the three required values.
    fn required_args() -> Vec<&'static str> {
        vec![
            "lgtv-bridge",
            "--mqtt-host",
            "broker.local",
            "--topic-prefix",
            "lgtv",
            "--tv-host",
            "10.0.0.2",
        ]
    }

    #[test]
    fn test_cli_requires_mqtt_host() {
        // Missing broker host must be a startup error, not a default.
        let result = Cli::try_parse_from([
            "lgtv-bridge",
            "--topic-prefix",
            "lgtv",
            "--tv-host",
            "10.0.0.2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_topic_prefix() {
        let result = Cli::try_parse_from([
            "lgtv-bridge",
            "--mqtt-host",
            "broker.local",
            "--tv-host",
            "10.0.0.2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_tv_host() {
        let result = Cli::try_parse_from([
            "lgtv-bridge",
            "--mqtt-host",
            "broker.local",
            "--topic-prefix",
            "lgtv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_default_mqtt_port() {
        let cli = Cli::parse_from(required_args());
        assert_eq!(cli.mqtt_port, 1883);
    }

    #[test]
    fn test_cli_default_client_id() {
        let cli = Cli::parse_from(required_args());
        assert_eq!(cli.mqtt_client_id, "lgtv2mqtt");
    }

    #[test]
    fn test_cli_default_broadcast_ip() {
        let cli = Cli::parse_from(required_args());
        assert_eq!(cli.broadcast_ip, "255.255.255.255");
    }

    #[test]
    fn test_cli_default_key_dir() {
        let cli = Cli::parse_from(required_args());
        assert_eq!(cli.key_dir, PathBuf::from("/usr/node_app/lgkey/"));
    }

    #[test]
    fn test_cli_mqtt_port_override() {
        let mut args = required_args();
        args.extend(["--mqtt-port", "8883"]);
        let cli = Cli::parse_from(args);
        assert_eq!(cli.mqtt_port, 8883);
    }

    #[test]
    fn test_into_bridge_config_maps_all_fields() {
        // Arrange
        let mut args = required_args();
        args.extend([
            "--mqtt-user",
            "user",
            "--mqtt-pass",
            "secret",
            "--mqtt-name",
            "lgtv bridge",
            "--tv-mac",
            "38:8C:50:AA:BB:CC",
            "--broadcast-ip",
            "192.168.1.255",
            "--key-dir",
            "/tmp/lgkey",
        ]);
        let cli = Cli::parse_from(args);

        // Act
        let config = cli.into_bridge_config();

        // Assert
        assert_eq!(config.mqtt.host, "broker.local");
        assert_eq!(config.mqtt.username.as_deref(), Some("user"));
        assert_eq!(config.mqtt.password.as_deref(), Some("secret"));
        assert_eq!(
            config.mqtt.availability_topic().as_deref(),
            Some("status/lgtv_bridge")
        );
        assert_eq!(config.topic_prefix, "lgtv");
        assert_eq!(config.tv.host, "10.0.0.2");
        assert_eq!(config.tv.mac.as_deref(), Some("38:8C:50:AA:BB:CC"));
        assert_eq!(config.tv.broadcast_addr, "192.168.1.255");
        assert_eq!(config.tv.key_dir, PathBuf::from("/tmp/lgkey"));
        assert_eq!(config.tv.websocket_url(), "ws://10.0.0.2:3000");
    }
}
