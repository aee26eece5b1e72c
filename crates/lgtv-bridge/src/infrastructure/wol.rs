//! Wake-on-LAN magic packets.
//!
//! A magic packet is 6 bytes of `0xFF` followed by the target's 6-byte MAC
//! address repeated 16 times (102 bytes total), sent as a UDP broadcast.
//! The format is small and fixed, so it is built here directly rather than
//! pulling in a dependency for a single 102-byte buffer.
//!
//! The TV's network interface listens for this packet even while the rest of
//! the device sleeps; it is the only way to reach a TV whose SSAP socket is
//! down because the TV is off.

use std::io;

use thiserror::Error;
use tokio::net::UdpSocket;

/// UDP port conventionally used for wake-on-LAN ("discard").
const WOL_PORT: u16 = 9;

/// Errors that can occur while sending a wake packet.
#[derive(Debug, Error)]
pub enum WolError {
    /// The configured hardware address could not be parsed.
    #[error("invalid MAC address {0:?} (expected six hex octets, ':' or '-' separated)")]
    InvalidMac(String),

    /// Binding or sending on the UDP socket failed.
    #[error("wake-on-LAN send failed: {0}")]
    Io(#[from] io::Error),
}

/// Parses a MAC address of the form `"38:8C:50:AA:BB:CC"` (or with `-`
/// separators) into its six octets.
pub fn parse_mac(s: &str) -> Result<[u8; 6], WolError> {
    let octets: Vec<u8> = s
        .split(|c| c == ':' || c == '-')
        .map(|part| u8::from_str_radix(part, 16))
        .collect::<Result<_, _>>()
        .map_err(|_| WolError::InvalidMac(s.to_string()))?;

    octets
        .try_into()
        .map_err(|_| WolError::InvalidMac(s.to_string()))
}

/// Builds the 102-byte magic packet for `mac`.
pub fn magic_packet(mac: [u8; 6]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(6 + 16 * 6);
    packet.extend_from_slice(&[0xFF; 6]);
    for _ in 0..16 {
        packet.extend_from_slice(&mac);
    }
    packet
}

/// Sends a wake packet for `mac_str` to `broadcast_addr`.
///
/// # Errors
///
/// Returns [`WolError`] when the MAC is malformed or the UDP send fails.
/// The caller treats both as non-fatal — power-on continues with the
/// firmware toggle regardless, mirroring how the bridge has always behaved.
pub async fn send_wake(mac_str: &str, broadcast_addr: &str) -> Result<(), WolError> {
    let packet = magic_packet(parse_mac(mac_str)?);

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.set_broadcast(true)?;
    socket.send_to(&packet, (broadcast_addr, WOL_PORT)).await?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
