//! Publish deduplication cache.
//!
//! All outbound status publishes are retained, so a bus peer that is
//! connected already holds the last value of every topic — re-sending an
//! identical value is pure noise.  The cache remembers the last payload
//! published per (normalized) topic and suppresses consecutive duplicates.
//!
//! The cache is deliberately volatile and is cleared *wholesale* on every
//! successful bus (re)connection: after a reconnect the broker's retained
//! state and the peers' views cannot be assumed to match what this process
//! last sent, so the first publish of every topic in a session always goes
//! out.

use std::collections::HashMap;

use lgtv_core::normalize;

/// Last-value memory gating outbound publishes.
///
/// Owned by the single bridge event-loop task; no locking needed.
#[derive(Debug, Default)]
pub struct PublishCache {
    seen: HashMap<String, String>,
}

impl PublishCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an attempted publish.
    ///
    /// Returns `true` when the payload differs from the last one recorded for
    /// the topic (the caller must perform the downstream publish), `false`
    /// when it is an exact repeat (the caller must suppress it).  The topic
    /// key is normalized, so `"lgtv/Status/Volume"` and `"lgtv/status/volume"`
    /// share one entry.
    pub fn attempt(&mut self, topic: &str, payload: &str) -> bool {
        let key = normalize(topic);
        if self.seen.get(&key).map(String::as_str) == Some(payload) {
            return false;
        }
        self.seen.insert(key, payload.to_string());
        true
    }

    /// Forgets everything.  Called once per successful bus (re)connection,
    /// before any publishes of that session.
    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
