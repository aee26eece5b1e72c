//! Thread-safe counter for SSAP request-id generation.
//!
//! Every frame sent on the main SSAP socket carries a client-chosen `id`;
//! the TV echoes it in the reply (or in every delivery, for subscriptions).
//! Ids therefore only need to be unique per connection — a monotonically
//! increasing counter rendered as `"<kind>_<n>"` (`request_0`, `subscribe_3`,
//! `register_0`) is what the TV's own SDK clients use, and keeping the kind
//! prefix makes wire logs self-describing.
//!
//! The counter uses `AtomicU64` internally, so the connection manager and any
//! task holding a handle can generate ids concurrently without a lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe, monotonically increasing counter for SSAP frame ids.
///
/// # Examples
///
/// ```rust
/// use lgtv_core::ssap::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next_id("request"), "request_0");
/// assert_eq!(counter.next_id("subscribe"), "subscribe_1");
/// ```
pub struct SequenceCounter {
    inner: AtomicU64,
}

impl SequenceCounter {
    /// Creates a new counter starting at 0.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Returns the next raw sequence number.
    ///
    /// Wraps around from `u64::MAX` to 0 without panicking.  `Relaxed`
    /// ordering suffices — the value is only used for id uniqueness, not for
    /// memory synchronization between threads.
    pub fn next(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the next frame id with a kind prefix, e.g. `"request_5"`.
    pub fn next_id(&self, kind: &str) -> String {
        format!("{kind}_{}", self.next())
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}
