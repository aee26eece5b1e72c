//! Bus topic model: segment normalization and topic joining.
//!
//! MQTT topics are `/`-delimited strings, but the names that end up inside
//! them come from arbitrary sources (configuration, device names, app ids).
//! To keep the published topic space predictable, every topic string passes
//! through [`normalize`] before it is used as a publish target or as a
//! dedup-cache key.
//!
//! The policy, in order:
//!
//! 1. A fixed set of punctuation characters is stripped entirely.
//! 2. Whitespace runs and `-` become `_`.
//! 3. Everything is lowercased.
//! 4. Doubled `_` collapse to a single `_`.
//! 5. Leading/trailing separators (`/` and `_`) are trimmed.
//!
//! The `/` topic-level separator itself is preserved, so [`normalize`] can be
//! applied to a full topic ("lgtv/status/volume") as well as to a single
//! segment.

/// Characters removed entirely during normalization.
const STRIPPED: &[char] = &['+', '\\', '&', '*', '%', '$', '#', '@', '!', '’'];

/// Canonicalizes a topic string or topic segment.
///
/// Deterministic, pure, and total: any input string produces a string output,
/// and the function is idempotent (`normalize(normalize(s)) == normalize(s)`).
///
/// # Examples
///
/// ```rust
/// use lgtv_core::topic::normalize;
///
/// assert_eq!(normalize("Living Room TV"), "living_room_tv");
/// assert_eq!(normalize("/status/lgtv2mqtt"), "status/lgtv2mqtt");
/// assert_eq!(normalize("What's--On!"), "what's_on");
/// ```
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for c in s.trim().chars() {
        if STRIPPED.contains(&c) {
            continue;
        }
        if c.is_whitespace() || c == '-' {
            out.push('_');
            continue;
        }
        for lower in c.to_lowercase() {
            out.push(lower);
        }
    }

    // Collapse doubled underscores.  A single replace pass can itself create
    // new pairs ("___" -> "__"), so loop until stable.
    while out.contains("__") {
        out = out.replace("__", "_");
    }

    out.trim_matches(|c| c == '/' || c == '_').to_string()
}

/// Joins topic segments with `/`, normalizing each segment first.
///
/// # Examples
///
/// ```rust
/// use lgtv_core::topic::join_topic;
///
/// assert_eq!(join_topic(["lgtv", "status", "Foreground App"]), "lgtv/status/foreground_app");
/// ```
pub fn join_topic<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| normalize(s.as_ref()))
        .collect::<Vec<_>>()
        .join("/")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
