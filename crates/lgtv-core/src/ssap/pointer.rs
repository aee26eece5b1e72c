//! Wire format for the pointer-input socket.
//!
//! Cursor and button events do not travel on the main SSAP socket.  The
//! client requests `ssap://com.webos.service.networkinput/getPointerInputSocket`
//! and connects to the returned `socketPath` URL; that secondary WebSocket
//! accepts a line-oriented *text* format instead of JSON:
//!
//! ```text
//! move\n
//! dx:5\n
//! dy:-3\n
//! drag:0\n
//! \n
//! ```
//!
//! i.e. the event type on the first line, one `key:value` pair per following
//! line, terminated by a blank line.  There are no replies on this socket.

/// A single event for the pointer-input socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerEvent {
    /// Relative cursor movement.  `drag` marks a movement with the button
    /// held down (drag gesture) — the event type on the wire is `move` for
    /// both plain moves and drags.
    Move { dx: i32, dy: i32, drag: bool },
    /// Wheel scroll by relative deltas.
    Scroll { dx: i32, dy: i32 },
    /// Press-and-release at the current cursor position.
    Click,
    /// A named remote-control button.
    ///
    /// Names known to work: MUTE, RED, GREEN, YELLOW, BLUE, HOME, MENU,
    /// VOLUMEUP, VOLUMEDOWN, CC, BACK, UP, DOWN, LEFT, ENTER, DASH, 0-9,
    /// EXIT, CHANNELUP, CHANNELDOWN.
    Button { name: String },
}

impl PointerEvent {
    /// Encodes this event in the pointer-socket text format.
    pub fn encode(&self) -> String {
        match self {
            PointerEvent::Move { dx, dy, drag } => {
                format!("move\ndx:{dx}\ndy:{dy}\ndrag:{}\n\n", u8::from(*drag))
            }
            PointerEvent::Scroll { dx, dy } => format!("scroll\ndx:{dx}\ndy:{dy}\n\n"),
            PointerEvent::Click => "click\n\n".to_string(),
            PointerEvent::Button { name } => format!("button\nname:{name}\n\n"),
        }
    }
}

/// The raw move command of the maximize heuristic.
///
/// This exact text (note the `down:` key, unlike the `drag:` flag used by the
/// `move`/`drag` commands) is what a specific TV firmware was observed to
/// accept; it is repeated [`MAXIMIZE_MOVE_COUNT`] times to walk the cursor to
/// the player's maximize control.  Opaque, version-specific constants — keep
/// them verbatim.
pub const MAXIMIZE_MOVE: &str = "move\ndx:11\ndy:-8\ndown:0\n\n";

/// Number of times [`MAXIMIZE_MOVE`] is repeated.
pub const MAXIMIZE_MOVE_COUNT: usize = 22;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_encoding_includes_drag_flag_zero() {
        let event = PointerEvent::Move {
            dx: 5,
            dy: -3,
            drag: false,
        };
        assert_eq!(event.encode(), "move\ndx:5\ndy:-3\ndrag:0\n\n");
    }

    #[test]
    fn test_move_encoding_includes_drag_flag_one() {
        let event = PointerEvent::Move {
            dx: 5,
            dy: -3,
            drag: true,
        };
        assert_eq!(event.encode(), "move\ndx:5\ndy:-3\ndrag:1\n\n");
    }

    #[test]
    fn test_scroll_encoding() {
        let event = PointerEvent::Scroll { dx: 0, dy: 120 };
        assert_eq!(event.encode(), "scroll\ndx:0\ndy:120\n\n");
    }

    #[test]
    fn test_click_encoding_has_no_parameters() {
        assert_eq!(PointerEvent::Click.encode(), "click\n\n");
    }

    #[test]
    fn test_button_encoding_carries_name() {
        let event = PointerEvent::Button {
            name: "VOLUMEUP".to_string(),
        };
        assert_eq!(event.encode(), "button\nname:VOLUMEUP\n\n");
    }

    #[test]
    fn test_every_encoding_ends_with_blank_line() {
        // The blank line terminates the event on the wire.
        let events = [
            PointerEvent::Move { dx: 1, dy: 2, drag: false },
            PointerEvent::Scroll { dx: 1, dy: 2 },
            PointerEvent::Click,
            PointerEvent::Button { name: "HOME".to_string() },
        ];
        for event in events {
            assert!(event.encode().ends_with("\n\n"), "{:?}", event);
        }
    }

    #[test]
    fn test_maximize_move_constant_is_verbatim() {
        // Empirically-derived firmware constant; any change breaks the heuristic.
        assert_eq!(MAXIMIZE_MOVE, "move\ndx:11\ndy:-8\ndown:0\n\n");
        assert_eq!(MAXIMIZE_MOVE_COUNT, 22);
    }
}
