//! Events.
//!
//! An [`Event`] describes one input occurrence in window coordinates. Events are plain values:
//! they are borrowed for the duration of one dispatch and never retained by widgets.

use cgmath::Point2;

/// List of event kinds.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    PointerMove = 0,
    PointerDown = 1,
    PointerUp = 2,
    KeyDown = 3,
    Paint = 4,
    Other = 5,
}

impl EventKind {
    /// Pointer-class events are routed by hit-testing.
    pub fn is_pointer(self) -> bool {
        match self {
            EventKind::PointerMove | EventKind::PointerDown | EventKind::PointerUp => true,
            EventKind::KeyDown | EventKind::Paint | EventKind::Other => false,
        }
    }
}

/// A single input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The pointer moved to the given location.
    PointerMove(Point2<i32>),
    /// A pointer button was pressed at the given location.
    PointerDown(Point2<i32>),
    /// A pointer button was released at the given location.
    PointerUp(Point2<i32>),
    /// A key was pressed.
    KeyDown(Key),
    /// The surface contents were lost and must be redrawn entirely.
    Paint,
    /// Anything the toolkit does not interpret; delivered to the root widget.
    Other,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PointerMove(_) => EventKind::PointerMove,
            Event::PointerDown(_) => EventKind::PointerDown,
            Event::PointerUp(_) => EventKind::PointerUp,
            Event::KeyDown(_) => EventKind::KeyDown,
            Event::Paint => EventKind::Paint,
            Event::Other => EventKind::Other,
        }
    }

    /// Event location in window coordinates, for pointer events.
    pub fn location(&self) -> Option<Point2<i32>> {
        match self {
            Event::PointerMove(p) | Event::PointerDown(p) | Event::PointerUp(p) => Some(*p),
            Event::KeyDown(_) | Event::Paint | Event::Other => None,
        }
    }

    /// The key, for key events.
    pub fn key(&self) -> Option<Key> {
        match self {
            Event::KeyDown(key) => Some(*key),
            _ => None,
        }
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub fn new(code: KeyCode) -> Key {
        Key {
            code,
            modifiers: KeyModifiers::default(),
        }
    }

    /// The printable character this key produces, if any.
    pub fn to_char(&self) -> Option<char> {
        let c = self.code.to_char()?;
        if self.modifiers.shift {
            Some(c.to_ascii_uppercase())
        } else {
            Some(c)
        }
    }
}

/// Modifier key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    /// Whether any shift key is pressed.
    pub shift: bool,

    /// Whether any control key is pressed.
    pub control: bool,

    /// Whether any option key or alt key is pressed.
    pub option: bool,

    /// Whether any command key or meta key is pressed.
    pub command: bool,
}

impl KeyModifiers {
    const SHIFT: u8 = 1;
    const CONTROL: u8 = 1 << 1;
    const OPTION: u8 = 1 << 2;
    const COMMAND: u8 = 1 << 3;

    /// Decodes a native modifier bitmask.
    pub fn from_bits(bits: u8) -> KeyModifiers {
        KeyModifiers {
            shift: bits & Self::SHIFT != 0,
            control: bits & Self::CONTROL != 0,
            option: bits & Self::OPTION != 0,
            command: bits & Self::COMMAND != 0,
        }
    }

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.shift {
            bits |= Self::SHIFT;
        }
        if self.control {
            bits |= Self::CONTROL;
        }
        if self.option {
            bits |= Self::OPTION;
        }
        if self.command {
            bits |= Self::COMMAND;
        }
        bits
    }
}

macro_rules! key_codes {
    ($($name:ident = $value:literal),+ $(,)?) => {
        /// Keyboard layout-independent identifiers for keyboard keys.
        ///
        /// Some obscure keys may be missing.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KeyCode {
            $($name = $value,)+
        }

        impl KeyCode {
            /// Looks up a native key code.
            pub fn from_raw(raw: u8) -> Option<KeyCode> {
                match raw {
                    $($value => Some(KeyCode::$name),)+
                    _ => None,
                }
            }
        }
    };
}

key_codes! {
    A = 0x1, B = 0x2, C = 0x3, D = 0x4, E = 0x5, F = 0x6, G = 0x7, H = 0x8, I = 0x9,
    J = 0xA, K = 0xB, L = 0xC, M = 0xD, N = 0xE, O = 0xF, P = 0x10, Q = 0x11, R = 0x12,
    S = 0x13, T = 0x14, U = 0x15, V = 0x16, W = 0x17, X = 0x18, Y = 0x19, Z = 0x1A,
    N0 = 0x20, N1 = 0x21, N2 = 0x22, N3 = 0x23, N4 = 0x24,
    N5 = 0x25, N6 = 0x26, N7 = 0x27, N8 = 0x28, N9 = 0x29,
    Minus = 0x2B,
    Comma = 0x31,
    Slash = 0x32,
    Period = 0x33,
    Return = 0x35,
    Tab = 0x36,
    Space = 0x37,
    Delete = 0x38,
    Escape = 0x39,
    LeftArrow = 0x44,
    DownArrow = 0x45,
    UpArrow = 0x46,
    RightArrow = 0x47,
    ForwardDelete = 0x48,
    Home = 0x4A,
    End = 0x4B,
    PageUp = 0x4C,
    PageDown = 0x4D,
}

impl KeyCode {
    /// The unshifted character for printable keys.
    pub fn to_char(self) -> Option<char> {
        let raw = self as u8;
        match self {
            KeyCode::Space => Some(' '),
            KeyCode::Minus => Some('-'),
            KeyCode::Comma => Some(','),
            KeyCode::Slash => Some('/'),
            KeyCode::Period => Some('.'),
            _ if (0x1..=0x1A).contains(&raw) => Some((b'a' + raw - 0x1) as char),
            _ if (0x20..=0x29).contains(&raw) => Some((b'0' + raw - 0x20) as char),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_locations() {
        let down = Event::PointerDown(Point2::new(3, 4));
        assert_eq!(down.kind(), EventKind::PointerDown);
        assert!(down.kind().is_pointer());
        assert_eq!(down.location(), Some(Point2::new(3, 4)));

        let key = Event::KeyDown(Key::new(KeyCode::A));
        assert!(!key.kind().is_pointer());
        assert_eq!(key.location(), None);
        assert_eq!(key.key().map(|k| k.code), Some(KeyCode::A));
        assert_eq!(Event::Paint.key(), None);
    }

    #[test]
    fn key_characters() {
        assert_eq!(KeyCode::from_raw(0x3), Some(KeyCode::C));
        assert_eq!(KeyCode::from_raw(0xEE), None);
        assert_eq!(Key::new(KeyCode::C).to_char(), Some('c'));
        assert_eq!(KeyCode::N7.to_char(), Some('7'));
        assert_eq!(KeyCode::Return.to_char(), None);

        let shifted = Key {
            code: KeyCode::Z,
            modifiers: KeyModifiers::from_bits(1),
        };
        assert_eq!(shifted.to_char(), Some('Z'));
        assert_eq!(shifted.modifiers.bits(), 1);
    }
}
