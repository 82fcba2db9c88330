//! Native events as delivered by a display service, and their translation into [`Event`]s.

use crate::display::SurfaceId;
use crate::events::{Event, Key, KeyCode, KeyModifiers};
use cgmath::Point2;
use thiserror::Error;

/// Native event type codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEventType {
    PointerMove = 1,
    PointerDown = 2,
    PointerUp = 3,
    KeyDown = 4,
    Expose = 5,
}

impl RawEventType {
    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(RawEventType::PointerMove),
            2 => Some(RawEventType::PointerDown),
            3 => Some(RawEventType::PointerUp),
            4 => Some(RawEventType::KeyDown),
            5 => Some(RawEventType::Expose),
            _ => None,
        }
    }
}

/// An untranslated native event.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// The surface the event was delivered to.
    pub surface: SurfaceId,
    /// Native type code (see [`RawEventType`]); unknown codes become [`Event::Other`].
    pub ty: u8,
    pub x: i32,
    pub y: i32,
    /// Native key code, for key events.
    pub key: u8,
    /// Native modifier bitmask, for key events.
    pub modifiers: u8,
}

impl RawEvent {
    /// A pointer-class event at the given location.
    pub fn pointer(surface: SurfaceId, ty: RawEventType, x: i32, y: i32) -> RawEvent {
        RawEvent {
            surface,
            ty: ty as u8,
            x,
            y,
            key: 0,
            modifiers: 0,
        }
    }

    pub fn key_down(surface: SurfaceId, key: KeyCode, modifiers: KeyModifiers) -> RawEvent {
        RawEvent {
            surface,
            ty: RawEventType::KeyDown as u8,
            x: 0,
            y: 0,
            key: key as u8,
            modifiers: modifiers.bits(),
        }
    }

    pub fn expose(surface: SurfaceId) -> RawEvent {
        RawEvent {
            surface,
            ty: RawEventType::Expose as u8,
            x: 0,
            y: 0,
            key: 0,
            modifiers: 0,
        }
    }

    /// Translates this native event into a toolkit event.
    pub fn translate(&self) -> Result<Event, TranslateError> {
        let ty = match RawEventType::from_raw(self.ty) {
            Some(ty) => ty,
            None => return Ok(Event::Other),
        };
        let location = Point2::new(self.x, self.y);

        Ok(match ty {
            RawEventType::PointerMove => Event::PointerMove(location),
            RawEventType::PointerDown => Event::PointerDown(location),
            RawEventType::PointerUp => Event::PointerUp(location),
            RawEventType::KeyDown => {
                let code =
                    KeyCode::from_raw(self.key).ok_or(TranslateError::UnknownKey(self.key))?;
                Event::KeyDown(Key {
                    code,
                    modifiers: KeyModifiers::from_bits(self.modifiers),
                })
            }
            RawEventType::Expose => Event::Paint,
        })
    }
}

/// Errors that may occur when translating a native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("unknown native key code {0:#x}")]
    UnknownKey(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_types() {
        let surface = SurfaceId::new();
        let down = RawEvent::pointer(surface, RawEventType::PointerDown, 10, 20);
        assert_eq!(down.translate(), Ok(Event::PointerDown(Point2::new(10, 20))));
        assert_eq!(RawEvent::expose(surface).translate(), Ok(Event::Paint));

        let shift = KeyModifiers {
            shift: true,
            ..KeyModifiers::default()
        };
        let key = RawEvent::key_down(surface, KeyCode::Q, shift);
        assert_eq!(
            key.translate(),
            Ok(Event::KeyDown(Key {
                code: KeyCode::Q,
                modifiers: shift,
            }))
        );
    }

    #[test]
    fn unknown_type_becomes_other() {
        let raw = RawEvent {
            ty: 0xFF,
            ..RawEvent::expose(SurfaceId::new())
        };
        assert_eq!(raw.translate(), Ok(Event::Other));
    }

    #[test]
    fn unknown_key_fails() {
        let raw = RawEvent {
            key: 0xEE,
            ..RawEvent::key_down(SurfaceId::new(), KeyCode::A, KeyModifiers::default())
        };
        assert_eq!(raw.translate(), Err(TranslateError::UnknownKey(0xEE)));
    }
}
