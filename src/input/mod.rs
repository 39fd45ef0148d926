//! Input Encoding Module
//!
//! Encodes already-decoded host input into the byte sequences a child
//! process expects: mouse reports, bracketed paste and focus events.
//!
//! # Mouse Encoding
//!
//! Which events report depends on the active mouse mode:
//! - X10 (9): button press only, no modifiers
//! - Normal (1000): press and release
//! - Button-motion (1002): adds motion while a button is held
//! - Any-motion (1003): all motion
//!
//! The report format depends on the encoding: the default byte form
//! (coordinates limited to 222), UTF-8 (1005) or SGR (1006).

use crate::core::{MouseEncoding, MouseMode};

/// Keyboard modifiers held during a mouse event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Modifier bits added to a mouse button code
    fn mouse_bits(self) -> u32 {
        let mut bits = 0;
        if self.shift {
            bits |= 4;
        }
        if self.alt {
            bits |= 8;
        }
        if self.ctrl {
            bits |= 16;
        }
        bits
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

impl MouseButton {
    fn code(self) -> u32 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::WheelUp => 64,
            MouseButton::WheelDown => 65,
        }
    }

    fn is_wheel(self) -> bool {
        matches!(self, MouseButton::WheelUp | MouseButton::WheelDown)
    }
}

/// Mouse event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventType {
    Press,
    Release,
    Motion,
}

/// A decoded mouse event. Motion carries the held button, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventType,
    pub button: Option<MouseButton>,
}

impl MouseEvent {
    pub fn press(button: MouseButton) -> Self {
        Self {
            kind: MouseEventType::Press,
            button: Some(button),
        }
    }

    pub fn release(button: MouseButton) -> Self {
        Self {
            kind: MouseEventType::Release,
            button: Some(button),
        }
    }

    pub fn motion(held: Option<MouseButton>) -> Self {
        Self {
            kind: MouseEventType::Motion,
            button: held,
        }
    }
}

/// Encode a mouse event at 0-based (col, row), or `None` when the active
/// mode does not report it
pub fn encode_mouse(
    event: MouseEvent,
    col: u16,
    row: u16,
    modifiers: Modifiers,
    mode: MouseMode,
    encoding: MouseEncoding,
) -> Option<Vec<u8>> {
    let reported = match (mode, event.kind) {
        (MouseMode::None, _) => false,
        (MouseMode::X10, kind) => {
            kind == MouseEventType::Press && !event.button.is_some_and(MouseButton::is_wheel)
        },
        (_, MouseEventType::Press | MouseEventType::Release) => event.button.is_some(),
        (MouseMode::Normal, MouseEventType::Motion) => false,
        (MouseMode::ButtonMotion, MouseEventType::Motion) => event.button.is_some(),
        (MouseMode::AnyMotion, MouseEventType::Motion) => true,
    };
    if !reported {
        return None;
    }
    if event.kind == MouseEventType::Release && event.button.is_some_and(MouseButton::is_wheel) {
        return None;
    }

    let sgr = encoding == MouseEncoding::Sgr;
    let mut code = match (event.kind, event.button) {
        (MouseEventType::Release, _) if !sgr => 3,
        (_, Some(button)) => button.code(),
        // Motion with no button held
        (_, None) => 3,
    };
    if event.kind == MouseEventType::Motion {
        code += 32;
    }
    if mode != MouseMode::X10 {
        code |= modifiers.mouse_bits();
    }

    let (x, y) = (u32::from(col) + 1, u32::from(row) + 1);
    match encoding {
        MouseEncoding::Sgr => {
            let final_char = if event.kind == MouseEventType::Release {
                'm'
            } else {
                'M'
            };
            Some(format!("\x1b[<{};{};{}{}", code, x, y, final_char).into_bytes())
        },
        MouseEncoding::Utf8 => {
            let mut result = b"\x1b[M".to_vec();
            for value in [code + 32, x + 32, y + 32] {
                let c = char::from_u32(value)?;
                let mut buf = [0u8; 4];
                result.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            Some(result)
        },
        MouseEncoding::Default => {
            // One byte per value: coordinates past 222 cannot be expressed
            if col > 222 || row > 222 {
                return None;
            }
            let byte = |v: u32| u8::try_from(v + 32).ok();
            Some(vec![0x1b, b'[', b'M', byte(code)?, byte(x)?, byte(y)?])
        },
    }
}

/// Encode focus in/out events
pub fn encode_focus(focused: bool) -> Vec<u8> {
    if focused {
        b"\x1b[I".to_vec()
    } else {
        b"\x1b[O".to_vec()
    }
}

/// Encode pasted text, wrapped in `CSI 200~` / `CSI 201~` when bracketed
pub fn encode_paste(text: &str, bracketed: bool) -> Vec<u8> {
    if !bracketed {
        return text.as_bytes().to_vec();
    }
    let mut bytes = Vec::with_capacity(text.len() + 12);
    bytes.extend_from_slice(b"\x1b[200~");
    bytes.extend_from_slice(text.as_bytes());
    bytes.extend_from_slice(b"\x1b[201~");
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(event: MouseEvent, col: u16, row: u16, mode: MouseMode, encoding: MouseEncoding) -> Option<Vec<u8>> {
        encode_mouse(event, col, row, Modifiers::default(), mode, encoding)
    }

    #[test]
    fn test_mouse_sgr_encoding() {
        let press = encode(MouseEvent::press(MouseButton::Left), 10, 5, MouseMode::Normal, MouseEncoding::Sgr);
        assert_eq!(press, Some(b"\x1b[<0;11;6M".to_vec()));

        let release = encode(MouseEvent::release(MouseButton::Left), 10, 5, MouseMode::Normal, MouseEncoding::Sgr);
        assert_eq!(release, Some(b"\x1b[<0;11;6m".to_vec()));
    }

    #[test]
    fn test_mouse_default_encoding() {
        let press = encode(MouseEvent::press(MouseButton::Left), 0, 0, MouseMode::X10, MouseEncoding::Default);
        // Button 0 + 32 = 32, col 1 + 32 = 33, row 1 + 32 = 33
        assert_eq!(press, Some(vec![0x1b, b'[', b'M', 32, 33, 33]));

        let release = encode(MouseEvent::release(MouseButton::Right), 1, 1, MouseMode::Normal, MouseEncoding::Default);
        assert_eq!(release, Some(vec![0x1b, b'[', b'M', 35, 34, 34]));
    }

    #[test]
    fn test_mouse_default_encoding_drops_far_coordinates() {
        let far = encode(MouseEvent::press(MouseButton::Left), 223, 0, MouseMode::Normal, MouseEncoding::Default);
        assert_eq!(far, None);
        let edge = encode(MouseEvent::press(MouseButton::Left), 222, 0, MouseMode::Normal, MouseEncoding::Default);
        assert_eq!(edge, Some(vec![0x1b, b'[', b'M', 32, 255, 33]));
    }

    #[test]
    fn test_mouse_utf8_encoding() {
        let press = encode(MouseEvent::press(MouseButton::Left), 300, 0, MouseMode::Normal, MouseEncoding::Utf8);
        // 301 + 32 = 333 = U+014D
        assert_eq!(press, Some(vec![0x1b, b'[', b'M', 32, 0xC5, 0x8D, 33]));
    }

    #[test]
    fn test_mouse_modifiers_and_motion() {
        let mods = Modifiers { shift: true, ctrl: true, alt: false };
        let drag = encode_mouse(
            MouseEvent::motion(Some(MouseButton::Left)),
            2,
            3,
            mods,
            MouseMode::ButtonMotion,
            MouseEncoding::Sgr,
        );
        assert_eq!(drag, Some(b"\x1b[<52;3;4M".to_vec()));

        // X10 never carries modifiers
        let x10 = encode_mouse(MouseEvent::press(MouseButton::Left), 0, 0, mods, MouseMode::X10, MouseEncoding::Sgr);
        assert_eq!(x10, Some(b"\x1b[<0;1;1M".to_vec()));
    }

    #[test]
    fn test_mouse_mode_filtering() {
        let left = MouseButton::Left;
        assert_eq!(encode(MouseEvent::release(left), 0, 0, MouseMode::X10, MouseEncoding::Default), None);
        assert_eq!(encode(MouseEvent::press(left), 0, 0, MouseMode::None, MouseEncoding::Default), None);
        assert_eq!(encode(MouseEvent::motion(Some(left)), 0, 0, MouseMode::Normal, MouseEncoding::Sgr), None);
        assert_eq!(encode(MouseEvent::motion(None), 0, 0, MouseMode::ButtonMotion, MouseEncoding::Sgr), None);
        assert_eq!(
            encode(MouseEvent::motion(None), 0, 0, MouseMode::AnyMotion, MouseEncoding::Sgr),
            Some(b"\x1b[<35;1;1M".to_vec())
        );
    }

    #[test]
    fn test_mouse_wheel() {
        let up = encode(MouseEvent::press(MouseButton::WheelUp), 0, 0, MouseMode::Normal, MouseEncoding::Sgr);
        assert_eq!(up, Some(b"\x1b[<64;1;1M".to_vec()));
        let release = encode(MouseEvent::release(MouseButton::WheelDown), 0, 0, MouseMode::Normal, MouseEncoding::Sgr);
        assert_eq!(release, None);
        let x10 = encode(MouseEvent::press(MouseButton::WheelUp), 0, 0, MouseMode::X10, MouseEncoding::Sgr);
        assert_eq!(x10, None);
    }

    #[test]
    fn test_bracketed_paste() {
        assert_eq!(encode_paste("hi", true), b"\x1b[200~hi\x1b[201~");
        assert_eq!(encode_paste("hi", false), b"hi");
    }

    #[test]
    fn test_focus_events() {
        assert_eq!(encode_focus(true), b"\x1b[I");
        assert_eq!(encode_focus(false), b"\x1b[O");
    }
}
