//! Terminal mode flags
//!
//! Flags toggled by SM/RM (ANSI) and DECSET/DECRST (DEC private).
//! Modes that need more than a flag flip (alternate screen, origin mode,
//! cursor save) are handled by the screen; `set` reports them as unhandled.

use serde::{Deserialize, Serialize};

/// Mouse reporting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseMode {
    /// No mouse reporting
    #[default]
    None,
    /// X10 compatibility mode - report button press only
    X10,
    /// Normal tracking mode - report button press and release
    Normal,
    /// Button-event tracking - report press, release, and motion while button pressed
    ButtonMotion,
    /// Any-event tracking - report all motion events
    AnyMotion,
}

/// Mouse encoding format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseEncoding {
    /// Byte encoding (limited to 223 columns/rows)
    #[default]
    Default,
    /// UTF-8 encoded coordinates (DECSET 1005)
    Utf8,
    /// SGR encoding (CSI < ... M/m, DECSET 1006)
    Sgr,
}

/// Terminal mode flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// DECAWM - Auto wrap mode
    /// When enabled, characters written past the right margin wrap to the next line
    pub autowrap: bool,

    /// IRM - Insert/Replace mode
    /// When enabled, characters are inserted rather than overwriting
    pub insert: bool,

    /// LNM - Line feed/new line mode
    /// When enabled, LF also performs CR and outbound CR is sent as CR LF
    pub linefeed_newline: bool,

    /// KAM - Keyboard action mode (locked keyboard)
    pub keyboard_locked: bool,

    /// SRM reset - bytes written to the child are also echoed locally
    pub local_echo: bool,

    /// DECCKM - Cursor key mode
    pub cursor_keys_application: bool,

    /// DECKPAM/DECKPNM - Keypad mode
    pub keypad_application: bool,

    /// Bracketed paste mode (DECSET 2004)
    pub bracketed_paste: bool,

    /// Mouse reporting mode
    pub mouse_mode: MouseMode,

    /// Mouse encoding format
    pub mouse_encoding: MouseEncoding,

    /// Focus reporting (DECSET 1004)
    pub focus_reporting: bool,

    /// DECSCNM - Screen mode (reverse video)
    pub reverse_video: bool,

    /// Show cursor (DECTCEM - DECSET 25)
    pub cursor_visible: bool,

    /// Cursor blink (DECSET 12)
    pub cursor_blink: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            autowrap: true,
            insert: false,
            linefeed_newline: false,
            keyboard_locked: false,
            local_echo: false,
            cursor_keys_application: false,
            keypad_application: false,
            bracketed_paste: false,
            mouse_mode: MouseMode::None,
            mouse_encoding: MouseEncoding::Default,
            focus_reporting: false,
            reverse_video: false,
            cursor_visible: true,
            cursor_blink: false,
        }
    }
}

impl Modes {
    /// Create new default modes
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all modes to default values
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set or reset a DEC private mode (CSI ? Ps h / CSI ? Ps l).
    /// Returns true if the mode was a plain flag and has been applied.
    pub fn set_dec_mode(&mut self, mode: u16, on: bool) -> bool {
        match mode {
            1 => self.cursor_keys_application = on,
            5 => self.reverse_video = on,
            7 => self.autowrap = on,
            12 => self.cursor_blink = on,
            25 => self.cursor_visible = on,
            9 | 1000 | 1002 | 1003 => {
                self.mouse_mode = if on {
                    match mode {
                        9 => MouseMode::X10,
                        1000 => MouseMode::Normal,
                        1002 => MouseMode::ButtonMotion,
                        _ => MouseMode::AnyMotion,
                    }
                } else {
                    MouseMode::None
                };
            },
            1004 => self.focus_reporting = on,
            1005 | 1006 => {
                self.mouse_encoding = match (on, mode) {
                    (false, _) => MouseEncoding::Default,
                    (true, 1005) => MouseEncoding::Utf8,
                    (true, _) => MouseEncoding::Sgr,
                };
            },
            // Meta key and synchronized output are accepted and ignored
            1034 | 2026 => {},
            2004 => self.bracketed_paste = on,
            _ => return false,
        }
        true
    }

    /// Set or reset an ANSI mode (CSI Ps h / CSI Ps l).
    /// Returns true if the mode was recognized.
    pub fn set_ansi_mode(&mut self, mode: u16, on: bool) -> bool {
        match mode {
            2 => self.keyboard_locked = on,
            4 => self.insert = on,
            12 => self.local_echo = !on,
            20 => self.linefeed_newline = on,
            _ => return false,
        }
        true
    }

    /// True when any mouse reporting mode is active
    pub fn mouse_reporting(&self) -> bool {
        self.mouse_mode != MouseMode::None
    }
}
