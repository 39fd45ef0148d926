//! Deterministic snapshot generation
//!
//! Snapshots capture what a renderer would see (the view rows at the
//! current view offset) plus cursor and mode state, in a serializable
//! format. Given the same byte stream, the screen must produce identical
//! snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Attrs, Color, Glyph};
use super::cursor::{Cursor, CursorShape};
use super::modes::{Modes, MouseEncoding, MouseMode};
use super::screen::Screen;

/// A complete snapshot of the screen state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: usize,
    pub rows: usize,
    /// View content (row-major)
    pub grid: Vec<Vec<GlyphSnapshot>>,
    /// Which view rows continue on the next row
    pub wrapped: Vec<bool>,
    pub cursor: CursorSnapshot,
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    pub modes: ModesSnapshot,
    pub title: String,
    pub alternate_screen: bool,
    pub history_lines: usize,
    pub view_offset: usize,
}

/// Snapshot of a single glyph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphSnapshot {
    pub content: String,
    pub fg: ColorSnapshot,
    pub bg: ColorSnapshot,
    pub attrs: AttrsSnapshot,
    /// Cell width (0 for continuation, 1 normal, 2 wide)
    pub width: u8,
}

/// Snapshot of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    Default,
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

/// Snapshot of glyph attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttrsSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub faint: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub invisible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub struck: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Snapshot of cursor state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
    pub shape: String,
    pub blinking: bool,
    pub pending_wrap: bool,
}

/// Snapshot of terminal modes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModesSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub application_cursor: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub application_keypad: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bracketed_paste: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub focus_reporting: bool,
    pub mouse_tracking: String,
    pub mouse_encoding: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub insert: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub linefeed_mode: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse_video: bool,
    pub autowrap: bool,
}

impl From<&Color> for ColorSnapshot {
    fn from(color: &Color) -> Self {
        match color {
            Color::Default => ColorSnapshot::Default,
            Color::Indexed(i) => ColorSnapshot::Indexed { index: *i },
            Color::Rgb(r, g, b) => ColorSnapshot::Rgb {
                r: *r,
                g: *g,
                b: *b,
            },
        }
    }
}

impl From<&Attrs> for AttrsSnapshot {
    fn from(attrs: &Attrs) -> Self {
        AttrsSnapshot {
            bold: attrs.bold,
            faint: attrs.faint,
            italic: attrs.italic,
            underline: attrs.underline,
            blink: attrs.blink,
            reverse: attrs.reverse,
            invisible: attrs.invisible,
            struck: attrs.struck,
        }
    }
}

impl From<&Glyph> for GlyphSnapshot {
    fn from(glyph: &Glyph) -> Self {
        let (content, width) = if glyph.is_wide_continuation() {
            (String::new(), 0)
        } else if glyph.is_wide() {
            (glyph.c.to_string(), 2)
        } else {
            (glyph.c.to_string(), 1)
        };
        GlyphSnapshot {
            content,
            fg: ColorSnapshot::from(&glyph.fg),
            bg: ColorSnapshot::from(&glyph.bg),
            attrs: AttrsSnapshot::from(&glyph.attrs),
            width,
        }
    }
}

impl CursorSnapshot {
    fn new(cursor: &Cursor, modes: &Modes) -> Self {
        CursorSnapshot {
            col: cursor.col,
            row: cursor.row,
            visible: modes.cursor_visible,
            shape: match cursor.shape {
                CursorShape::Block => "block".to_string(),
                CursorShape::Underline => "underline".to_string(),
                CursorShape::Bar => "bar".to_string(),
            },
            blinking: cursor.blinking,
            pending_wrap: cursor.pending_wrap,
        }
    }
}

impl From<&Modes> for ModesSnapshot {
    fn from(modes: &Modes) -> Self {
        ModesSnapshot {
            application_cursor: modes.cursor_keys_application,
            application_keypad: modes.keypad_application,
            bracketed_paste: modes.bracketed_paste,
            focus_reporting: modes.focus_reporting,
            mouse_tracking: match modes.mouse_mode {
                MouseMode::None => "none".to_string(),
                MouseMode::X10 => "x10".to_string(),
                MouseMode::Normal => "normal".to_string(),
                MouseMode::ButtonMotion => "button_motion".to_string(),
                MouseMode::AnyMotion => "any_motion".to_string(),
            },
            mouse_encoding: match modes.mouse_encoding {
                MouseEncoding::Default => "default".to_string(),
                MouseEncoding::Utf8 => "utf8".to_string(),
                MouseEncoding::Sgr => "sgr".to_string(),
            },
            insert: modes.insert,
            linefeed_mode: modes.linefeed_newline,
            reverse_video: modes.reverse_video,
            autowrap: modes.autowrap,
        }
    }
}

impl Snapshot {
    /// Create a snapshot of the rows currently in view
    pub fn from_screen(screen: &Screen, title: &str) -> Self {
        let mut grid = Vec::with_capacity(screen.rows());
        let mut wrapped = Vec::with_capacity(screen.rows());

        for row in 0..screen.rows() {
            let mut row_glyphs = Vec::with_capacity(screen.cols());
            match screen.view_line(row) {
                Some(line) => {
                    row_glyphs.extend(line.glyphs().iter().map(GlyphSnapshot::from));
                    wrapped.push(line.is_wrapped());
                },
                None => wrapped.push(false),
            }
            // History lines can be narrower than the screen after a resize
            while row_glyphs.len() < screen.cols() {
                row_glyphs.push(GlyphSnapshot::from(&Glyph::default()));
            }
            grid.push(row_glyphs);
        }

        let (scroll_top, scroll_bottom) = screen.scroll_region();
        Snapshot {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            wrapped,
            cursor: CursorSnapshot::new(screen.cursor(), &screen.modes),
            scroll_top,
            scroll_bottom,
            modes: ModesSnapshot::from(&screen.modes),
            title: title.to_string(),
            alternate_screen: screen.is_alt(),
            history_lines: screen.history().len(),
            view_offset: screen.view_offset(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the view, one line per row, trailing blanks trimmed
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for glyph in row {
                if glyph.width == 0 {
                    continue;
                }
                result.push_str(&glyph.content);
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare grid content only
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.grid == other.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::screen::DEFAULT_TAB_WIDTH;

    fn screen(cols: usize, rows: usize) -> Screen {
        Screen::new(cols, rows, 100, DEFAULT_TAB_WIDTH)
    }

    #[test]
    fn test_snapshot_from_screen() {
        let mut screen = screen(10, 3);
        screen.print('H');
        screen.print('i');

        let snapshot = Snapshot::from_screen(&screen, "title");

        assert_eq!(snapshot.cols, 10);
        assert_eq!(snapshot.rows, 3);
        assert_eq!(snapshot.grid[0][0].content, "H");
        assert_eq!(snapshot.grid[0][1].content, "i");
        assert_eq!(snapshot.cursor.col, 2);
        assert_eq!(snapshot.cursor.row, 0);
        assert_eq!(snapshot.title, "title");
    }

    #[test]
    fn test_snapshot_to_text() {
        let mut screen = screen(10, 3);
        screen.print('A');
        screen.print('B');
        screen.linefeed();
        screen.carriage_return();
        screen.print('中');

        let text = Snapshot::from_screen(&screen, "").to_text();
        assert_eq!(text, "AB\n中\n");
    }

    #[test]
    fn test_snapshot_follows_view() {
        let mut screen = screen(10, 2);
        screen.print('A');
        screen.carriage_return();
        screen.linefeed();
        screen.linefeed();
        screen.scroll_view(1);

        let snapshot = Snapshot::from_screen(&screen, "");
        assert_eq!(snapshot.view_offset, 1);
        assert_eq!(snapshot.history_lines, 1);
        assert_eq!(snapshot.grid[0][0].content, "A");
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut screen = screen(5, 2);
        screen.print('X');
        screen.cursor_mut().pen.attrs.bold = true;
        screen.cursor_mut().pen.fg = Color::RED;
        screen.print('Y');

        let snapshot = Snapshot::from_screen(&screen, "");
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert!(snapshot.content_equals(&restored));
        assert!(restored.grid[0][1].attrs.bold);
    }

    #[test]
    fn test_color_snapshot() {
        assert_eq!(ColorSnapshot::from(&Color::Default), ColorSnapshot::Default);
        assert_eq!(
            ColorSnapshot::from(&Color::Indexed(5)),
            ColorSnapshot::Indexed { index: 5 }
        );
        assert_eq!(
            ColorSnapshot::from(&Color::Rgb(255, 128, 0)),
            ColorSnapshot::Rgb {
                r: 255,
                g: 128,
                b: 0
            }
        );
    }
}
