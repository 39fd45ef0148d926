//! Cursor state management
//!
//! The cursor tracks position, the pending-wrap flag and the "pen": the
//! glyph template whose colors and attributes are stamped on every printed
//! rune. It also supports save/restore (DECSC/DECRC and CSI s/u).

use serde::{Deserialize, Serialize};

use super::cell::{Color, Glyph};

/// Cursor shape/style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    /// Block cursor (filled rectangle)
    #[default]
    Block,
    /// Underline cursor
    Underline,
    /// Vertical bar cursor
    Bar,
}

impl CursorShape {
    /// Decode a DECSCUSR parameter into a shape and blink flag.
    /// Returns `None` for values outside 0..=6.
    pub fn from_decscusr(param: u16) -> Option<(CursorShape, bool)> {
        match param {
            0 | 1 => Some((CursorShape::Block, true)),
            2 => Some((CursorShape::Block, false)),
            3 => Some((CursorShape::Underline, true)),
            4 => Some((CursorShape::Underline, false)),
            5 => Some((CursorShape::Bar, true)),
            6 => Some((CursorShape::Bar, false)),
            _ => None,
        }
    }
}

/// Cursor position, pending wrap and pen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    /// Cursor sits past the last column; the next printed rune wraps first
    pub pending_wrap: bool,
    /// Template for newly written glyphs
    pub pen: Glyph,
    /// Origin mode (DECOM) - addressing relative to the scroll region
    pub origin_mode: bool,
    /// Cursor shape (DECSCUSR)
    pub shape: CursorShape,
    /// Whether the cursor blinks
    pub blinking: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            col: 0,
            row: 0,
            pending_wrap: false,
            pen: Glyph::default(),
            origin_mode: false,
            shape: CursorShape::Block,
            blinking: true,
        }
    }
}

/// Saved cursor state for DECSC/DECRC. The pending-wrap flag is not
/// saved: restoring moves the cursor, which clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedCursor {
    pub col: usize,
    pub row: usize,
    pub pen: Glyph,
    pub origin_mode: bool,
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to (col, row), clamping the column to the screen and the row to
    /// `min_row..=max_row`. Always clears the pending-wrap flag.
    pub fn move_to(&mut self, col: usize, row: usize, cols: usize, min_row: usize, max_row: usize) {
        self.col = col.min(cols.saturating_sub(1));
        self.row = row.clamp(min_row, max_row.max(min_row));
        self.pending_wrap = false;
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    /// Save cursor state
    pub fn save(&self) -> SavedCursor {
        SavedCursor {
            col: self.col,
            row: self.row,
            pen: self.pen,
            origin_mode: self.origin_mode,
        }
    }

    /// Restore cursor state; position is clamped by the caller's `move_to`
    pub fn restore(&mut self, saved: &SavedCursor) {
        self.col = saved.col;
        self.row = saved.row;
        self.pen = saved.pen;
        self.origin_mode = saved.origin_mode;
        self.pending_wrap = false;
    }

    /// Reset only the pen (SGR 0)
    pub fn reset_attributes(&mut self) {
        self.pen = Glyph::default();
    }

    /// Blank glyph in the pen's colors, used by erase operations
    pub fn erase_glyph(&self) -> Glyph {
        Glyph::blank(&self.pen)
    }

    pub fn fg(&self) -> Color {
        self.pen.fg
    }

    pub fn bg(&self) -> Color {
        self.pen.bg
    }
}
