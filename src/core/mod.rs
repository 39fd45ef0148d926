//! Terminal Core Module
//!
//! Platform-independent screen state. This module contains:
//! - Glyphs, lines and the fixed-size grid
//! - The history ring of lines scrolled off the primary screen
//! - Cursor, charset and mode state
//! - The selection engine
//! - The screen model tying them together, and deterministic snapshots
//!
//! The core is completely deterministic: given the same sequence of
//! operations, it always produces the same state.

mod cell;
mod charset;
mod cursor;
mod grid;
mod history;
mod line;
mod modes;
mod screen;
mod selection;
mod snapshot;

pub use cell::{Attrs, Color, Glyph};
pub use charset::{Charset, CharsetState};
pub use cursor::{Cursor, CursorShape, SavedCursor};
pub use grid::Grid;
pub use history::{History, HistoryIter};
pub use line::Line;
pub use modes::{Modes, MouseEncoding, MouseMode};
pub use screen::{Screen, ScreenLines, DEFAULT_TAB_WIDTH};
pub use selection::{
    LineSource, Selection, SelectionPoint, SelectionState, SelectionType, SnapMode,
};
pub use snapshot::{AttrsSnapshot, ColorSnapshot, CursorSnapshot, GlyphSnapshot, ModesSnapshot, Snapshot};
