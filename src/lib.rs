//! Mochi Screen Library
//!
//! A terminal screen-state engine: it consumes the byte stream a child
//! process writes to its pseudo-terminal and maintains the screen a
//! renderer would draw. This crate provides:
//!
//! - `core`: Glyphs, lines, grid, history ring, cursor, modes, selection, snapshots
//! - `parser`: VT/xterm escape sequence parser
//! - `terminal`: The facade applying parsed actions and producing replies
//! - `input`: Mouse, paste and focus encoders for the outbound direction
//! - `app`: Configuration and colour palette

pub mod app;
pub mod core;
pub mod error;
pub mod input;
pub mod parser;
pub mod terminal;

pub use error::{Result, TerminalError};
pub use terminal::{Terminal, TerminalObserver};
