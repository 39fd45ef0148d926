//! Terminal line representation
//!
//! A line represents a row of glyphs in the terminal grid,
//! with metadata about wrapping and redraw state.

use serde::{Deserialize, Serialize};

use super::cell::Glyph;

/// A row of glyphs in the terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// The glyphs in this line
    glyphs: Vec<Glyph>,
    /// True if this line logically continues on the next row
    /// (it was filled by autowrap rather than ended by a newline)
    wrapped: bool,
    /// Set whenever the line changes; cleared by the renderer
    #[serde(skip)]
    dirty: bool,
}

impl Line {
    /// Create a new blank line with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self::blank(cols, Glyph::default())
    }

    /// Create a line filled with `blank`
    pub fn blank(cols: usize, blank: Glyph) -> Self {
        Self {
            glyphs: vec![blank; cols],
            wrapped: false,
            dirty: true,
        }
    }

    /// Build a line from text, one glyph per char (test and snapshot helper)
    pub fn from_text(text: &str, cols: usize) -> Self {
        let mut line = Self::new(cols);
        for (cell, c) in line.glyphs.iter_mut().zip(text.chars()) {
            cell.c = c;
        }
        line
    }

    /// Get the number of columns in this line
    pub fn cols(&self) -> usize {
        self.glyphs.len()
    }

    /// Get a reference to the glyph at the given column
    pub fn glyph(&self, col: usize) -> Option<&Glyph> {
        self.glyphs.get(col)
    }

    /// Get a mutable reference to the glyph at the given column
    pub fn glyph_mut(&mut self, col: usize) -> Option<&mut Glyph> {
        self.dirty = true;
        self.glyphs.get_mut(col)
    }

    /// Get all glyphs
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Check if this line continues on the next row
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Set the wrapped flag
    pub fn set_wrapped(&mut self, wrapped: bool) {
        if self.wrapped != wrapped {
            self.dirty = true;
        }
        self.wrapped = wrapped;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Resize the line to a new number of columns.
    /// New cells are filled with `blank`; shrinking truncates.
    pub fn resize(&mut self, cols: usize, blank: Glyph) {
        self.glyphs.resize(cols, blank);
        // A wide rune split by truncation loses its continuation
        if let Some(last) = self.glyphs.last_mut() {
            if last.attrs.wide {
                *last = blank;
            }
        }
        self.dirty = true;
    }

    /// Overwrite every glyph with `blank` and drop the wrapped flag
    pub fn clear(&mut self, blank: Glyph) {
        self.glyphs.fill(blank);
        self.wrapped = false;
        self.dirty = true;
    }

    /// Overwrite columns `start..=end` with `blank`. Out-of-range columns are clipped.
    pub fn clear_range(&mut self, start: usize, end: usize, blank: Glyph) {
        if self.glyphs.is_empty() || start >= self.glyphs.len() {
            return;
        }
        let end = end.min(self.glyphs.len() - 1);
        if start > end {
            return;
        }
        self.glyphs[start..=end].fill(blank);
        self.dirty = true;
    }

    /// Insert `count` blank cells at `col`, shifting existing cells right.
    /// Cells pushed past the end are lost.
    pub fn insert_blank(&mut self, col: usize, count: usize, blank: Glyph) {
        let len = self.glyphs.len();
        if col >= len {
            return;
        }
        let count = count.min(len - col);
        self.glyphs[col..].rotate_right(count);
        self.glyphs[col..col + count].fill(blank);
        self.dirty = true;
    }

    /// Delete `count` cells at `col`, shifting remaining cells left.
    /// Vacated cells at the end are filled with `blank`.
    pub fn delete_chars(&mut self, col: usize, count: usize, blank: Glyph) {
        let len = self.glyphs.len();
        if col >= len {
            return;
        }
        let count = count.min(len - col);
        self.glyphs[col..].rotate_left(count);
        self.glyphs[len - count..].fill(blank);
        self.dirty = true;
    }

    /// Logical length: the column after the last non-blank glyph,
    /// or the full width when the line wraps onto the next row.
    pub fn len(&self) -> usize {
        if self.wrapped {
            return self.glyphs.len();
        }
        self.glyphs
            .iter()
            .rposition(|g| !g.is_blank())
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Check if the line holds only blanks
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the text content of this line, without trailing blanks
    pub fn text(&self) -> String {
        let mut result: String = self
            .glyphs
            .iter()
            .filter(|g| !g.is_wide_continuation())
            .map(|g| g.c)
            .collect();
        let trimmed = result.trim_end_matches(' ').len();
        result.truncate(trimmed);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;

    fn abc_line(cols: usize) -> Line {
        let mut line = Line::new(cols);
        for i in 0..cols {
            line.glyph_mut(i).unwrap().c = (b'A' + i as u8) as char;
        }
        line
    }

    #[test]
    fn test_line_new() {
        let line = Line::new(80);
        assert_eq!(line.cols(), 80);
        assert!(!line.is_wrapped());
        assert!(line.is_empty());
        assert!(line.is_dirty());
    }

    #[test]
    fn test_line_glyph_access() {
        let mut line = Line::new(10);
        line.glyph_mut(5).unwrap().c = 'X';
        assert_eq!(line.glyph(5).unwrap().c, 'X');
        assert!(line.glyph(10).is_none());
    }

    #[test]
    fn test_line_resize() {
        let mut line = Line::new(10);
        line.glyph_mut(5).unwrap().c = 'A';

        line.resize(20, Glyph::default());
        assert_eq!(line.cols(), 20);
        assert_eq!(line.glyph(5).unwrap().c, 'A');
        assert!(line.glyph(15).unwrap().is_blank());

        line.resize(5, Glyph::default());
        assert_eq!(line.cols(), 5);
    }

    #[test]
    fn test_line_resize_drops_split_wide_rune() {
        let mut line = Line::new(4);
        {
            let g = line.glyph_mut(2).unwrap();
            g.c = '中';
            g.attrs.wide = true;
        }
        line.glyph_mut(3).unwrap().attrs.wide_dummy = true;
        line.resize(3, Glyph::default());
        assert!(line.glyph(2).unwrap().is_blank());
    }

    #[test]
    fn test_line_clear() {
        let mut line = abc_line(10);
        line.set_wrapped(true);
        line.clear(Glyph::default());
        assert!(line.is_empty());
        assert!(!line.is_wrapped());
    }

    #[test]
    fn test_line_clear_range_clips() {
        let mut line = abc_line(10);
        let mut blank = Glyph::default();
        blank.bg = Color::RED;
        line.clear_range(5, 100, blank);
        assert_eq!(line.glyph(4).unwrap().c, 'E');
        assert!(line.glyph(5).unwrap().is_blank());
        assert_eq!(line.glyph(9).unwrap().bg, Color::RED);

        line.clear_range(20, 30, blank);
        assert_eq!(line.text(), "ABCDE");
    }

    #[test]
    fn test_line_insert_blank() {
        let mut line = abc_line(10);
        line.insert_blank(2, 3, Glyph::default());
        assert_eq!(line.text(), "AB   CDEFG");
    }

    #[test]
    fn test_line_delete_chars() {
        let mut line = abc_line(10);
        line.delete_chars(2, 3, Glyph::default());
        assert_eq!(line.text(), "ABFGHIJ");
        assert!(line.glyph(7).unwrap().is_blank());
    }

    #[test]
    fn test_line_delete_more_than_remaining() {
        let mut line = abc_line(10);
        line.delete_chars(8, 50, Glyph::default());
        assert_eq!(line.text(), "ABCDEFGH");
    }

    #[test]
    fn test_line_len_respects_wrap() {
        let mut line = Line::from_text("Hi", 10);
        assert_eq!(line.len(), 2);
        line.set_wrapped(true);
        assert_eq!(line.len(), 10);
    }

    #[test]
    fn test_line_text_skips_continuation() {
        let mut line = Line::new(10);
        {
            let g = line.glyph_mut(0).unwrap();
            g.c = '世';
            g.attrs.wide = true;
        }
        line.glyph_mut(1).unwrap().attrs.wide_dummy = true;
        line.glyph_mut(2).unwrap().c = '!';
        assert_eq!(line.text(), "世!");
    }
}
