//! Terminal Grid
//!
//! A 2D grid of glyphs representing one screen (primary or alternate).
//! Every row/column argument is clipped to the grid; nothing here errors.

use serde::{Deserialize, Serialize};

use super::cell::Glyph;
use super::line::Line;

/// The terminal grid - rows of lines, all `cols` wide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    lines: Vec<Line>,
    cols: usize,
    rows: usize,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            lines: (0..rows).map(|_| Line::new(cols)).collect(),
            cols,
            rows,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get a reference to a line
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Get a mutable reference to a line
    pub fn line_mut(&mut self, row: usize) -> Option<&mut Line> {
        self.lines.get_mut(row)
    }

    /// Iterate over all lines, top to bottom
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Get a reference to a glyph
    pub fn glyph(&self, row: usize, col: usize) -> Option<&Glyph> {
        self.lines.get(row).and_then(|l| l.glyph(col))
    }

    fn clamp_row(&self, row: usize) -> usize {
        row.min(self.rows.saturating_sub(1))
    }

    fn clamp_col(&self, col: usize) -> usize {
        col.min(self.cols.saturating_sub(1))
    }

    /// Write a glyph, repairing any wide rune pair it overwrites half of.
    pub fn put(&mut self, row: usize, col: usize, glyph: Glyph) {
        let row = self.clamp_row(row);
        let col = self.clamp_col(col);
        let cols = self.cols;
        let Some(line) = self.lines.get_mut(row) else {
            return;
        };
        split_wide(line, col, cols);
        if let Some(cell) = line.glyph_mut(col) {
            *cell = glyph;
        }
    }

    /// Fill the rectangle spanned by two corners (inclusive) with `blank`.
    /// Corners may be given in any order.
    pub fn clear_region(&mut self, r0: usize, c0: usize, r1: usize, c1: usize, blank: Glyph) {
        if self.rows == 0 || self.cols == 0 {
            return;
        }
        let (top, bot) = (self.clamp_row(r0.min(r1)), self.clamp_row(r0.max(r1)));
        let (left, right) = (self.clamp_col(c0.min(c1)), self.clamp_col(c0.max(c1)));
        let cols = self.cols;
        let last_col = cols - 1;

        for line in &mut self.lines[top..=bot] {
            split_wide(line, left, cols);
            split_wide(line, right, cols);
            line.clear_range(left, right, blank);
            if right == last_col {
                line.set_wrapped(false);
            }
        }
    }

    /// Insert `n` blanks at (row, col), shifting the rest of the row right
    pub fn insert_blank(&mut self, row: usize, col: usize, n: usize, blank: Glyph) {
        let row = self.clamp_row(row);
        if let Some(line) = self.lines.get_mut(row) {
            line.insert_blank(col, n, blank);
        }
    }

    /// Delete `n` glyphs at (row, col), shifting the rest of the row left
    pub fn delete_chars(&mut self, row: usize, col: usize, n: usize, blank: Glyph) {
        let row = self.clamp_row(row);
        if let Some(line) = self.lines.get_mut(row) {
            line.delete_chars(col, n, blank);
        }
    }

    /// Normalize a scroll region to valid, ordered bounds and clamp `n` to its height
    fn region(&self, top: usize, bottom: usize, n: usize) -> Option<(usize, usize, usize)> {
        if self.rows == 0 {
            return None;
        }
        let top = self.clamp_row(top);
        let bottom = self.clamp_row(bottom);
        if top > bottom {
            return None;
        }
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return None;
        }
        Some((top, bottom, n))
    }

    /// Scroll the region `top..=bottom` up by `n` lines.
    /// The lines that leave the top of the region are returned oldest first,
    /// and blank lines enter at the bottom.
    pub fn scroll_up(&mut self, top: usize, bottom: usize, n: usize, blank: Glyph) -> Vec<Line> {
        let Some((top, bottom, n)) = self.region(top, bottom, n) else {
            return Vec::new();
        };
        let cols = self.cols;
        let region = &mut self.lines[top..=bottom];
        region.rotate_left(n);

        let fresh = region.len() - n;
        let evicted = region[fresh..]
            .iter_mut()
            .map(|line| std::mem::replace(line, Line::blank(cols, blank)))
            .collect();

        for line in region.iter_mut() {
            line.set_dirty(true);
        }
        evicted
    }

    /// Scroll the region `top..=bottom` down by `n` lines.
    /// Lines pushed past the bottom are discarded; blank lines enter at the top.
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize, blank: Glyph) {
        let Some((top, bottom, n)) = self.region(top, bottom, n) else {
            return;
        };
        let region = &mut self.lines[top..=bottom];
        region.rotate_right(n);
        for line in &mut region[..n] {
            line.clear(blank);
        }
        for line in region.iter_mut() {
            line.set_dirty(true);
        }
    }

    /// Remove the top `n` lines, shifting everything up; returns them oldest first.
    /// The grid is left `n` rows short until the next `resize`.
    pub fn drain_top(&mut self, n: usize) -> Vec<Line> {
        let n = n.min(self.lines.len());
        self.rows -= n;
        self.lines.drain(..n).collect()
    }

    /// Resize the grid, truncating or padding at the right and bottom
    pub fn resize(&mut self, cols: usize, rows: usize, blank: Glyph) {
        self.lines.truncate(rows);
        for line in &mut self.lines {
            line.resize(cols, blank);
        }
        while self.lines.len() < rows {
            self.lines.push(Line::blank(cols, blank));
        }
        self.cols = cols;
        self.rows = rows;
    }

    /// Mark rows `top..=bottom` for redraw
    pub fn mark_dirty(&mut self, top: usize, bottom: usize) {
        if self.rows == 0 {
            return;
        }
        let bottom = self.clamp_row(bottom);
        for line in self.lines.iter_mut().take(bottom + 1).skip(top) {
            line.set_dirty(true);
        }
    }

    pub fn mark_all_dirty(&mut self) {
        for line in &mut self.lines {
            line.set_dirty(true);
        }
    }

    pub fn clear_dirty(&mut self) {
        for line in &mut self.lines {
            line.set_dirty(false);
        }
    }

    /// Indices of rows that changed since the last `clear_dirty`
    pub fn dirty_rows(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_dirty())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Blank the other half of a wide pair when `col` is about to be overwritten
fn split_wide(line: &mut Line, col: usize, cols: usize) {
    let Some(old) = line.glyph(col).copied() else {
        return;
    };
    if old.attrs.wide && col + 1 < cols {
        if let Some(next) = line.glyph_mut(col + 1) {
            next.c = ' ';
            next.attrs.wide_dummy = false;
        }
    } else if old.attrs.wide_dummy && col > 0 {
        if let Some(prev) = line.glyph_mut(col - 1) {
            prev.c = ' ';
            prev.attrs.wide = false;
        }
    }
}
