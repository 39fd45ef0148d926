//! Screen model implementation
//!
//! The screen owns the primary and alternate grids, the history ring, the
//! cursor, the scroll region, tab stops, mode flags and the selection. It
//! provides the primitive operations the escape-sequence dispatcher is
//! built from.
//!
//! Rows handed to the selection are absolute (negative rows index history);
//! rows seen by a renderer are "view rows", shifted by the view offset.

use unicode_width::UnicodeWidthChar;

use super::cell::Glyph;
use super::charset::CharsetState;
use super::cursor::{Cursor, SavedCursor};
use super::grid::Grid;
use super::history::History;
use super::line::Line;
use super::modes::Modes;
use super::selection::{LineSource, Selection, SelectionType, SnapMode};

/// Default distance between tab stops
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// The lines of one screen, plus history when it is the primary screen
pub struct ScreenLines<'a> {
    grid: &'a Grid,
    history: Option<&'a History>,
}

impl<'a> ScreenLines<'a> {
    fn new(primary: &'a Grid, alternate: &'a Grid, history: &'a History, alt: bool) -> Self {
        if alt {
            Self {
                grid: alternate,
                history: None,
            }
        } else {
            Self {
                grid: primary,
                history: Some(history),
            }
        }
    }

    /// Line at an absolute row, borrowed from the screen rather than `self`
    pub fn line(&self, row: isize) -> Option<&'a Line> {
        if row >= 0 {
            self.grid.line(row as usize)
        } else {
            self.history?.get((-row - 1) as usize)
        }
    }
}

impl LineSource for ScreenLines<'_> {
    fn cols(&self) -> usize {
        self.grid.cols()
    }

    fn first_row(&self) -> isize {
        -(self.history.map_or(0, History::len) as isize)
    }

    fn last_row(&self) -> isize {
        self.grid.rows() as isize - 1
    }

    fn line(&self, row: isize) -> Option<&Line> {
        ScreenLines::line(self, row)
    }
}

/// The main screen structure
#[derive(Debug, Clone)]
pub struct Screen {
    cols: usize,
    rows: usize,
    primary: Grid,
    alternate: Grid,
    /// Whether the alternate grid is active
    alt: bool,
    /// Lines scrolled off the primary screen
    history: History,
    cursor: Cursor,
    /// DECSC slots, one per screen
    saved: [SavedCursor; 2],
    /// Scroll region top (inclusive)
    scroll_top: usize,
    /// Scroll region bottom (inclusive)
    scroll_bottom: usize,
    tabs: Vec<bool>,
    tab_width: usize,
    pub modes: Modes,
    pub charsets: CharsetState,
    selection: Selection,
    /// How many lines the view is scrolled back into history
    view_offset: usize,
    /// Last printed rune, before charset translation (for REP)
    last_printed: Option<char>,
    /// Every view row needs repainting
    full_redraw: bool,
}

impl Screen {
    /// Create a new screen. `cols` and `rows` must be non-zero.
    pub fn new(cols: usize, rows: usize, history_size: usize, tab_width: usize) -> Self {
        let mut screen = Self {
            cols,
            rows,
            primary: Grid::new(cols, rows),
            alternate: Grid::new(cols, rows),
            alt: false,
            history: History::new(history_size),
            cursor: Cursor::new(),
            saved: Default::default(),
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            tabs: Vec::new(),
            tab_width,
            modes: Modes::new(),
            charsets: CharsetState::new(),
            selection: Selection::default(),
            view_offset: 0,
            last_printed: None,
            full_redraw: true,
        };
        screen.reset_tabs();
        screen
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// True while the alternate screen is active
    pub fn is_alt(&self) -> bool {
        self.alt
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Scroll region as (top, bottom), inclusive
    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bottom)
    }

    pub fn is_tab_stop(&self, col: usize) -> bool {
        self.tabs.get(col).copied().unwrap_or(false)
    }

    /// The active grid
    pub fn grid(&self) -> &Grid {
        if self.alt {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Grid {
        if self.alt {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    /// A live line of the active grid
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.grid().line(row)
    }

    pub fn set_word_delimiters(&mut self, delimiters: &str) {
        self.selection.set_word_delimiters(delimiters);
    }

    // ---------------------------------------------------------------
    // Printing and cursor movement
    // ---------------------------------------------------------------

    /// Print a rune at the cursor, applying charset, pen, wrap and insert mode
    pub fn print(&mut self, c: char) {
        self.last_printed = Some(c);
        let c = self.charsets.translate(c);
        let width = c.width().unwrap_or(0);
        if width == 0 {
            return;
        }

        if self
            .selection
            .is_selected(self.cursor.row as isize, self.cursor.col, self.alt)
        {
            self.clear_selection();
        }

        if self.modes.autowrap && self.cursor.pending_wrap {
            self.wrap_line();
        }

        let cols = self.cols;
        if self.modes.insert && self.cursor.col + width < cols {
            let (row, col, blank) = (self.cursor.row, self.cursor.col, self.cursor.erase_glyph());
            self.grid_mut().insert_blank(row, col, width, blank);
        }

        if self.cursor.col + width > cols {
            if self.modes.autowrap {
                self.wrap_line();
            } else {
                self.newline(true);
            }
        }

        let pen = self.cursor.pen;
        let (row, col) = (self.cursor.row, self.cursor.col);
        let mut glyph = Glyph::with_style(c, pen.fg, pen.bg, pen.attrs.for_print());
        if width == 2 {
            glyph.attrs.wide = true;
        }
        self.grid_mut().put(row, col, glyph);

        if width == 2 && col + 1 < cols {
            let mut dummy = Glyph::with_style(' ', pen.fg, pen.bg, pen.attrs.for_print());
            dummy.attrs.wide_dummy = true;
            self.grid_mut().put(row, col + 1, dummy);
        }

        if col + width < cols {
            self.cursor.col = col + width;
            self.cursor.pending_wrap = false;
        } else {
            self.cursor.pending_wrap = true;
        }
    }

    /// Repeat the last printed rune `n` times (REP)
    pub fn repeat_last(&mut self, n: usize) {
        if let Some(c) = self.last_printed {
            for _ in 0..n {
                self.print(c);
            }
        }
    }

    /// Control codes break the REP chain
    pub fn forget_last_printed(&mut self) {
        self.last_printed = None;
    }

    /// Mark the cursor line as continuing and move to the next row
    fn wrap_line(&mut self) {
        let row = self.cursor.row;
        if let Some(line) = self.grid_mut().line_mut(row) {
            line.set_wrapped(true);
        }
        self.newline(true);
    }

    /// Move down one row, scrolling the region at its bottom
    pub fn newline(&mut self, first_col: bool) {
        let row = self.cursor.row;
        let next = if row == self.scroll_bottom {
            self.scroll_lines_up(self.scroll_top, 1, true);
            row
        } else {
            row + 1
        };
        let col = if first_col { 0 } else { self.cursor.col };
        self.move_to(col, next);
    }

    /// LF, VT, FF (also returns the carriage in LNM)
    pub fn linefeed(&mut self) {
        self.newline(self.modes.linefeed_newline);
    }

    pub fn carriage_return(&mut self) {
        self.move_to(0, self.cursor.row);
    }

    pub fn backspace(&mut self) {
        self.move_to(self.cursor.col.saturating_sub(1), self.cursor.row);
    }

    /// Reverse index (RI) - move up, scrolling the region down at its top
    pub fn reverse_index(&mut self) {
        let row = self.cursor.row;
        if row == self.scroll_top {
            self.scroll_down(1);
        } else {
            self.move_to(self.cursor.col, row.saturating_sub(1));
        }
    }

    /// Move to (col, row), clamped to the region in origin mode
    pub fn move_to(&mut self, col: usize, row: usize) {
        let (min, max) = if self.cursor.origin_mode {
            (self.scroll_top, self.scroll_bottom)
        } else {
            (0, self.rows.saturating_sub(1))
        };
        self.cursor.move_to(col, row, self.cols, min, max);
    }

    /// Absolute move where rows count from the region top in origin mode
    pub fn move_to_origin(&mut self, col: usize, row: usize) {
        let top = if self.cursor.origin_mode {
            self.scroll_top
        } else {
            0
        };
        self.move_to(col, row.saturating_add(top));
    }

    pub fn cursor_up(&mut self, n: usize) {
        self.move_to(self.cursor.col, self.cursor.row.saturating_sub(n));
    }

    pub fn cursor_down(&mut self, n: usize) {
        self.move_to(self.cursor.col, self.cursor.row.saturating_add(n));
    }

    pub fn cursor_forward(&mut self, n: usize) {
        self.move_to(self.cursor.col.saturating_add(n), self.cursor.row);
    }

    pub fn cursor_backward(&mut self, n: usize) {
        self.move_to(self.cursor.col.saturating_sub(n), self.cursor.row);
    }

    /// Enable or disable origin mode (DECOM); both home the cursor
    pub fn set_origin_mode(&mut self, on: bool) {
        self.cursor.origin_mode = on;
        self.move_to_origin(0, 0);
    }

    // ---------------------------------------------------------------
    // Tabs
    // ---------------------------------------------------------------

    fn reset_tabs(&mut self) {
        let width = self.tab_width;
        self.tabs = (0..self.cols)
            .map(|i| width > 0 && i > 0 && i % width == 0)
            .collect();
    }

    /// Move across `n` tab stops; negative counts move backwards (CBT)
    pub fn put_tab(&mut self, n: isize) {
        let cols = self.cols;
        let mut x = self.cursor.col;
        if n > 0 {
            let mut n = n;
            while x < cols && n > 0 {
                n -= 1;
                x += 1;
                while x < cols && !self.tabs[x] {
                    x += 1;
                }
            }
        } else {
            let mut n = n;
            while x > 0 && n < 0 {
                n += 1;
                x -= 1;
                while x > 0 && !self.tabs[x] {
                    x -= 1;
                }
            }
        }
        self.move_to(x, self.cursor.row);
    }

    /// Set a tab stop at the cursor column (HTS)
    pub fn set_tab_stop(&mut self) {
        let col = self.cursor.col;
        if let Some(t) = self.tabs.get_mut(col) {
            *t = true;
        }
    }

    /// Clear the tab stop at the cursor column
    pub fn clear_tab_stop(&mut self) {
        let col = self.cursor.col;
        if let Some(t) = self.tabs.get_mut(col) {
            *t = false;
        }
    }

    pub fn clear_all_tab_stops(&mut self) {
        self.tabs.fill(false);
    }

    // ---------------------------------------------------------------
    // Scrolling
    // ---------------------------------------------------------------

    /// Scroll `top..=scroll_bottom` up by `n`. With `copy_history` the lines
    /// leaving the primary screen's full-height top go into history.
    fn scroll_lines_up(&mut self, top: usize, n: usize, copy_history: bool) {
        let bottom = self.scroll_bottom;
        let blank = self.cursor.erase_glyph();
        let evicted = self.grid_mut().scroll_up(top, bottom, n, blank);
        let count = evicted.len();
        if count == 0 {
            return;
        }

        let into_history =
            copy_history && !self.alt && top == 0 && self.history.capacity() > 0;
        if into_history {
            for line in evicted {
                self.history.push(line);
            }
            // A scrolled-back view stays on the lines it was showing
            if self.view_offset > 0 {
                self.view_offset = (self.view_offset + count).min(self.history.len());
                self.full_redraw = true;
            }
        }
        self.selection_scrolled(top, bottom, -(count as isize), into_history);
    }

    fn scroll_lines_down(&mut self, top: usize, n: usize) {
        let bottom = self.scroll_bottom;
        if n == 0 || top > bottom {
            return;
        }
        let blank = self.cursor.erase_glyph();
        self.grid_mut().scroll_down(top, bottom, n, blank);
        let count = n.min(bottom - top + 1);
        self.selection_scrolled(top, bottom, count as isize, false);
    }

    /// Scroll the region up (SU); the lines are discarded
    pub fn scroll_up(&mut self, n: usize) {
        self.scroll_lines_up(self.scroll_top, n, false);
    }

    /// Scroll the region down (SD)
    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_lines_down(self.scroll_top, n);
    }

    /// Insert lines at the cursor (IL); no-op outside the scroll region
    pub fn insert_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if row >= self.scroll_top && row <= self.scroll_bottom {
            self.scroll_lines_down(row, n);
        }
    }

    /// Delete lines at the cursor (DL); no-op outside the scroll region
    pub fn delete_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if row >= self.scroll_top && row <= self.scroll_bottom {
            self.scroll_lines_up(row, n, false);
        }
    }

    /// Set the scroll region (DECSTBM). Bounds are swapped if reversed and
    /// the cursor goes home.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let last = self.rows.saturating_sub(1);
        let (mut top, mut bottom) = (top.min(last), bottom.min(last));
        if top > bottom {
            std::mem::swap(&mut top, &mut bottom);
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.move_to_origin(0, 0);
    }

    // ---------------------------------------------------------------
    // Erasing and editing
    // ---------------------------------------------------------------

    /// Blank a rectangle with the pen colors; clears a selection it touches
    pub fn clear_region(&mut self, r0: usize, c0: usize, r1: usize, c1: usize) {
        let blank = self.cursor.erase_glyph();
        self.grid_mut().clear_region(r0, c0, r1, c1, blank);
        let (top, bottom) = (r0.min(r1) as isize, r0.max(r1) as isize);
        if self
            .selection
            .touches(top, c0.min(c1), bottom, c0.max(c1), self.alt)
        {
            self.clear_selection();
        }
    }

    /// Erase in display (ED). Mode 3 also drops history.
    pub fn erase_display(&mut self, mode: u16) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let (last_row, last_col) = (self.rows - 1, self.cols - 1);
        match mode {
            0 => {
                self.clear_region(row, col, row, last_col);
                if row < last_row {
                    self.clear_region(row + 1, 0, last_row, last_col);
                }
            },
            1 => {
                if row > 0 {
                    self.clear_region(0, 0, row - 1, last_col);
                }
                self.clear_region(row, 0, row, col);
            },
            2 => self.clear_region(0, 0, last_row, last_col),
            3 => {
                self.clear_region(0, 0, last_row, last_col);
                self.clear_history();
            },
            _ => tracing::debug!("unknown ED mode {}", mode),
        }
    }

    /// Erase in line (EL)
    pub fn erase_line(&mut self, mode: u16) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let last_col = self.cols - 1;
        match mode {
            0 => self.clear_region(row, col, row, last_col),
            1 => self.clear_region(row, 0, row, col),
            2 => self.clear_region(row, 0, row, last_col),
            _ => tracing::debug!("unknown EL mode {}", mode),
        }
    }

    /// Erase `n` characters from the cursor (ECH)
    pub fn erase_chars(&mut self, n: usize) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let end = col.saturating_add(n.max(1) - 1);
        self.clear_region(row, col, row, end);
    }

    /// Insert blanks at the cursor (ICH)
    pub fn insert_blank(&mut self, n: usize) {
        let (row, col, blank) = (self.cursor.row, self.cursor.col, self.cursor.erase_glyph());
        self.grid_mut().insert_blank(row, col, n, blank);
    }

    /// Delete characters at the cursor (DCH)
    pub fn delete_chars(&mut self, n: usize) {
        let (row, col, blank) = (self.cursor.row, self.cursor.col, self.cursor.erase_glyph());
        self.grid_mut().delete_chars(row, col, n, blank);
    }

    /// Fill the screen with `E` (DECALN)
    pub fn alignment_test(&mut self) {
        let pen = self.cursor.pen;
        let glyph = Glyph::with_style('E', pen.fg, pen.bg, pen.attrs.for_print());
        let (rows, cols) = (self.rows, self.cols);
        let grid = self.grid_mut();
        for row in 0..rows {
            for col in 0..cols {
                grid.put(row, col, glyph);
            }
        }
    }

    // ---------------------------------------------------------------
    // Cursor save/restore and screen switching
    // ---------------------------------------------------------------

    /// Save cursor state (DECSC) into the active screen's slot
    pub fn save_cursor(&mut self) {
        self.saved[self.alt as usize] = self.cursor.save();
    }

    /// Restore cursor state (DECRC) from the active screen's slot
    pub fn restore_cursor(&mut self) {
        let saved = self.saved[self.alt as usize].clone();
        self.cursor.restore(&saved);
        self.move_to(saved.col, saved.row);
    }

    /// Swap the active grid
    pub fn swap_screen(&mut self) {
        self.alt = !self.alt;
        self.view_offset = 0;
        self.full_redraw = true;
    }

    /// DEC modes 47, 1047, 1048 and 1049
    pub fn set_alt_screen(&mut self, mode: u16, on: bool) {
        match mode {
            1048 => {
                if on {
                    self.save_cursor();
                } else {
                    self.restore_cursor();
                }
            },
            47 | 1047 | 1049 => {
                let cursor_too = mode == 1049;
                if cursor_too {
                    if on {
                        self.save_cursor();
                    } else {
                        self.restore_cursor();
                    }
                }
                if self.alt {
                    self.clear_region(0, 0, self.rows - 1, self.cols - 1);
                }
                if on != self.alt {
                    self.swap_screen();
                }
                if cursor_too {
                    if on {
                        self.save_cursor();
                        self.clear_region(0, 0, self.rows - 1, self.cols - 1);
                    } else {
                        self.restore_cursor();
                    }
                }
            },
            _ => tracing::debug!("not a screen-switch mode: {}", mode),
        }
    }

    // ---------------------------------------------------------------
    // Reset and resize
    // ---------------------------------------------------------------

    /// Full reset (RIS). History is kept.
    pub fn reset(&mut self) {
        self.cursor = Cursor::new();
        self.saved = Default::default();
        self.modes.reset();
        self.charsets.reset();
        self.reset_tabs();
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;

        let (last_row, last_col) = (self.rows - 1, self.cols - 1);
        let blank = Glyph::default();
        self.primary.clear_region(0, 0, last_row, last_col, blank);
        self.alternate.clear_region(0, 0, last_row, last_col, blank);
        self.alt = false;
        self.selection.clear();
        self.view_offset = 0;
        self.last_printed = None;
        self.full_redraw = true;
    }

    /// Soft reset (DECSTR)
    pub fn soft_reset(&mut self) {
        self.cursor.reset_attributes();
        self.cursor.origin_mode = false;
        self.cursor.pending_wrap = false;
        self.modes.insert = false;
        self.modes.autowrap = true;
        self.modes.cursor_visible = true;
        self.modes.cursor_keys_application = false;
        self.modes.keypad_application = false;
        self.charsets.reset();
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        self.saved[self.alt as usize] = SavedCursor::default();
    }

    /// Resize both screens. Rows slide up to keep the cursor visible (lines
    /// leaving the primary screen go into history), columns are truncated
    /// or padded, and the cursor and selection are re-clamped.
    /// Zero dimensions are ignored.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        if cols == 0 || rows == 0 || (cols == self.cols && rows == self.rows) {
            return;
        }
        let blank = self.cursor.erase_glyph();

        let slide = (self.cursor.row + 1).saturating_sub(rows);
        if slide > 0 {
            let drained = self.primary.drain_top(slide);
            let count = drained.len();
            for line in drained {
                self.history.push(line);
            }
            self.alternate.drain_top(slide);
            self.cursor.row -= slide;

            // Same anchoring as scrolling into history: a full ring evicts
            // as many lines as it takes, so the offset grows by the count
            if self.view_offset > 0 {
                self.view_offset = (self.view_offset + count).min(self.history.len());
            }

            let alt = self.selection.is_alt();
            let src = ScreenLines::new(&self.primary, &self.alternate, &self.history, alt);
            let into_history = !alt && self.history.capacity() > 0;
            self.selection
                .on_scroll(&src, 0, self.rows as isize - 1, -(slide as isize), into_history);
        }

        self.primary.resize(cols, rows, blank);
        self.alternate.resize(cols, rows, blank);
        self.history.resize_columns(cols, blank);
        self.resize_tabs(cols);

        self.cols = cols;
        self.rows = rows;
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
        self.move_to(self.cursor.col, self.cursor.row);

        self.view_offset = self.view_offset.min(self.history.len());
        self.reclamp_selection();
        self.mark_all_dirty();
        tracing::debug!("screen resized to {}x{}", cols, rows);
    }

    /// Extend tab stops into new columns, continuing the last stop's spacing
    fn resize_tabs(&mut self, cols: usize) {
        let old = self.tabs.len();
        self.tabs.resize(cols, false);
        if cols <= old || self.tab_width == 0 {
            return;
        }
        let last = (1..old).rev().find(|&i| self.tabs[i]).unwrap_or(0);
        let mut i = last + self.tab_width;
        while i < cols {
            if i >= old {
                self.tabs[i] = true;
            }
            i += self.tab_width;
        }
    }

    // ---------------------------------------------------------------
    // History and the view
    // ---------------------------------------------------------------

    /// Current view offset into history (0 = live screen)
    pub fn view_offset(&self) -> usize {
        self.view_offset
    }

    /// Line shown at `view_row` with the current view offset
    pub fn view_line(&self, view_row: usize) -> Option<&Line> {
        self.line_at(view_row, self.view_offset)
    }

    /// Line shown at `view_row` when scrolled back by `offset` lines.
    /// The offset is clamped to the stored history.
    pub fn line_at(&self, view_row: usize, offset: usize) -> Option<&Line> {
        if view_row >= self.rows {
            return None;
        }
        let offset = if self.alt {
            0
        } else {
            offset.min(self.history.len())
        };
        self.lines(self.alt)
            .line(view_row as isize - offset as isize)
    }

    fn lines(&self, alt: bool) -> ScreenLines<'_> {
        ScreenLines::new(&self.primary, &self.alternate, &self.history, alt)
    }

    /// Move the view by `delta` lines (positive = back into history).
    /// Returns true if the offset changed.
    pub fn scroll_view(&mut self, delta: isize) -> bool {
        let target = (self.view_offset as isize).saturating_add(delta).max(0) as usize;
        self.scroll_view_to(target)
    }

    /// Set the view offset, clamped to `[0, history len]`
    pub fn scroll_view_to(&mut self, offset: usize) -> bool {
        let offset = if self.alt {
            0
        } else {
            offset.min(self.history.len())
        };
        if offset == self.view_offset {
            return false;
        }
        self.view_offset = offset;
        self.full_redraw = true;
        true
    }

    /// Drop the oldest history lines so at most `keep` remain
    pub fn trim_history(&mut self, keep: usize) {
        self.history.trim(keep);
        self.history_changed();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history_changed();
    }

    fn history_changed(&mut self) {
        if self.view_offset > self.history.len() {
            self.view_offset = self.history.len();
            self.full_redraw = true;
        }
        self.reclamp_selection();
    }

    // ---------------------------------------------------------------
    // Selection (view-row coordinates)
    // ---------------------------------------------------------------

    fn view_to_abs(&self, view_row: usize) -> isize {
        view_row as isize - self.view_offset as isize
    }

    pub fn start_selection(&mut self, view_row: usize, col: usize, snap: SnapMode) {
        let before = self.selection.rows();
        let row = self.view_to_abs(view_row);
        let src = ScreenLines::new(&self.primary, &self.alternate, &self.history, self.alt);
        self.selection.start(&src, row, col, snap, self.alt);
        self.mark_rows_dirty(before);
        self.mark_rows_dirty(self.selection.rows());
    }

    pub fn extend_selection(&mut self, view_row: usize, col: usize, kind: SelectionType, done: bool) {
        let before = self.selection.rows();
        let row = self.view_to_abs(view_row);
        let src = ScreenLines::new(&self.primary, &self.alternate, &self.history, self.alt);
        self.selection.extend(&src, row, col, kind, done);
        self.mark_rows_dirty(before);
        self.mark_rows_dirty(self.selection.rows());
    }

    pub fn clear_selection(&mut self) {
        let before = self.selection.clear();
        self.mark_rows_dirty(before);
    }

    /// Check if the cell at a view position is selected
    pub fn is_selected(&self, view_row: usize, col: usize) -> bool {
        self.selection
            .is_selected(self.view_to_abs(view_row), col, self.alt)
    }

    pub fn selection_text(&self) -> Option<String> {
        self.selection.text(&self.lines(self.selection.is_alt()))
    }

    fn selection_scrolled(&mut self, top: usize, bottom: usize, delta: isize, into_history: bool) {
        if self.selection.is_alt() != self.alt {
            return;
        }
        let before = self.selection.rows();
        let src = ScreenLines::new(&self.primary, &self.alternate, &self.history, self.alt);
        self.selection
            .on_scroll(&src, top as isize, bottom as isize, delta, into_history);
        if self.selection.rows().is_none() {
            self.mark_rows_dirty(before);
        }
    }

    fn reclamp_selection(&mut self) {
        let before = self.selection.rows();
        let src = ScreenLines::new(
            &self.primary,
            &self.alternate,
            &self.history,
            self.selection.is_alt(),
        );
        self.selection.reclamp(&src);
        if self.selection.rows() != before {
            self.mark_rows_dirty(before);
        }
    }

    // ---------------------------------------------------------------
    // Dirty tracking
    // ---------------------------------------------------------------

    fn mark_rows_dirty(&mut self, rows: Option<(isize, isize)>) {
        let Some((top, bottom)) = rows else {
            return;
        };
        if top < 0 || self.view_offset > 0 {
            self.full_redraw = true;
        }
        if bottom >= 0 {
            let top = top.max(0) as usize;
            self.grid_mut().mark_dirty(top, bottom as usize);
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.full_redraw = true;
        self.primary.mark_all_dirty();
        self.alternate.mark_all_dirty();
    }

    /// Check if anything visible changed since the last `clear_dirty`
    pub fn is_dirty(&self) -> bool {
        self.full_redraw || self.grid().lines().any(Line::is_dirty)
    }

    /// View rows that need repainting
    pub fn dirty_rows(&self) -> Vec<usize> {
        if self.full_redraw {
            return (0..self.rows).collect();
        }
        let offset = self.view_offset;
        self.grid()
            .dirty_rows()
            .into_iter()
            .map(|row| row + offset)
            .filter(|&row| row < self.rows)
            .collect()
    }

    pub fn clear_dirty(&mut self) {
        self.full_redraw = false;
        self.primary.clear_dirty();
        self.alternate.clear_dirty();
    }
}
