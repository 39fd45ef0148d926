//! Selection handling for terminal text selection
//!
//! Selections are stored in absolute row coordinates: rows `0..rows` are
//! live screen rows and negative rows reach into history (`-1` is the most
//! recent history line). Because scrolling content into history shifts
//! every absolute row by the same amount, a selection survives scrolling
//! by translating its rows, and is cleared only once it leaves the
//! retained lines.
//!
//! Every mutation of the underlying lines must be followed by either
//! [`Selection::on_scroll`] or [`Selection::reclamp`]; those are the only
//! places that restore the coordinate invariants.

use serde::{Deserialize, Serialize};

use super::cell::Glyph;
use super::line::Line;

/// Read access to the lines a selection is made over
pub trait LineSource {
    /// Width of every line
    fn cols(&self) -> usize;

    /// Smallest addressable row (negative when history is present)
    fn first_row(&self) -> isize;

    /// Last live screen row
    fn last_row(&self) -> isize;

    /// Line at an absolute row
    fn line(&self, row: isize) -> Option<&Line>;

    fn line_len(&self, row: isize) -> usize {
        self.line(row).map(Line::len).unwrap_or(0)
    }

    fn is_wrapped(&self, row: isize) -> bool {
        self.line(row).map(Line::is_wrapped).unwrap_or(false)
    }

    fn glyph(&self, row: isize, col: usize) -> Option<Glyph> {
        self.line(row).and_then(|l| l.glyph(col)).copied()
    }
}

/// A position in absolute selection coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionPoint {
    /// Row index (negative rows are history)
    pub row: isize,
    /// Column index (0-based)
    pub col: usize,
}

impl SelectionPoint {
    pub fn new(row: isize, col: usize) -> Self {
        Self { row, col }
    }

    /// Check if this point is before another point
    pub fn is_before(&self, other: &SelectionPoint) -> bool {
        if self.row != other.row {
            self.row < other.row
        } else {
            self.col < other.col
        }
    }
}

/// Selection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionState {
    /// Nothing selected
    #[default]
    None,
    /// Button pressed but the pointer has not moved yet
    Empty,
    /// Pointer is being dragged
    Dragging,
    /// Drag finished, selection is stable
    Selected,
}

/// Selection shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionType {
    /// Stream selection following the text flow
    #[default]
    Regular,
    /// Block selection (same columns on every row)
    Rectangular,
}

/// Snapping applied to both ends of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// Character granularity
    #[default]
    None,
    /// Whole words (double-click)
    Word,
    /// Whole lines, following wrapped continuations (triple-click)
    Line,
}

/// Text selection over a screen and its history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    state: SelectionState,
    kind: SelectionType,
    snap: SnapMode,
    /// Made on the alternate screen
    alt: bool,
    /// Where the button went down
    anchor: SelectionPoint,
    /// Where the pointer currently is
    head: SelectionPoint,
    /// Normalized, snapped start
    begin: SelectionPoint,
    /// Normalized, snapped end (inclusive)
    end: SelectionPoint,
    word_delimiters: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(" ")
    }
}

impl Selection {
    pub fn new(word_delimiters: &str) -> Self {
        Self {
            state: SelectionState::None,
            kind: SelectionType::Regular,
            snap: SnapMode::None,
            alt: false,
            anchor: SelectionPoint::default(),
            head: SelectionPoint::default(),
            begin: SelectionPoint::default(),
            end: SelectionPoint::default(),
            word_delimiters: word_delimiters.to_string(),
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn kind(&self) -> SelectionType {
        self.kind
    }

    pub fn snap(&self) -> SnapMode {
        self.snap
    }

    /// True if the selection was made on the alternate screen
    pub fn is_alt(&self) -> bool {
        self.alt
    }

    /// Normalized start and end (inclusive)
    pub fn bounds(&self) -> (SelectionPoint, SelectionPoint) {
        (self.begin, self.end)
    }

    /// Rows touched by a visible selection
    pub fn rows(&self) -> Option<(isize, isize)> {
        self.is_active().then_some((self.begin.row, self.end.row))
    }

    /// A visible selection exists (dragging or finished)
    pub fn is_active(&self) -> bool {
        matches!(self.state, SelectionState::Dragging | SelectionState::Selected)
    }

    pub fn set_word_delimiters(&mut self, delimiters: &str) {
        self.word_delimiters = delimiters.to_string();
    }

    /// Begin a new selection at (row, col), discarding any previous one.
    /// With a snap mode the selection becomes visible immediately.
    pub fn start<S: LineSource>(&mut self, src: &S, row: isize, col: usize, snap: SnapMode, alt: bool) {
        self.clear();
        self.state = SelectionState::Empty;
        self.kind = SelectionType::Regular;
        self.snap = snap;
        self.alt = alt;
        self.anchor = SelectionPoint::new(row, col);
        self.head = self.anchor;
        self.normalize(src);

        if snap != SnapMode::None {
            self.state = SelectionState::Dragging;
        }
    }

    /// Move the selection head to (row, col). `done` finishes the drag;
    /// finishing a click that never moved clears the selection.
    pub fn extend<S: LineSource>(&mut self, src: &S, row: isize, col: usize, kind: SelectionType, done: bool) {
        match self.state {
            SelectionState::None => return,
            SelectionState::Empty if done && SelectionPoint::new(row, col) == self.anchor => {
                self.clear();
                return;
            },
            _ => {},
        }

        self.head = SelectionPoint::new(row, col);
        self.kind = kind;
        self.normalize(src);
        self.state = if done {
            SelectionState::Selected
        } else {
            SelectionState::Dragging
        };
    }

    /// Drop the selection. Returns the rows it covered, if it was visible.
    pub fn clear(&mut self) -> Option<(isize, isize)> {
        let rows = self.rows();
        self.state = SelectionState::None;
        rows
    }

    /// Selected column range on `row`, inclusive
    pub fn row_span(&self, row: isize) -> Option<(usize, usize)> {
        if !self.is_active() || row < self.begin.row || row > self.end.row {
            return None;
        }
        match self.kind {
            SelectionType::Rectangular => Some((self.begin.col, self.end.col)),
            SelectionType::Regular => {
                let first = if row == self.begin.row { self.begin.col } else { 0 };
                let last = if row == self.end.row {
                    self.end.col
                } else {
                    usize::MAX
                };
                (first <= last).then_some((first, last))
            },
        }
    }

    /// Check if the cell at (row, col) on the given screen is selected
    pub fn is_selected(&self, row: isize, col: usize, alt: bool) -> bool {
        if self.alt != alt {
            return false;
        }
        self.row_span(row)
            .is_some_and(|(first, last)| col >= first && col <= last)
    }

    /// Check if any cell of the rectangle is selected
    pub fn touches(&self, top: isize, left: usize, bottom: isize, right: usize, alt: bool) -> bool {
        if self.alt != alt || !self.is_active() {
            return false;
        }
        (top.max(self.begin.row)..=bottom.min(self.end.row)).any(|row| {
            self.row_span(row)
                .is_some_and(|(first, last)| first <= right && left <= last)
        })
    }

    /// Restore invariants after rows `top..=bottom` moved by `delta`.
    /// With `into_history` every row above `bottom` moved too (lines were
    /// pushed into history), so only crossing `bottom` or falling off the
    /// retained history invalidates the selection.
    pub fn on_scroll<S: LineSource>(
        &mut self,
        src: &S,
        top: isize,
        bottom: isize,
        delta: isize,
        into_history: bool,
    ) {
        if self.state == SelectionState::None {
            return;
        }
        let low = if into_history { isize::MIN } else { top };
        let inside = |row: isize| row >= low && row <= bottom;

        if inside(self.begin.row) != inside(self.end.row) {
            self.clear();
            return;
        }
        if !inside(self.begin.row) {
            return;
        }

        self.anchor.row += delta;
        self.head.row += delta;
        let low = if into_history { src.first_row() } else { top };
        let out = |row: isize| row < low || row > bottom;
        if out(self.anchor.row) || out(self.head.row) {
            self.clear();
        } else {
            self.normalize(src);
        }
    }

    /// Re-validate against the current lines after a resize or history trim.
    /// Coordinates that can no longer be expressed clear the selection.
    pub fn reclamp<S: LineSource>(&mut self, src: &S) {
        if self.state == SelectionState::None {
            return;
        }
        let (first, last, cols) = (src.first_row(), src.last_row(), src.cols());
        let invalid =
            |p: &SelectionPoint| p.row < first || p.row > last || p.col >= cols;
        if invalid(&self.anchor) || invalid(&self.head) {
            self.clear();
        } else {
            self.normalize(src);
        }
    }

    /// Selected text, rows joined by `\n` except across wrapped lines
    pub fn text<S: LineSource>(&self, src: &S) -> Option<String> {
        if !self.is_active() {
            return None;
        }
        let cols = src.cols();
        let mut out = String::new();

        let mut row = self.begin.row;
        while row <= self.end.row && row <= src.last_row() {
            let Some(line) = src.line(row) else {
                row += 1;
                continue;
            };
            let len = line.len();
            if len == 0 {
                out.push('\n');
                row += 1;
                continue;
            }

            let (first, last) = match self.kind {
                SelectionType::Rectangular => (self.begin.col, self.end.col),
                SelectionType::Regular => (
                    if row == self.begin.row { self.begin.col } else { 0 },
                    if row == self.end.row { self.end.col } else { cols.saturating_sub(1) },
                ),
            };
            let continues =
                self.kind == SelectionType::Regular && line.is_wrapped() && row < self.end.row;

            let upto = last.min(len - 1);
            let glyphs = line.glyphs();
            let mut chunk: String = if first <= upto {
                glyphs[first..=upto]
                    .iter()
                    .filter(|g| !g.is_wide_continuation())
                    .map(|g| g.c)
                    .collect()
            } else {
                String::new()
            };
            if !continues {
                let trimmed = chunk.trim_end_matches(' ').len();
                chunk.truncate(trimmed);
            }
            out.push_str(&chunk);

            if (row < self.end.row || last >= len) && !continues {
                out.push('\n');
            }
            row += 1;
        }
        Some(out)
    }

    fn is_delim(&self, c: char) -> bool {
        c != '\0' && self.word_delimiters.contains(c)
    }

    /// Order the anchor and head into begin/end, apply snapping and clamp
    fn normalize<S: LineSource>(&mut self, src: &S) {
        let (a, h) = (self.anchor, self.head);
        if self.kind == SelectionType::Regular && a.row != h.row {
            let (upper, lower) = if a.row < h.row { (a, h) } else { (h, a) };
            self.begin.col = upper.col;
            self.end.col = lower.col;
        } else {
            self.begin.col = a.col.min(h.col);
            self.end.col = a.col.max(h.col);
        }
        self.begin.row = a.row.min(h.row);
        self.end.row = a.row.max(h.row);

        self.begin = self.snap_point(src, self.begin, -1);
        self.end = self.snap_point(src, self.end, 1);

        let last_row = src.last_row();
        self.begin.row = self.begin.row.min(last_row);
        self.end.row = self.end.row.min(last_row);

        if self.kind == SelectionType::Rectangular {
            return;
        }
        // Stream selections run to the end of lines they leave
        let len = src.line_len(self.begin.row);
        if len < self.begin.col {
            self.begin.col = len;
        }
        if src.line_len(self.end.row) <= self.end.col {
            self.end.col = src.cols().saturating_sub(1);
        }
    }

    fn snap_point<S: LineSource>(&self, src: &S, point: SelectionPoint, direction: isize) -> SelectionPoint {
        match self.snap {
            SnapMode::None => point,
            SnapMode::Word => self.snap_word(src, point, direction),
            SnapMode::Line => snap_line(src, point, direction),
        }
    }

    /// Walk from `point` while the glyph class (delimiter or not) stays the
    /// same, crossing into neighbouring rows only along wrapped lines.
    fn snap_word<S: LineSource>(&self, src: &S, mut point: SelectionPoint, direction: isize) -> SelectionPoint {
        let cols = src.cols() as isize;
        let Some(mut prev) = src.glyph(point.row, point.col) else {
            return point;
        };
        let mut prev_delim = self.is_delim(prev.c);

        loop {
            let mut col = point.col as isize + direction;
            let mut row = point.row;
            if col < 0 || col >= cols {
                row += direction;
                col = (col + cols) % cols;
                if row < src.first_row() || row > src.last_row() {
                    break;
                }
                let joint = if direction > 0 { point.row } else { row };
                if !src.is_wrapped(joint) {
                    break;
                }
            }

            let col = col as usize;
            if col >= src.line_len(row) {
                break;
            }
            let Some(glyph) = src.glyph(row, col) else {
                break;
            };
            let delim = self.is_delim(glyph.c);
            if !glyph.is_wide_continuation()
                && (delim != prev_delim || (delim && glyph.c != prev.c))
            {
                break;
            }

            point = SelectionPoint::new(row, col);
            prev = glyph;
            prev_delim = delim;
        }
        point
    }
}

/// Extend to the line edge, continuing over wrapped neighbours
fn snap_line<S: LineSource>(src: &S, mut point: SelectionPoint, direction: isize) -> SelectionPoint {
    if direction < 0 {
        point.col = 0;
        while point.row > src.first_row() && src.is_wrapped(point.row - 1) {
            point.row -= 1;
        }
    } else {
        point.col = src.cols().saturating_sub(1);
        while point.row < src.last_row() && src.is_wrapped(point.row) {
            point.row += 1;
        }
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lines indexed from `first_row`
    struct Lines {
        first: isize,
        lines: Vec<Line>,
        cols: usize,
    }

    impl Lines {
        fn new(first: isize, texts: &[&str], cols: usize) -> Self {
            Self {
                first,
                lines: texts.iter().map(|t| Line::from_text(t, cols)).collect(),
                cols,
            }
        }

        fn wrap(&mut self, row: isize) {
            let idx = (row - self.first) as usize;
            self.lines[idx].set_wrapped(true);
        }
    }

    impl LineSource for Lines {
        fn cols(&self) -> usize {
            self.cols
        }

        fn first_row(&self) -> isize {
            self.first
        }

        fn last_row(&self) -> isize {
            self.first + self.lines.len() as isize - 1
        }

        fn line(&self, row: isize) -> Option<&Line> {
            let idx = usize::try_from(row - self.first).ok()?;
            self.lines.get(idx)
        }
    }

    fn drag(src: &Lines, from: (isize, usize), to: (isize, usize), kind: SelectionType) -> Selection {
        let mut sel = Selection::default();
        sel.start(src, from.0, from.1, SnapMode::None, false);
        sel.extend(src, to.0, to.1, kind, true);
        sel
    }

    #[test]
    fn test_selection_point_ordering() {
        let p1 = SelectionPoint::new(0, 5);
        let p2 = SelectionPoint::new(0, 10);
        let p3 = SelectionPoint::new(-1, 70);

        assert!(p1.is_before(&p2));
        assert!(p3.is_before(&p1));
        assert!(!p2.is_before(&p1));
    }

    #[test]
    fn test_single_line_selection() {
        let src = Lines::new(0, &["hello world", "second"], 20);
        let sel = drag(&src, (0, 0), (0, 4), SelectionType::Regular);

        assert_eq!(sel.state(), SelectionState::Selected);
        assert!(sel.is_selected(0, 2, false));
        assert!(!sel.is_selected(0, 5, false));
        assert!(!sel.is_selected(0, 2, true));
        assert_eq!(sel.text(&src).unwrap(), "hello");
    }

    #[test]
    fn test_multi_line_selection_text() {
        let src = Lines::new(0, &["first line", "second", "third"], 20);
        let sel = drag(&src, (0, 6), (2, 2), SelectionType::Regular);
        assert_eq!(sel.text(&src).unwrap(), "line\nsecond\nthi");
        // Middle rows are fully selected
        assert!(sel.is_selected(1, 19, false));
    }

    #[test]
    fn test_backwards_drag_normalizes() {
        let src = Lines::new(0, &["abcdef", "ghijkl"], 10);
        let sel = drag(&src, (1, 2), (0, 3), SelectionType::Regular);
        let (begin, end) = sel.bounds();
        assert_eq!((begin.row, begin.col), (0, 3));
        assert_eq!((end.row, end.col), (1, 2));
        assert_eq!(sel.text(&src).unwrap(), "def\nghi");
    }

    #[test]
    fn test_wrapped_line_has_no_break() {
        let mut src = Lines::new(0, &["abcde", "fgh"], 5);
        src.wrap(0);
        let sel = drag(&src, (0, 0), (1, 2), SelectionType::Regular);
        assert_eq!(sel.text(&src).unwrap(), "abcdefgh");
    }

    #[test]
    fn test_rectangular_selection() {
        let src = Lines::new(0, &["abcdef", "ghijkl", "mnopqr"], 10);
        let sel = drag(&src, (0, 1), (2, 3), SelectionType::Rectangular);
        assert!(sel.is_selected(1, 2, false));
        assert!(!sel.is_selected(1, 4, false));
        assert_eq!(sel.text(&src).unwrap(), "bcd\nhij\nnop");
    }

    #[test]
    fn test_empty_click_clears() {
        let src = Lines::new(0, &["abc"], 10);
        let mut sel = Selection::default();
        sel.start(&src, 0, 1, SnapMode::None, false);
        assert_eq!(sel.state(), SelectionState::Empty);
        assert!(!sel.is_selected(0, 1, false));

        sel.extend(&src, 0, 1, SelectionType::Regular, true);
        assert_eq!(sel.state(), SelectionState::None);
        assert!(sel.text(&src).is_none());
    }

    #[test]
    fn test_word_snap() {
        let src = Lines::new(0, &["foo bar baz"], 20);
        let mut sel = Selection::default();
        sel.start(&src, 0, 5, SnapMode::Word, false);
        assert_eq!(sel.state(), SelectionState::Dragging);
        assert_eq!(sel.text(&src).unwrap(), "bar");
    }

    #[test]
    fn test_word_snap_follows_wrap() {
        let mut src = Lines::new(0, &["xx abc", "def yy"], 6);
        src.wrap(0);
        let mut sel = Selection::default();
        sel.start(&src, 1, 1, SnapMode::Word, false);
        assert_eq!(sel.text(&src).unwrap(), "abcdef");
    }

    #[test]
    fn test_custom_delimiters() {
        let src = Lines::new(0, &["a.b-c d"], 10);
        let mut sel = Selection::new(" .");
        sel.start(&src, 0, 2, SnapMode::Word, false);
        assert_eq!(sel.text(&src).unwrap(), "b-c");
    }

    #[test]
    fn test_line_snap() {
        let mut src = Lines::new(0, &["one", "twotwo", "more", "four"], 6);
        src.wrap(1);
        let mut sel = Selection::default();
        sel.start(&src, 1, 2, SnapMode::Line, false);
        assert_eq!(sel.text(&src).unwrap(), "twotwomore\n");
    }

    #[test]
    fn test_on_scroll_into_history_keeps_selection() {
        let src = Lines::new(-1, &["hello", "world", ""], 10);
        let mut sel = Selection::default();
        sel.start(&src, 1, 0, SnapMode::None, false);
        sel.extend(&src, 1, 4, SelectionType::Regular, true);
        // "world" sat on row 1 before "hello" scrolled into history
        sel.on_scroll(&src, 0, 1, -1, true);
        assert_eq!(sel.rows(), Some((0, 0)));
        assert_eq!(sel.text(&src).unwrap(), "world");
    }

    #[test]
    fn test_on_scroll_out_of_history_clears() {
        let src = Lines::new(0, &["a", "b"], 10);
        let mut sel = drag(&src, (0, 0), (0, 1), SelectionType::Regular);
        sel.on_scroll(&src, 0, 1, -1, true);
        assert_eq!(sel.state(), SelectionState::None);
    }

    #[test]
    fn test_on_scroll_crossing_region_clears() {
        let src = Lines::new(0, &["a", "b", "c", "d"], 10);
        let mut sel = drag(&src, (0, 0), (2, 0), SelectionType::Regular);
        sel.on_scroll(&src, 1, 3, -1, false);
        assert_eq!(sel.state(), SelectionState::None);
    }

    #[test]
    fn test_on_scroll_outside_region_untouched() {
        let src = Lines::new(0, &["a", "b", "c", "d"], 10);
        let mut sel = drag(&src, (0, 0), (0, 5), SelectionType::Regular);
        sel.on_scroll(&src, 1, 3, -1, false);
        assert_eq!(sel.rows(), Some((0, 0)));
    }

    #[test]
    fn test_reclamp_narrow_clears() {
        let src = Lines::new(0, &["abcdefgh", "ijklmnop"], 8);
        let mut sel = drag(&src, (0, 6), (1, 7), SelectionType::Regular);
        let narrow = Lines::new(0, &["abcd", "ijkl"], 4);
        sel.reclamp(&narrow);
        assert_eq!(sel.state(), SelectionState::None);
    }

    #[test]
    fn test_reclamp_within_bounds_preserves_text() {
        let src = Lines::new(0, &["abcdefgh", "ijklmnop"], 8);
        let mut sel = drag(&src, (0, 1), (0, 3), SelectionType::Regular);
        let wider = Lines::new(0, &["abcdefgh", "ijklmnop", ""], 12);
        sel.reclamp(&wider);
        assert_eq!(sel.text(&wider).unwrap(), "bcd");
    }

    #[test]
    fn test_touches_region() {
        let src = Lines::new(0, &["abcdef", "ghijkl"], 10);
        let sel = drag(&src, (0, 2), (0, 4), SelectionType::Regular);
        assert!(sel.touches(0, 4, 1, 9, false));
        assert!(!sel.touches(0, 5, 1, 9, false));
        assert!(!sel.touches(1, 0, 1, 9, false));
    }
}
