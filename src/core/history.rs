//! History ring
//!
//! Lines that scroll off the top of the primary screen are kept here.
//! It is a ring buffer with a capacity fixed at construction: once full,
//! every push overwrites the oldest line. Storage grows lazily, so a large
//! configured capacity costs nothing until the lines actually arrive.

use serde::{Deserialize, Serialize};

use super::cell::Glyph;
use super::line::Line;

/// Ring buffer of scrolled-off lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// Backing storage, at most `capacity` long
    lines: Vec<Line>,
    /// Index of the oldest line
    head: usize,
    /// Number of lines currently stored
    len: usize,
    /// Maximum number of lines to store
    capacity: usize,
}

impl History {
    /// Create an empty ring holding at most `capacity` lines
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Vec::new(),
            head: 0,
            len: 0,
            capacity,
        }
    }

    /// Number of stored lines
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a line, evicting the oldest one when full
    pub fn push(&mut self, mut line: Line) {
        if self.capacity == 0 {
            return;
        }
        line.set_dirty(false);

        if self.lines.len() < self.capacity {
            // Storage still growing; the ring is contiguous from `head`
            let idx = (self.head + self.len) % self.capacity;
            if idx == self.lines.len() {
                self.lines.push(line);
            } else {
                self.lines[idx] = line;
            }
            self.len += 1;
        } else {
            let idx = (self.head + self.len) % self.capacity;
            self.lines[idx] = line;
            if self.len < self.capacity {
                self.len += 1;
            } else {
                self.head = (self.head + 1) % self.capacity;
            }
        }
    }

    /// Get a line by distance from the newest one (0 = most recent)
    pub fn get(&self, offset: usize) -> Option<&Line> {
        if offset >= self.len {
            return None;
        }
        self.lines.get(self.physical(self.len - 1 - offset))
    }

    /// Map a logical index (0 = oldest) to a slot in `lines`
    fn physical(&self, index: usize) -> usize {
        if self.lines.len() < self.capacity {
            self.head + index
        } else {
            (self.head + index) % self.capacity
        }
    }

    /// Drop every stored line and release the storage
    pub fn clear(&mut self) {
        self.lines = Vec::new();
        self.head = 0;
        self.len = 0;
    }

    /// Shrink the stored lines to at most `keep`, dropping the oldest.
    /// The capacity is unchanged.
    pub fn trim(&mut self, keep: usize) {
        if keep >= self.len {
            return;
        }
        let kept: Vec<Line> = self.iter().skip(self.len - keep).cloned().collect();
        self.len = kept.len();
        self.lines = kept;
        self.head = 0;
    }

    /// Bring every stored line to `cols` columns
    pub fn resize_columns(&mut self, cols: usize, blank: Glyph) {
        for line in &mut self.lines {
            line.resize(cols, blank);
            line.set_dirty(false);
        }
    }

    /// Iterate over stored lines, oldest first
    pub fn iter(&self) -> HistoryIter<'_> {
        HistoryIter {
            history: self,
            index: 0,
        }
    }
}

/// Iterator over history lines, oldest to newest
pub struct HistoryIter<'a> {
    history: &'a History,
    index: usize,
}

impl<'a> Iterator for HistoryIter<'a> {
    type Item = &'a Line;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.history.len {
            return None;
        }
        let line = self.history.lines.get(self.history.physical(self.index))?;
        self.index += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.history.len.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for HistoryIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(i: usize) -> Line {
        Line::from_text(&i.to_string(), 10)
    }

    #[test]
    fn test_history_push_and_get() {
        let mut history = History::new(5);
        assert!(history.is_empty());

        for i in 0..3 {
            history.push(numbered(i));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0).unwrap().text(), "2");
        assert_eq!(history.get(2).unwrap().text(), "0");
        assert!(history.get(3).is_none());
    }

    #[test]
    fn test_history_ring_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push(numbered(i));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0).unwrap().text(), "4");
        assert_eq!(history.get(1).unwrap().text(), "3");
        assert_eq!(history.get(2).unwrap().text(), "2");
    }

    #[test]
    fn test_history_iter_oldest_first() {
        let mut history = History::new(3);
        for i in 0..4 {
            history.push(numbered(i));
        }
        let texts: Vec<String> = history.iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
        assert_eq!(history.iter().len(), 3);
    }

    #[test]
    fn test_history_zero_capacity() {
        let mut history = History::new(0);
        history.push(Line::new(10));
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_trim() {
        let mut history = History::new(4);
        for i in 0..6 {
            history.push(numbered(i));
        }
        history.trim(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.capacity(), 4);
        assert_eq!(history.get(0).unwrap().text(), "5");
        assert_eq!(history.get(1).unwrap().text(), "4");

        // Pushing after a trim keeps ring order intact
        for i in 6..9 {
            history.push(numbered(i));
        }
        let texts: Vec<String> = history.iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["5", "6", "7", "8"]);
    }

    #[test]
    fn test_history_clear() {
        let mut history = History::new(4);
        history.push(numbered(1));
        history.clear();
        assert!(history.is_empty());
        assert!(history.get(0).is_none());
        history.push(numbered(2));
        assert_eq!(history.get(0).unwrap().text(), "2");
    }

    #[test]
    fn test_history_resize_columns() {
        let mut history = History::new(2);
        history.push(Line::from_text("abcdef", 6));
        history.resize_columns(3, Glyph::default());
        assert_eq!(history.get(0).unwrap().cols(), 3);
        assert_eq!(history.get(0).unwrap().text(), "abc");
    }
}
