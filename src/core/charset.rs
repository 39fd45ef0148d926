//! Character set handling
//!
//! G0-G3 designation, locking shifts and the DEC Special Graphics
//! (line drawing) table. Translation happens at print time; stored glyphs
//! always hold the final Unicode scalar.

use serde::{Deserialize, Serialize};

/// Character set designations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    /// US ASCII - default
    #[default]
    Usa,
    /// DEC Special Graphics (line drawing characters)
    Graphic0,
    /// UK character set
    Uk,
}

impl Charset {
    /// Parse the final byte of a designation escape (`ESC ( 0` etc.).
    /// Unknown designators return `None` and leave the slot untouched.
    pub fn from_designator(c: char) -> Option<Charset> {
        match c {
            'B' => Some(Charset::Usa),
            '0' => Some(Charset::Graphic0),
            'A' => Some(Charset::Uk),
            _ => None,
        }
    }

    /// Translate a character through this charset
    pub fn translate(self, c: char) -> char {
        match self {
            Charset::Usa => c,
            Charset::Graphic0 => translate_graphic0(c),
            Charset::Uk if c == '#' => '£',
            Charset::Uk => c,
        }
    }
}

/// Character set state for G0-G3 slots
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharsetState {
    slots: [Charset; 4],
    /// Slot mapped into GL (0 = G0 ... 3 = G3)
    active: usize,
}

impl CharsetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Designate `charset` into slot G`slot`; out-of-range slots are ignored
    pub fn designate(&mut self, slot: usize, charset: Charset) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = charset;
        }
    }

    /// Lock slot G`slot` into GL (SI = 0, SO = 1, LS2 = 2, LS3 = 3)
    pub fn lock_shift(&mut self, slot: usize) {
        if slot < self.slots.len() {
            self.active = slot;
        }
    }

    pub fn active_slot(&self) -> usize {
        self.active
    }

    /// Get the charset currently mapped into GL
    pub fn current(&self) -> Charset {
        self.slots[self.active]
    }

    pub fn slot(&self, slot: usize) -> Option<Charset> {
        self.slots.get(slot).copied()
    }

    /// Translate a character through the current charset
    pub fn translate(&self, c: char) -> char {
        self.current().translate(c)
    }
}

/// DEC Special Graphics for 0x41..=0x7e; `None` leaves the byte as is
const GRAPHIC0: [Option<char>; 62] = [
    // A - G
    Some('↑'), Some('↓'), Some('→'), Some('←'), Some('█'), Some('▚'), Some('☃'),
    // H - O
    None, None, None, None, None, None, None, None,
    // P - W
    None, None, None, None, None, None, None, None,
    // X - _
    None, None, None, None, None, None, None, Some(' '),
    // ` - g
    Some('◆'), Some('▒'), Some('␉'), Some('␌'), Some('␍'), Some('␊'), Some('°'), Some('±'),
    // h - o
    Some('␤'), Some('␋'), Some('┘'), Some('┐'), Some('┌'), Some('└'), Some('┼'), Some('⎺'),
    // p - w
    Some('⎻'), Some('─'), Some('⎼'), Some('⎽'), Some('├'), Some('┤'), Some('┴'), Some('┬'),
    // x - ~
    Some('│'), Some('≤'), Some('≥'), Some('π'), Some('≠'), Some('£'), Some('·'),
];

fn translate_graphic0(c: char) -> char {
    let code = c as u32;
    if (0x41..=0x7e).contains(&code) {
        if let Some(mapped) = GRAPHIC0[(code - 0x41) as usize] {
            return mapped;
        }
    }
    c
}
