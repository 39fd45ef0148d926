//! Terminal Glyph
//!
//! Represents a single cell in the terminal grid: one rune plus the
//! attributes and colors it was written with.

use serde::{Deserialize, Serialize};

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    /// The rune stored in this cell. Continuation cells of wide runes hold a space.
    pub c: char,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text attributes
    pub attrs: Attrs,
}

impl Default for Glyph {
    fn default() -> Self {
        Self {
            c: ' ',
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attrs::default(),
        }
    }
}

impl Glyph {
    /// Create a new glyph with a single character and default attributes
    pub fn new(c: char) -> Self {
        Self {
            c,
            ..Default::default()
        }
    }

    /// Create a glyph with explicit colors and attributes
    pub fn with_style(c: char, fg: Color, bg: Color, attrs: Attrs) -> Self {
        Self { c, fg, bg, attrs }
    }

    /// A blank glyph carrying the colors of `pen`, used when erasing
    pub fn blank(pen: &Glyph) -> Self {
        Self {
            c: ' ',
            fg: pen.fg,
            bg: pen.bg,
            attrs: Attrs::default(),
        }
    }

    /// Check if this cell holds nothing but a blank
    pub fn is_blank(&self) -> bool {
        self.c == ' ' && !self.attrs.wide_dummy
    }

    /// First half of a double-width rune
    pub fn is_wide(&self) -> bool {
        self.attrs.wide
    }

    /// Second half of a double-width rune
    pub fn is_wide_continuation(&self) -> bool {
        self.attrs.wide_dummy
    }

    /// Reset the cell to the default blank
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Clear the cell but keep the given background (for erase operations)
    pub fn erase(&mut self, fg: Color, bg: Color) {
        self.c = ' ';
        self.fg = fg;
        self.bg = bg;
        self.attrs = Attrs::default();
    }
}

/// Color representation supporting indexed and RGB colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// 256-color palette index
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Convert a 256-color index to RGB using the standard xterm palette
    pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
        match index {
            0 => (0, 0, 0),
            1 => (205, 0, 0),
            2 => (0, 205, 0),
            3 => (205, 205, 0),
            4 => (0, 0, 238),
            5 => (205, 0, 205),
            6 => (0, 205, 205),
            7 => (229, 229, 229),
            8 => (127, 127, 127),
            9 => (255, 0, 0),
            10 => (0, 255, 0),
            11 => (255, 255, 0),
            12 => (92, 92, 255),
            13 => (255, 0, 255),
            14 => (0, 255, 255),
            15 => (255, 255, 255),
            // 6x6x6 color cube
            16..=231 => {
                let n = index - 16;
                let to_rgb = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                (to_rgb(n / 36), to_rgb((n % 36) / 6), to_rgb(n % 6))
            }
            // Grayscale ramp
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                (gray, gray, gray)
            }
        }
    }
}

/// Glyph attribute set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attrs {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
    pub invisible: bool,
    pub struck: bool,
    /// First cell of a double-width rune
    pub wide: bool,
    /// Placeholder cell following a wide rune
    pub wide_dummy: bool,
}

impl Attrs {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Attributes that a new glyph inherits from the pen (width markers excluded)
    pub fn for_print(self) -> Self {
        Self {
            wide: false,
            wide_dummy: false,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_default() {
        let g = Glyph::default();
        assert!(g.is_blank());
        assert_eq!(g.fg, Color::Default);
        assert_eq!(g.bg, Color::Default);
    }

    #[test]
    fn test_glyph_erase_keeps_colors() {
        let mut g = Glyph::new('A');
        g.attrs.bold = true;
        g.erase(Color::Default, Color::BLUE);
        assert!(g.is_blank());
        assert_eq!(g.bg, Color::BLUE);
        assert!(!g.attrs.bold);
    }

    #[test]
    fn test_dummy_is_not_blank() {
        let mut g = Glyph::default();
        g.attrs.wide_dummy = true;
        assert!(!g.is_blank());
        assert!(g.is_wide_continuation());
    }

    #[test]
    fn test_color_indexed_to_rgb() {
        assert_eq!(Color::indexed_to_rgb(0), (0, 0, 0));
        assert_eq!(Color::indexed_to_rgb(15), (255, 255, 255));
        assert_eq!(Color::indexed_to_rgb(16), (0, 0, 0));
        assert_eq!(Color::indexed_to_rgb(231), (255, 255, 255));
        assert_eq!(Color::indexed_to_rgb(232), (8, 8, 8));
        assert_eq!(Color::indexed_to_rgb(255), (238, 238, 238));
    }

    #[test]
    fn test_attrs_for_print_drops_width_markers() {
        let attrs = Attrs {
            bold: true,
            wide: true,
            wide_dummy: true,
            ..Default::default()
        };
        let printed = attrs.for_print();
        assert!(printed.bold);
        assert!(!printed.wide);
        assert!(!printed.wide_dummy);
    }
}
