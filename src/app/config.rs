//! Configuration for the screen engine

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Color, DEFAULT_TAB_WIDTH};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial width in columns
    pub cols: usize,
    /// Initial height in rows
    pub rows: usize,
    /// Maximum history lines
    pub history_size: usize,
    /// Distance between default tab stops
    pub tab_width: usize,
    /// Honour DEC modes 47/1047/1049
    pub allow_alt_screen: bool,
    /// Allow OSC 52 clipboard writes
    pub allow_window_ops: bool,
    /// Snap the view back to the live screen when output arrives
    pub scroll_on_output: bool,
    /// Characters that break words for word-snapped selection
    pub word_delimiters: String,
    /// Color palette
    pub colors: ColorPalette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            history_size: 1000,
            tab_width: DEFAULT_TAB_WIDTH,
            allow_alt_screen: true,
            allow_window_ops: true,
            scroll_on_output: true,
            word_delimiters: " ".to_string(),
            colors: ColorPalette::default(),
        }
    }
}

/// Color palette configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Default foreground color
    pub foreground: (u8, u8, u8),
    /// Default background color
    pub background: (u8, u8, u8),
    /// Cursor color
    pub cursor: (u8, u8, u8),
    /// The 16 ANSI colors (0-15)
    pub ansi: [(u8, u8, u8); 16],
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            foreground: (229, 229, 229),
            background: (0, 0, 0),
            cursor: (229, 229, 229),
            // Default ANSI colors (similar to xterm)
            ansi: [
                (0, 0, 0),       // 0: Black
                (205, 0, 0),     // 1: Red
                (0, 205, 0),     // 2: Green
                (205, 205, 0),   // 3: Yellow
                (0, 0, 238),     // 4: Blue
                (205, 0, 205),   // 5: Magenta
                (0, 205, 205),   // 6: Cyan
                (229, 229, 229), // 7: White
                (127, 127, 127), // 8: Bright Black
                (255, 0, 0),     // 9: Bright Red
                (0, 255, 0),     // 10: Bright Green
                (255, 255, 0),   // 11: Bright Yellow
                (92, 92, 255),   // 12: Bright Blue
                (255, 0, 255),   // 13: Bright Magenta
                (0, 255, 255),   // 14: Bright Cyan
                (255, 255, 255), // 15: Bright White
            ],
        }
    }
}

impl ColorPalette {
    /// Get the RGB color for an indexed color (0-255)
    pub fn get_indexed(&self, index: u8) -> (u8, u8, u8) {
        match index {
            0..=15 => self.ansi[index as usize],
            _ => Color::indexed_to_rgb(index),
        }
    }

    /// Convert a Color to RGB
    pub fn color_to_rgb(&self, color: Color, is_foreground: bool) -> (u8, u8, u8) {
        match color {
            Color::Default => {
                if is_foreground {
                    self.foreground
                } else {
                    self.background
                }
            },
            Color::Indexed(i) => self.get_indexed(i),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }
}

/// Parse an X11 color spec: `#rgb`, `#rrggbb`, or `rgb:r/g/b` with 1-4 hex
/// digits per channel
pub fn parse_color_spec(spec: &str) -> Option<(u8, u8, u8)> {
    if let Some(hex) = spec.strip_prefix('#') {
        let digits = match hex.len() {
            3 => 1,
            6 => 2,
            _ => return None,
        };
        let channel = |i: usize| scale_hex(hex.get(i * digits..(i + 1) * digits)?);
        return Some((channel(0)?, channel(1)?, channel(2)?));
    }

    let rest = spec.strip_prefix("rgb:")?;
    let mut parts = rest.split('/');
    let r = scale_hex(parts.next()?)?;
    let g = scale_hex(parts.next()?)?;
    let b = scale_hex(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b))
}

/// Scale 1-4 hex digits to 0-255
fn scale_hex(digits: &str) -> Option<u8> {
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len())) - 1;
    u8::try_from(value * 255 / max).ok()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/mochi-screen/config.json
        if let Some(config_dir) = dirs_config_path() {
            let config_path = config_dir.join("config.json");
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("ignoring {}: {}", config_path.display(), e),
                }
            }
        }
        Self::default()
    }
}

/// Get the configuration directory path
fn dirs_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("mochi-screen"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
