//! Application glue module
//!
//! Configuration and application-level utilities.

mod config;

pub use config::{parse_color_spec, ColorPalette, Config, ConfigError};
