//! Terminal escape sequence parser
//!
//! A stateful parser that converts bytes into terminal actions.
//! Based on the VT500-series parser model from <https://vt100.net/emu/dec_ansi_parser>

mod actions;
mod state;

pub use actions::{
    Action, ControlCode, CsiAction, CsiCommand, DynamicColor, EscAction, OscCommand, PromptState,
    StringKind,
};
pub use state::{Parser, CSI_ARGS_MAX, CSI_BUF_MAX, STR_ARGS_MAX, STR_BUF_MAX};
