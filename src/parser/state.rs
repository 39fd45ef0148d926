//! Parser State Machine
//!
//! Bytes are first decoded into runes (UTF-8, or latin-1 after `ESC % @`);
//! the escape-sequence state machine then works on runes. The parser
//! handles arbitrary chunk boundaries and produces semantic actions for
//! the terminal.
//!
//! States:
//! - Ground: Normal text processing
//! - Escape: After ESC, waiting for next rune
//! - EscapeIntermediate: ESC followed by intermediate bytes
//! - Csi: Collecting CSI private marker, parameters and intermediates
//! - Str: Collecting an OSC/DCS/SOS/PM/APC payload (or a legacy `ESC k` title)
//!
//! Buffers are bounded. A CSI sequence that grows past its limits is
//! marked aborted and swallowed up to its final byte; a string that grows
//! past its cap is truncated but still dispatched.

use super::actions::{Action, ControlCode, CsiAction, EscAction, OscCommand, StringKind};

/// Maximum raw length of one CSI sequence
pub const CSI_BUF_MAX: usize = 512;
/// Maximum number of CSI parameters
pub const CSI_ARGS_MAX: usize = 16;
/// Maximum payload of one string sequence
pub const STR_BUF_MAX: usize = 128 * 1024;
/// Maximum number of `;`-separated string arguments
pub const STR_ARGS_MAX: usize = 16;

const INTERMEDIATES_MAX: usize = 2;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    Csi,
    Str,
}

/// Which string sequence is being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrType {
    Osc,
    Dcs,
    Sos,
    Pm,
    Apc,
    Title,
}

/// The terminal parser
#[derive(Debug)]
pub struct Parser {
    state: State,
    /// Decode input as UTF-8 (otherwise latin-1)
    utf8: bool,
    utf8_buffer: Vec<u8>,
    utf8_remaining: u8,
    /// Intermediate bytes collected during parsing
    intermediates: Vec<u8>,
    /// Parameters for CSI sequences
    params: Vec<u16>,
    /// Current parameter being built
    current_param: u16,
    /// Whether any parameter byte has been seen
    param_started: bool,
    /// Leading private marker
    private: Option<u8>,
    /// Raw CSI length so far
    csi_len: usize,
    /// The CSI sequence overflowed or was malformed; swallow it
    aborted: bool,
    str_type: StrType,
    str_buffer: Vec<u8>,
    /// ESC seen inside a string; `\` completes ST
    str_esc: bool,
    str_truncated: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            utf8: true,
            utf8_buffer: Vec::with_capacity(4),
            utf8_remaining: 0,
            intermediates: Vec::with_capacity(INTERMEDIATES_MAX),
            params: Vec::with_capacity(CSI_ARGS_MAX),
            current_param: 0,
            param_started: false,
            private: None,
            csi_len: 0,
            aborted: false,
            str_type: StrType::Osc,
            str_buffer: Vec::with_capacity(256),
            str_esc: false,
            str_truncated: false,
        }
    }

    /// Abandon any sequence in progress and return to the ground state.
    /// The UTF-8 mode is kept.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.clear_params();
        self.str_buffer.clear();
        self.str_esc = false;
        self.str_truncated = false;
        self.utf8_buffer.clear();
        self.utf8_remaining = 0;
    }

    /// True when no sequence or multi-byte rune is in progress
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground && self.utf8_remaining == 0
    }

    pub fn is_utf8(&self) -> bool {
        self.utf8
    }

    fn clear_params(&mut self) {
        self.intermediates.clear();
        self.params.clear();
        self.current_param = 0;
        self.param_started = false;
        self.private = None;
        self.csi_len = 0;
        self.aborted = false;
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();
        for &byte in data {
            self.advance(byte, &mut actions);
        }
        actions
    }

    /// Process a single byte, appending any resulting actions
    pub fn advance(&mut self, byte: u8, actions: &mut Vec<Action>) {
        if !self.utf8 {
            self.process(char::from(byte), actions);
            return;
        }

        if self.utf8_remaining > 0 {
            if (0x80..=0xBF).contains(&byte) {
                self.utf8_buffer.push(byte);
                self.utf8_remaining -= 1;
                if self.utf8_remaining == 0 {
                    let c = std::str::from_utf8(&self.utf8_buffer)
                        .ok()
                        .and_then(|s| s.chars().next())
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    self.utf8_buffer.clear();
                    self.process(c, actions);
                }
                return;
            }
            // Broken sequence: substitute, then treat this byte afresh
            self.utf8_buffer.clear();
            self.utf8_remaining = 0;
            self.process(char::REPLACEMENT_CHARACTER, actions);
        }

        match byte {
            0x00..=0x7F => self.process(char::from(byte), actions),
            0xC2..=0xDF => self.start_utf8(byte, 1),
            0xE0..=0xEF => self.start_utf8(byte, 2),
            0xF0..=0xF4 => self.start_utf8(byte, 3),
            _ => self.process(char::REPLACEMENT_CHARACTER, actions),
        }
    }

    fn start_utf8(&mut self, byte: u8, remaining: u8) {
        self.utf8_buffer.clear();
        self.utf8_buffer.push(byte);
        self.utf8_remaining = remaining;
    }

    /// Process one decoded rune
    fn process(&mut self, c: char, actions: &mut Vec<Action>) {
        if self.state == State::Str {
            self.process_str(c, actions);
            return;
        }

        let code = u32::from(c);
        if code < 0x20 || code == 0x7F {
            self.execute_c0(code as u8, actions);
            return;
        }
        if (0x80..=0x9F).contains(&code) {
            self.execute_c1(code as u8, actions);
            return;
        }

        match self.state {
            State::Ground => actions.push(Action::Print(c)),
            State::Escape => self.process_escape(c, actions),
            State::EscapeIntermediate => self.process_escape_intermediate(c, actions),
            State::Csi => self.process_csi(c, actions),
            State::Str => {},
        }
    }

    /// C0 controls execute immediately, even inside ESC and CSI sequences
    fn execute_c0(&mut self, byte: u8, actions: &mut Vec<Action>) {
        match byte {
            0x1B => {
                self.state = State::Escape;
                self.clear_params();
            },
            // CAN
            0x18 => self.cancel(),
            // SUB
            0x1A => {
                self.cancel();
                actions.push(Action::Control(ControlCode::Substitute));
            },
            _ => actions.push(Action::Control(ControlCode::from_byte(byte))),
        }
    }

    fn cancel(&mut self) {
        if self.state != State::Ground {
            tracing::debug!("sequence cancelled");
        }
        self.state = State::Ground;
        self.clear_params();
    }

    /// C1 controls (U+0080-U+009F)
    fn execute_c1(&mut self, code: u8, actions: &mut Vec<Action>) {
        match code {
            0x85 => actions.push(Action::Esc(EscAction::NextLine)),
            0x88 => actions.push(Action::Esc(EscAction::TabSet)),
            0x9A => actions.push(Action::Esc(EscAction::Identify)),
            0x9B => {
                self.clear_params();
                self.state = State::Csi;
            },
            0x90 => self.enter_str(StrType::Dcs),
            0x98 => self.enter_str(StrType::Sos),
            0x9D => self.enter_str(StrType::Osc),
            0x9E => self.enter_str(StrType::Pm),
            0x9F => self.enter_str(StrType::Apc),
            // ST with no string open
            0x9C => self.state = State::Ground,
            _ => tracing::debug!("ignoring C1 control {:#04x}", code),
        }
    }

    /// Process runes in escape state
    fn process_escape(&mut self, c: char, actions: &mut Vec<Action>) {
        match c {
            '[' => {
                self.clear_params();
                self.state = State::Csi;
            },
            ']' => self.enter_str(StrType::Osc),
            'P' => self.enter_str(StrType::Dcs),
            'X' => self.enter_str(StrType::Sos),
            '^' => self.enter_str(StrType::Pm),
            '_' => self.enter_str(StrType::Apc),
            'k' => self.enter_str(StrType::Title),
            ' '..='/' => {
                self.intermediates.push(c as u8);
                self.state = State::EscapeIntermediate;
            },
            // ST with no string open
            '\\' => self.state = State::Ground,
            _ => {
                self.state = State::Ground;
                self.dispatch_esc(c, actions);
            },
        }
    }

    /// Process runes in escape intermediate state
    fn process_escape_intermediate(&mut self, c: char, actions: &mut Vec<Action>) {
        match c {
            ' '..='/' => {
                if self.intermediates.len() < INTERMEDIATES_MAX {
                    self.intermediates.push(c as u8);
                }
            },
            _ => {
                self.state = State::Ground;
                self.dispatch_esc(c, actions);
            },
        }
    }

    /// Dispatch ESC sequence
    fn dispatch_esc(&mut self, final_char: char, actions: &mut Vec<Action>) {
        let action = match (self.intermediates.as_slice(), final_char) {
            ([], '7') => EscAction::SaveCursor,
            ([], '8') => EscAction::RestoreCursor,
            ([], 'D') => EscAction::Index,
            ([], 'E') => EscAction::NextLine,
            ([], 'H') => EscAction::TabSet,
            ([], 'M') => EscAction::ReverseIndex,
            ([], 'Z') => EscAction::Identify,
            ([], 'c') => EscAction::FullReset,
            ([], '=') => EscAction::ApplicationKeypad,
            ([], '>') => EscAction::NormalKeypad,
            ([], 'n') => EscAction::LockShift(2),
            ([], 'o') => EscAction::LockShift(3),
            ([b'#'], '8') => EscAction::AlignmentTest,
            ([b'%'], 'G') => {
                self.utf8 = true;
                EscAction::Utf8Mode(true)
            },
            ([b'%'], '@') => {
                self.utf8 = false;
                EscAction::Utf8Mode(false)
            },
            ([slot @ b'('..=b'+'], designator) => EscAction::Designate {
                slot: usize::from(slot - b'('),
                designator,
            },
            (intermediates, other) => {
                let mut seq = intermediates.to_vec();
                let mut buf = [0u8; 4];
                seq.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
                tracing::debug!("unknown ESC sequence {:?}", String::from_utf8_lossy(&seq));
                EscAction::Unknown(seq)
            },
        };
        self.intermediates.clear();
        actions.push(Action::Esc(action));
    }

    /// Process runes in CSI state
    fn process_csi(&mut self, c: char, actions: &mut Vec<Action>) {
        self.csi_len += c.len_utf8();
        if self.csi_len > CSI_BUF_MAX {
            self.abort_csi("buffer overflow");
        }

        match c {
            '0'..='9' => {
                if !self.intermediates.is_empty() {
                    self.abort_csi("parameter after intermediate");
                    return;
                }
                let digit = c as u16 - u16::from(b'0');
                self.current_param = self.current_param.saturating_mul(10).saturating_add(digit);
                self.param_started = true;
            },
            ';' | ':' => {
                if !self.intermediates.is_empty() {
                    self.abort_csi("parameter after intermediate");
                    return;
                }
                self.push_param();
                self.param_started = true;
            },
            '?' | '>' | '=' | '<' => {
                let leading = self.csi_len == 1 && self.private.is_none();
                if leading {
                    self.private = Some(c as u8);
                } else {
                    self.abort_csi("misplaced private marker");
                }
            },
            ' '..='/' => {
                if self.intermediates.len() < INTERMEDIATES_MAX {
                    self.intermediates.push(c as u8);
                } else {
                    self.abort_csi("too many intermediates");
                }
            },
            '@'..='~' => {
                if self.param_started {
                    self.push_param();
                }
                self.state = State::Ground;
                if self.aborted {
                    tracing::debug!("dropping aborted CSI sequence ending in {:?}", c);
                } else {
                    actions.push(Action::Csi(CsiAction {
                        params: std::mem::take(&mut self.params),
                        intermediates: std::mem::take(&mut self.intermediates),
                        final_byte: c as u8,
                        private: self.private,
                    }));
                }
                self.clear_params();
            },
            _ => self.abort_csi("unexpected rune"),
        }
    }

    fn push_param(&mut self) {
        if self.params.len() >= CSI_ARGS_MAX {
            self.abort_csi("too many parameters");
        } else {
            self.params.push(self.current_param);
        }
        self.current_param = 0;
    }

    fn abort_csi(&mut self, reason: &str) {
        if !self.aborted {
            tracing::debug!("aborting CSI sequence: {}", reason);
            self.aborted = true;
        }
    }

    fn enter_str(&mut self, str_type: StrType) {
        self.clear_params();
        self.state = State::Str;
        self.str_type = str_type;
        self.str_buffer.clear();
        self.str_esc = false;
        self.str_truncated = false;
    }

    /// Process runes while collecting a string
    fn process_str(&mut self, c: char, actions: &mut Vec<Action>) {
        if self.str_esc {
            self.str_esc = false;
            if c == '\\' {
                self.finish_str(actions);
            } else {
                // Not ST: the string is dropped and ESC starts a new sequence
                self.str_buffer.clear();
                self.state = State::Escape;
                self.clear_params();
                self.process(c, actions);
            }
            return;
        }

        match u32::from(c) {
            // BEL terminates (xterm)
            0x07 => self.finish_str(actions),
            0x18 | 0x1A => {
                self.str_buffer.clear();
                self.execute_c0(c as u8, actions);
            },
            0x1B => self.str_esc = true,
            0x9C => self.finish_str(actions),
            // Any other C1 ends the string and then executes
            code @ 0x80..=0x9F => {
                self.finish_str(actions);
                self.execute_c1(code as u8, actions);
            },
            0x00..=0x1F => {},
            _ => {
                let len = c.len_utf8();
                if self.str_buffer.len() + len <= STR_BUF_MAX {
                    let mut buf = [0u8; 4];
                    self.str_buffer
                        .extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                } else if !self.str_truncated {
                    tracing::debug!("string sequence truncated at {} bytes", STR_BUF_MAX);
                    self.str_truncated = true;
                }
            },
        }
    }

    /// Terminate a string sequence and dispatch it
    fn finish_str(&mut self, actions: &mut Vec<Action>) {
        self.state = State::Ground;
        let text = String::from_utf8_lossy(&self.str_buffer).into_owned();
        self.str_buffer.clear();

        let action = match self.str_type {
            StrType::Osc => {
                let args: Vec<String> = text.splitn(STR_ARGS_MAX, ';').map(String::from).collect();
                Action::Osc(OscCommand::from_args(&args))
            },
            StrType::Title => Action::Osc(OscCommand::SetTitle(text)),
            StrType::Dcs => Action::Ignored(StringKind::Dcs),
            StrType::Sos => Action::Ignored(StringKind::Sos),
            StrType::Pm => Action::Ignored(StringKind::Pm),
            StrType::Apc => Action::Ignored(StringKind::Apc),
        };
        actions.push(action);
    }
}
