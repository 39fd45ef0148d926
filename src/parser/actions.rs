//! Terminal actions produced by the parser
//!
//! These actions represent the semantic meaning of parsed escape sequences.
//! Every family is a closed enum so the terminal can dispatch with
//! exhaustive matches.

use serde::{Deserialize, Serialize};

/// Actions produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Print a rune at the cursor position
    Print(char),

    /// Execute a C0 control character
    Control(ControlCode),

    /// ESC sequence (non-CSI), or a C1 control with the same meaning
    Esc(EscAction),

    /// CSI sequence
    Csi(CsiAction),

    /// OSC sequence (and the legacy `ESC k` title string)
    Osc(OscCommand),

    /// DCS, SOS, PM or APC string; parsed and ignored
    Ignored(StringKind),
}

/// C0 control codes (0x00-0x1F, 0x7F)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCode {
    /// BEL - Bell
    Bell,
    /// BS - Backspace
    Backspace,
    /// HT - Horizontal Tab
    Tab,
    /// LF - Line Feed
    LineFeed,
    /// VT - Vertical Tab (treated as LF)
    VerticalTab,
    /// FF - Form Feed (treated as LF)
    FormFeed,
    /// CR - Carriage Return
    CarriageReturn,
    /// SO - Shift Out (lock G1)
    ShiftOut,
    /// SI - Shift In (lock G0)
    ShiftIn,
    /// SUB - aborts a sequence and prints a substitute mark
    Substitute,
    /// Anything else: NUL, ENQ, DEL, ...
    Other(u8),
}

impl ControlCode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x07 => ControlCode::Bell,
            0x08 => ControlCode::Backspace,
            0x09 => ControlCode::Tab,
            0x0A => ControlCode::LineFeed,
            0x0B => ControlCode::VerticalTab,
            0x0C => ControlCode::FormFeed,
            0x0D => ControlCode::CarriageReturn,
            0x0E => ControlCode::ShiftOut,
            0x0F => ControlCode::ShiftIn,
            0x1A => ControlCode::Substitute,
            other => ControlCode::Other(other),
        }
    }
}

/// ESC sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscAction {
    /// DECSC - ESC 7
    SaveCursor,
    /// DECRC - ESC 8
    RestoreCursor,
    /// IND - ESC D
    Index,
    /// NEL - ESC E
    NextLine,
    /// HTS - ESC H
    TabSet,
    /// RI - ESC M
    ReverseIndex,
    /// DECID - ESC Z
    Identify,
    /// RIS - ESC c
    FullReset,
    /// DECKPAM - ESC =
    ApplicationKeypad,
    /// DECKPNM - ESC >
    NormalKeypad,
    /// Designate a character set into G0-G3 - ESC ( ) * + followed by the designator
    Designate { slot: usize, designator: char },
    /// LS2/LS3 - ESC n / ESC o
    LockShift(usize),
    /// DECALN - ESC # 8
    AlignmentTest,
    /// ESC % G / ESC % @
    Utf8Mode(bool),
    /// Unrecognized sequence (final byte last)
    Unknown(Vec<u8>),
}

/// Which string family was parsed and ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringKind {
    Dcs,
    Sos,
    Pm,
    Apc,
}

/// A complete CSI sequence as collected by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// Numeric parameters; absent ones are 0
    pub params: Vec<u16>,
    /// Intermediate bytes (0x20-0x2F)
    pub intermediates: Vec<u8>,
    /// Final byte (0x40-0x7E)
    pub final_byte: u8,
    /// Leading private marker (`?`, `>` or `=`)
    pub private: Option<u8>,
}

impl CsiAction {
    /// Parameter `index`, with 0 or absent mapped to `default`
    pub fn param(&self, index: usize, default: u16) -> u16 {
        match self.params.get(index) {
            Some(&value) if value != 0 => value,
            _ => default,
        }
    }

    /// Parameter `index` as given, 0 if absent
    pub fn raw(&self, index: usize) -> u16 {
        self.params.get(index).copied().unwrap_or(0)
    }

    /// Classify the sequence into a command, filling in parameter defaults
    pub fn command(&self) -> CsiCommand {
        use CsiCommand::*;

        match (self.private, self.intermediates.as_slice(), self.final_byte) {
            (Some(b'?'), [], b'h') => SetMode { modes: self.params.clone(), private: true, on: true },
            (Some(b'?'), [], b'l') => SetMode { modes: self.params.clone(), private: true, on: false },
            (Some(_), _, _) => Unknown,
            (None, [b' '], b'q') => CursorStyle(self.raw(0)),
            (None, [b'!'], b'p') => SoftReset,
            (None, [_, ..], _) => Unknown,
            (None, [], final_byte) => match final_byte {
                b'@' => InsertBlank(self.param(0, 1)),
                b'A' => CursorUp(self.param(0, 1)),
                b'B' | b'e' => CursorDown(self.param(0, 1)),
                b'C' | b'a' => CursorForward(self.param(0, 1)),
                b'D' => CursorBackward(self.param(0, 1)),
                b'E' => CursorNextLine(self.param(0, 1)),
                b'F' => CursorPrevLine(self.param(0, 1)),
                b'G' | b'`' => CursorColumn(self.param(0, 1)),
                b'H' | b'f' => CursorPosition {
                    row: self.param(0, 1),
                    col: self.param(1, 1),
                },
                b'I' => ForwardTab(self.param(0, 1)),
                b'J' => EraseDisplay(self.raw(0)),
                b'K' => EraseLine(self.raw(0)),
                b'L' => InsertLines(self.param(0, 1)),
                b'M' => DeleteLines(self.param(0, 1)),
                b'P' => DeleteChars(self.param(0, 1)),
                b'S' => ScrollUp(self.param(0, 1)),
                b'T' => ScrollDown(self.param(0, 1)),
                b'X' => EraseChars(self.param(0, 1)),
                b'Z' => BackwardTab(self.param(0, 1)),
                b'b' => Repeat(self.param(0, 1)),
                b'c' if self.raw(0) == 0 => DeviceAttributes,
                b'd' => LinePosition(self.param(0, 1)),
                b'g' => TabClear(self.raw(0)),
                b'h' => SetMode { modes: self.params.clone(), private: false, on: true },
                b'l' => SetMode { modes: self.params.clone(), private: false, on: false },
                b'i' => MediaCopy,
                b'm' => Sgr(self.params.clone()),
                b'n' => DeviceStatus(self.raw(0)),
                b'r' => SetScrollRegion {
                    top: self.param(0, 1),
                    bottom: self.raw(1),
                },
                b's' => SaveCursor,
                b'u' => RestoreCursor,
                b't' => WindowOp(self.raw(0)),
                _ => Unknown,
            },
        }
    }
}

/// CSI commands. Counts and positions are 1-based with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsiCommand {
    /// ICH
    InsertBlank(u16),
    /// CUU
    CursorUp(u16),
    /// CUD, VPR
    CursorDown(u16),
    /// CUF, HPR
    CursorForward(u16),
    /// CUB
    CursorBackward(u16),
    /// CNL
    CursorNextLine(u16),
    /// CPL
    CursorPrevLine(u16),
    /// CHA, HPA
    CursorColumn(u16),
    /// CUP, HVP
    CursorPosition { row: u16, col: u16 },
    /// CHT
    ForwardTab(u16),
    /// ED
    EraseDisplay(u16),
    /// EL
    EraseLine(u16),
    /// IL
    InsertLines(u16),
    /// DL
    DeleteLines(u16),
    /// DCH
    DeleteChars(u16),
    /// SU
    ScrollUp(u16),
    /// SD
    ScrollDown(u16),
    /// ECH
    EraseChars(u16),
    /// CBT
    BackwardTab(u16),
    /// REP
    Repeat(u16),
    /// Primary DA
    DeviceAttributes,
    /// VPA
    LinePosition(u16),
    /// TBC
    TabClear(u16),
    /// SM/RM, DECSET/DECRST
    SetMode { modes: Vec<u16>, private: bool, on: bool },
    /// MC - accepted and ignored
    MediaCopy,
    /// SGR with raw parameters
    Sgr(Vec<u16>),
    /// DSR
    DeviceStatus(u16),
    /// DECSTBM; a bottom of 0 means the last row
    SetScrollRegion { top: u16, bottom: u16 },
    /// SCOSC
    SaveCursor,
    /// SCORC
    RestoreCursor,
    /// XTWINOPS (first parameter)
    WindowOp(u16),
    /// DECSCUSR
    CursorStyle(u16),
    /// DECSTR
    SoftReset,
    Unknown,
}

/// Dynamic colors settable by OSC 10/11/12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicColor {
    Foreground,
    Background,
    Cursor,
}

/// Shell integration prompt markers (OSC 133)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptState {
    /// A - prompt is about to be drawn
    WaitingPrompt,
    /// B - prompt ended, user is typing
    PromptEnded,
    /// C - command started
    CommandExecuting,
    /// D - command finished
    CommandExecuted,
}

/// OSC commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscCommand {
    /// OSC 0 - title and icon title
    SetTitleAndIcon(String),
    /// OSC 1
    SetIconTitle(String),
    /// OSC 2, `ESC k`
    SetTitle(String),
    /// OSC 4 - palette index and color spec
    SetPaletteColor { index: u16, spec: String },
    /// OSC 104 - reset one entry, or all when `None`
    ResetPaletteColor(Option<u16>),
    /// OSC 10/11/12
    SetDynamicColor { which: DynamicColor, spec: String },
    /// OSC 110/111/112
    ResetDynamicColor(DynamicColor),
    /// OSC 52 - selection name and base64 payload
    Clipboard { selection: String, data: String },
    /// OSC 7 - working directory URI
    WorkingDirectory(String),
    /// OSC 133
    Prompt { state: PromptState, extra: String },
    /// `command` is `None` when the first argument is not a number
    Unknown { command: Option<u16>, args: Vec<String> },
}

impl OscCommand {
    /// Classify `;`-split OSC arguments
    pub fn from_args(args: &[String]) -> Self {
        let parsed = args.first().and_then(|a| a.parse::<u16>().ok());
        let arg = |i: usize| args.get(i).cloned();
        let unknown = || OscCommand::Unknown {
            command: parsed,
            args: args.iter().skip(1).cloned().collect(),
        };
        let Some(command) = parsed else {
            return unknown();
        };

        match command {
            0 => arg(1).map_or_else(unknown, OscCommand::SetTitleAndIcon),
            1 => arg(1).map_or_else(unknown, OscCommand::SetIconTitle),
            2 => arg(1).map_or_else(unknown, OscCommand::SetTitle),
            4 => match (arg(1).and_then(|i| i.parse().ok()), arg(2)) {
                (Some(index), Some(spec)) => OscCommand::SetPaletteColor { index, spec },
                _ => unknown(),
            },
            104 => match arg(1) {
                None => OscCommand::ResetPaletteColor(None),
                Some(i) if i.is_empty() => OscCommand::ResetPaletteColor(None),
                Some(i) => match i.parse() {
                    Ok(index) => OscCommand::ResetPaletteColor(Some(index)),
                    Err(_) => unknown(),
                },
            },
            10..=12 => {
                let which = dynamic_color(command);
                arg(1).map_or_else(unknown, |spec| OscCommand::SetDynamicColor { which, spec })
            },
            110..=112 => OscCommand::ResetDynamicColor(dynamic_color(command - 100)),
            52 => match (arg(1), arg(2)) {
                (Some(selection), Some(data)) => OscCommand::Clipboard { selection, data },
                _ => unknown(),
            },
            7 => arg(1).map_or_else(unknown, OscCommand::WorkingDirectory),
            133 => {
                let state = match arg(1).and_then(|a| a.chars().next()) {
                    Some('A') => PromptState::WaitingPrompt,
                    Some('B') => PromptState::PromptEnded,
                    Some('C') => PromptState::CommandExecuting,
                    Some('D') => PromptState::CommandExecuted,
                    _ => return unknown(),
                };
                OscCommand::Prompt {
                    state,
                    extra: arg(2).unwrap_or_default(),
                }
            },
            _ => unknown(),
        }
    }
}

fn dynamic_color(command: u16) -> DynamicColor {
    match command {
        10 => DynamicColor::Foreground,
        11 => DynamicColor::Background,
        _ => DynamicColor::Cursor,
    }
}
