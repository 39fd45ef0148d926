//! Terminal Executor
//!
//! Ties together the parser and the screen model, applies parsed actions
//! to the screen, and carries everything a host needs around them: the
//! outbound byte path, titles, colour overrides and observer callbacks.
//! This is the main integration point between parsing and the screen model.

use std::collections::HashMap;
use std::io::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::app::{parse_color_spec, ColorPalette, Config};
use crate::core::{
    Charset, Color, Cursor, CursorShape, Line, Modes, Screen, SelectionType, SnapMode, Snapshot,
};
use crate::error::{Result, TerminalError};
use crate::input::{encode_focus, encode_mouse, encode_paste, Modifiers, MouseEvent};
use crate::parser::{
    Action, ControlCode, CsiAction, CsiCommand, DynamicColor, EscAction, OscCommand, Parser,
    PromptState,
};

/// Maximum depth of the XTWINOPS title stack
const TITLE_STACK_MAX: usize = 10;

/// Colour override slots above the 256-entry palette
const COLOR_FOREGROUND: u16 = 256;
const COLOR_BACKGROUND: u16 = 257;
const COLOR_CURSOR: u16 = 258;

/// Host callbacks. All are synchronous and default to doing nothing.
pub trait TerminalObserver {
    fn on_title(&mut self, _title: &str) {}
    fn on_icon_title(&mut self, _title: &str) {}
    fn on_bell(&mut self) {}
    /// OSC 52 clipboard write, already base64-decoded
    fn on_clipboard(&mut self, _selection: &str, _text: &str) {}
    /// A palette entry or dynamic colour changed; query with `Terminal::color`
    fn on_colors_changed(&mut self) {}
    fn on_cwd(&mut self, _path: &str) {}
    fn on_prompt_state(&mut self, _state: PromptState, _extra: &str) {}
    /// The view moved; `offset` lines back out of `history_len`
    fn on_scroll_position(&mut self, _offset: usize, _history_len: usize) {}
    /// The outbound sink failed; the terminal is now frozen
    fn on_hangup(&mut self) {}
}

struct NoopObserver;

impl TerminalObserver for NoopObserver {}

/// Terminal executor that processes parsed actions and updates the screen
pub struct Terminal {
    /// The terminal screen
    screen: Screen,
    /// The escape sequence parser
    parser: Parser,
    /// Reused action buffer for `feed`
    actions: Vec<Action>,
    config: Config,
    title: String,
    icon_title: String,
    title_stack: Vec<String>,
    /// OSC 4/10/11/12 overrides on top of the palette
    color_overrides: HashMap<u16, (u8, u8, u8)>,
    /// Outbound sink; bytes collect in `output` when unset
    sink: Option<Box<dyn Write>>,
    output: Vec<u8>,
    hung_up: bool,
    observer: Box<dyn TerminalObserver>,
    cwd: Option<String>,
    prompt_state: Option<PromptState>,
}

impl Terminal {
    /// Create a new terminal with the given dimensions and default settings
    pub fn new(cols: usize, rows: usize, history_size: usize) -> Result<Self> {
        Self::with_config(&Config {
            cols,
            rows,
            history_size,
            ..Config::default()
        })
    }

    /// Create a terminal from a configuration
    pub fn with_config(config: &Config) -> Result<Self> {
        if config.cols == 0 || config.rows == 0 {
            return Err(TerminalError::InvalidSize {
                cols: config.cols,
                rows: config.rows,
            });
        }
        let mut screen = Screen::new(config.cols, config.rows, config.history_size, config.tab_width);
        screen.set_word_delimiters(&config.word_delimiters);

        Ok(Self {
            screen,
            parser: Parser::new(),
            actions: Vec::new(),
            config: config.clone(),
            title: String::new(),
            icon_title: String::new(),
            title_stack: Vec::new(),
            color_overrides: HashMap::new(),
            sink: None,
            output: Vec::new(),
            hung_up: false,
            observer: Box::new(NoopObserver),
            cwd: None,
            prompt_state: None,
        })
    }

    /// Send outbound bytes to `sink` instead of the internal buffer
    pub fn set_output(&mut self, sink: Box<dyn Write>) {
        self.sink = Some(sink);
    }

    pub fn set_observer(&mut self, observer: Box<dyn TerminalObserver>) {
        self.observer = observer;
    }

    /// Drain bytes queued for the child when no sink is set
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// Get a reference to the screen
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_title(&self) -> &str {
        &self.icon_title
    }

    pub fn cursor(&self) -> &Cursor {
        self.screen.cursor()
    }

    pub fn modes(&self) -> &Modes {
        &self.screen.modes
    }

    /// Last working directory reported through OSC 7
    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    pub fn prompt_state(&self) -> Option<PromptState> {
        self.prompt_state
    }

    pub fn is_hung_up(&self) -> bool {
        self.hung_up
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.screen, &self.title)
    }

    // ---------------------------------------------------------------
    // Byte streams
    // ---------------------------------------------------------------

    /// Process bytes read from the child. Ignored after a hang-up.
    pub fn feed(&mut self, data: &[u8]) {
        if self.hung_up || data.is_empty() {
            return;
        }
        if self.config.scroll_on_output {
            self.scroll_to_bottom();
        }

        let mut actions = std::mem::take(&mut self.actions);
        for &byte in data {
            self.parser.advance(byte, &mut actions);
            for action in actions.drain(..) {
                self.apply_action(action);
            }
        }
        self.actions = actions;
    }

    /// Send user input to the child. Snaps the view to the live screen,
    /// echoes locally when SRM echo is on and maps CR to CR LF under LNM.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.hung_up {
            return Err(TerminalError::Hangup);
        }
        if self.screen.modes.keyboard_locked {
            tracing::debug!("keyboard locked, dropping {} bytes", data.len());
            return Ok(());
        }
        self.scroll_to_bottom();

        let translated;
        let data = if self.screen.modes.linefeed_newline && data.contains(&b'\r') {
            translated = data.iter().fold(Vec::with_capacity(data.len() + 8), |mut out, &b| {
                out.push(b);
                if b == b'\r' {
                    out.push(b'\n');
                }
                out
            });
            translated.as_slice()
        } else {
            data
        };

        if self.screen.modes.local_echo {
            self.feed(data);
        }
        self.send(data)
    }

    /// Write bytes to the outbound sink; a failure hangs the terminal up
    fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.hung_up {
            return Err(TerminalError::Hangup);
        }
        let Some(sink) = self.sink.as_mut() else {
            self.output.extend_from_slice(data);
            return Ok(());
        };
        if let Err(e) = sink.write_all(data).and_then(|()| sink.flush()) {
            tracing::warn!("outbound write failed: {}", e);
            self.hung_up = true;
            self.observer.on_hangup();
            return Err(TerminalError::Hangup);
        }
        Ok(())
    }

    /// Queue a reply generated by the terminal itself
    fn reply(&mut self, data: &[u8]) {
        if let Err(e) = self.send(data) {
            tracing::debug!("reply dropped: {}", e);
        }
    }

    /// Report a mouse event at 0-based (col, row) if the mouse mode wants it
    pub fn report_mouse(&mut self, event: MouseEvent, col: u16, row: u16, modifiers: Modifiers) -> Result<()> {
        let modes = &self.screen.modes;
        match encode_mouse(event, col, row, modifiers, modes.mouse_mode, modes.mouse_encoding) {
            Some(bytes) => self.send(&bytes),
            None => Ok(()),
        }
    }

    /// Paste text, bracketed when mode 2004 is on
    pub fn paste(&mut self, text: &str) -> Result<()> {
        let bytes = encode_paste(text, self.screen.modes.bracketed_paste);
        self.write(&bytes)
    }

    /// Report a focus change when mode 1004 is on
    pub fn focus(&mut self, focused: bool) -> Result<()> {
        if !self.screen.modes.focus_reporting {
            return Ok(());
        }
        self.send(&encode_focus(focused))
    }

    /// Abandon any partially parsed sequence
    pub fn reset_parser(&mut self) {
        self.parser.reset();
    }

    // ---------------------------------------------------------------
    // Size, dirty state and lines
    // ---------------------------------------------------------------

    /// Resize the terminal
    pub fn resize(&mut self, cols: usize, rows: usize) -> Result<()> {
        if cols == 0 || rows == 0 {
            return Err(TerminalError::InvalidSize { cols, rows });
        }
        self.screen.resize(cols, rows);
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.screen.is_dirty()
    }

    pub fn clear_dirty(&mut self) {
        self.screen.clear_dirty();
    }

    pub fn dirty_rows(&self) -> Vec<usize> {
        self.screen.dirty_rows()
    }

    /// Line shown at `view_row` with the current scroll offset
    pub fn line(&self, view_row: usize) -> Option<&Line> {
        self.screen.view_line(view_row)
    }

    /// Line shown at `view_row` when scrolled back by `offset` lines
    pub fn line_at(&self, view_row: usize, offset: usize) -> Option<&Line> {
        self.screen.line_at(view_row, offset)
    }

    // ---------------------------------------------------------------
    // View scrolling and history
    // ---------------------------------------------------------------

    /// Move the view `delta` lines (positive = back into history)
    pub fn scroll(&mut self, delta: isize) {
        if self.screen.scroll_view(delta) {
            self.notify_scroll();
        }
    }

    pub fn scroll_to(&mut self, offset: usize) {
        if self.screen.scroll_view_to(offset) {
            self.notify_scroll();
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_to(0);
    }

    pub fn scroll_offset(&self) -> usize {
        self.screen.view_offset()
    }

    fn notify_scroll(&mut self) {
        self.observer
            .on_scroll_position(self.screen.view_offset(), self.screen.history().len());
    }

    pub fn trim_history(&mut self, keep: usize) {
        self.screen.trim_history(keep);
    }

    pub fn clear_history(&mut self) {
        self.screen.clear_history();
    }

    // ---------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------

    pub fn start_selection(&mut self, view_row: usize, col: usize, snap: SnapMode) {
        self.screen.start_selection(view_row, col, snap);
    }

    pub fn extend_selection(&mut self, view_row: usize, col: usize, kind: SelectionType, done: bool) {
        self.screen.extend_selection(view_row, col, kind, done);
    }

    pub fn clear_selection(&mut self) {
        self.screen.clear_selection();
    }

    pub fn is_selected(&self, view_row: usize, col: usize) -> bool {
        self.screen.is_selected(view_row, col)
    }

    pub fn selection_text(&self) -> Option<String> {
        self.screen.selection_text()
    }

    // ---------------------------------------------------------------
    // Colours
    // ---------------------------------------------------------------

    /// Replace the base palette. OSC overrides stay in effect.
    pub fn on_colors_changed(&mut self, palette: ColorPalette) {
        self.config.colors = palette;
        self.screen.mark_all_dirty();
    }

    /// Effective colour for a palette index (0-255), or the default
    /// foreground (256), background (257) or cursor (258)
    pub fn color(&self, index: u16) -> Option<(u8, u8, u8)> {
        if let Some(&rgb) = self.color_overrides.get(&index) {
            return Some(rgb);
        }
        let palette = &self.config.colors;
        match index {
            0..=255 => Some(palette.get_indexed(index as u8)),
            COLOR_FOREGROUND => Some(palette.foreground),
            COLOR_BACKGROUND => Some(palette.background),
            COLOR_CURSOR => Some(palette.cursor),
            _ => None,
        }
    }

    fn set_color_override(&mut self, index: u16, spec: &str) {
        match parse_color_spec(spec) {
            Some(rgb) => {
                self.color_overrides.insert(index, rgb);
                self.colors_changed();
            },
            None => tracing::debug!("invalid color spec for {}: {:?}", index, spec),
        }
    }

    fn colors_changed(&mut self) {
        self.screen.mark_all_dirty();
        self.observer.on_colors_changed();
    }

    fn set_title(&mut self, title: String) {
        self.observer.on_title(&title);
        self.title = title;
    }

    fn set_icon_title(&mut self, title: String) {
        self.observer.on_icon_title(&title);
        self.icon_title = title;
    }

    // ---------------------------------------------------------------
    // Action dispatch
    // ---------------------------------------------------------------

    /// Apply a single parsed action to the screen
    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Print(c) => self.screen.print(c),
            Action::Control(code) => {
                self.screen.forget_last_printed();
                self.execute_control(code);
            },
            Action::Esc(esc) => self.execute_esc(esc),
            Action::Csi(csi) => self.execute_csi(&csi),
            Action::Osc(osc) => self.execute_osc(osc),
            Action::Ignored(kind) => tracing::debug!("{:?} string ignored", kind),
        }
    }

    /// Execute a C0 control character
    fn execute_control(&mut self, code: ControlCode) {
        match code {
            ControlCode::Bell => self.observer.on_bell(),
            ControlCode::Backspace => self.screen.backspace(),
            ControlCode::Tab => self.screen.put_tab(1),
            ControlCode::LineFeed | ControlCode::VerticalTab | ControlCode::FormFeed => {
                self.screen.linefeed()
            },
            ControlCode::CarriageReturn => self.screen.carriage_return(),
            ControlCode::ShiftOut => self.screen.charsets.lock_shift(1),
            ControlCode::ShiftIn => self.screen.charsets.lock_shift(0),
            ControlCode::Substitute => self.screen.print('?'),
            ControlCode::Other(_) => {},
        }
    }

    /// Execute an ESC sequence
    fn execute_esc(&mut self, esc: EscAction) {
        match esc {
            EscAction::SaveCursor => self.screen.save_cursor(),
            EscAction::RestoreCursor => self.screen.restore_cursor(),
            EscAction::Index => self.screen.newline(false),
            EscAction::NextLine => self.screen.newline(true),
            EscAction::TabSet => self.screen.set_tab_stop(),
            EscAction::ReverseIndex => self.screen.reverse_index(),
            EscAction::Identify => self.reply(b"\x1b[?6c"),
            EscAction::FullReset => self.full_reset(),
            EscAction::ApplicationKeypad => self.screen.modes.keypad_application = true,
            EscAction::NormalKeypad => self.screen.modes.keypad_application = false,
            EscAction::Designate { slot, designator } => match Charset::from_designator(designator) {
                Some(charset) => self.screen.charsets.designate(slot, charset),
                None => tracing::debug!("unknown charset designator {:?}", designator),
            },
            EscAction::LockShift(slot) => self.screen.charsets.lock_shift(slot),
            EscAction::AlignmentTest => self.screen.alignment_test(),
            // The parser switches its own decoder
            EscAction::Utf8Mode(_) => {},
            EscAction::Unknown(bytes) => tracing::debug!("unknown ESC sequence: {:?}", bytes),
        }
    }

    /// RIS
    fn full_reset(&mut self) {
        self.screen.reset();
        self.title.clear();
        self.icon_title.clear();
        self.title_stack.clear();
        if !self.color_overrides.is_empty() {
            self.color_overrides.clear();
            self.observer.on_colors_changed();
        }
    }

    /// Execute a CSI sequence
    fn execute_csi(&mut self, csi: &CsiAction) {
        let n = |v: u16| usize::from(v);

        match csi.command() {
            CsiCommand::InsertBlank(count) => self.screen.insert_blank(n(count)),
            CsiCommand::CursorUp(count) => self.screen.cursor_up(n(count)),
            CsiCommand::CursorDown(count) => self.screen.cursor_down(n(count)),
            CsiCommand::CursorForward(count) => self.screen.cursor_forward(n(count)),
            CsiCommand::CursorBackward(count) => self.screen.cursor_backward(n(count)),
            CsiCommand::CursorNextLine(count) => {
                self.screen.cursor_down(n(count));
                self.screen.carriage_return();
            },
            CsiCommand::CursorPrevLine(count) => {
                self.screen.cursor_up(n(count));
                self.screen.carriage_return();
            },
            CsiCommand::CursorColumn(col) => {
                let row = self.screen.cursor().row;
                self.screen.move_to(n(col) - 1, row);
            },
            CsiCommand::CursorPosition { row, col } => {
                self.screen.move_to_origin(n(col) - 1, n(row) - 1);
            },
            CsiCommand::ForwardTab(count) => self.screen.put_tab(count as isize),
            CsiCommand::BackwardTab(count) => self.screen.put_tab(-(count as isize)),
            CsiCommand::EraseDisplay(mode) => self.screen.erase_display(mode),
            CsiCommand::EraseLine(mode) => self.screen.erase_line(mode),
            CsiCommand::InsertLines(count) => self.screen.insert_lines(n(count)),
            CsiCommand::DeleteLines(count) => self.screen.delete_lines(n(count)),
            CsiCommand::DeleteChars(count) => self.screen.delete_chars(n(count)),
            CsiCommand::ScrollUp(count) => self.screen.scroll_up(n(count)),
            CsiCommand::ScrollDown(count) => self.screen.scroll_down(n(count)),
            CsiCommand::EraseChars(count) => self.screen.erase_chars(n(count)),
            CsiCommand::Repeat(count) => self.screen.repeat_last(n(count)),
            CsiCommand::DeviceAttributes => self.reply(b"\x1b[?6c"),
            CsiCommand::LinePosition(row) => {
                let col = self.screen.cursor().col;
                self.screen.move_to_origin(col, n(row) - 1);
            },
            CsiCommand::TabClear(mode) => match mode {
                0 => self.screen.clear_tab_stop(),
                3 => self.screen.clear_all_tab_stops(),
                _ => tracing::debug!("unknown TBC mode {}", mode),
            },
            CsiCommand::SetMode { modes, private, on } => {
                for mode in modes {
                    if private {
                        self.set_dec_mode(mode, on);
                    } else if !self.screen.modes.set_ansi_mode(mode, on) {
                        tracing::debug!("unknown ANSI mode {}", mode);
                    }
                }
            },
            CsiCommand::MediaCopy => {},
            CsiCommand::Sgr(params) => self.execute_sgr(&params),
            CsiCommand::DeviceStatus(kind) => self.device_status(kind),
            CsiCommand::SetScrollRegion { top, bottom } => {
                let bottom = if bottom == 0 { self.screen.rows() } else { n(bottom) };
                self.screen.set_scroll_region(n(top) - 1, bottom.saturating_sub(1));
            },
            CsiCommand::SaveCursor => self.screen.save_cursor(),
            CsiCommand::RestoreCursor => self.screen.restore_cursor(),
            CsiCommand::WindowOp(op) => self.window_op(op),
            CsiCommand::CursorStyle(style) => match CursorShape::from_decscusr(style) {
                Some((shape, blinking)) => {
                    let cursor = self.screen.cursor_mut();
                    cursor.shape = shape;
                    cursor.blinking = blinking;
                },
                None => tracing::debug!("unknown cursor style {}", style),
            },
            CsiCommand::SoftReset => self.screen.soft_reset(),
            CsiCommand::Unknown => tracing::debug!(
                "unhandled CSI: private={:?} params={:?} intermediates={:?} final={:?}",
                csi.private.map(char::from),
                csi.params,
                csi.intermediates,
                char::from(csi.final_byte)
            ),
        }
    }

    /// DEC private modes that need more than a flag flip
    fn set_dec_mode(&mut self, mode: u16, on: bool) {
        match mode {
            6 => self.screen.set_origin_mode(on),
            47 | 1047 | 1049 if !self.config.allow_alt_screen => {
                if mode == 1049 {
                    self.screen.set_alt_screen(1048, on);
                }
            },
            47 | 1047 | 1048 | 1049 => self.screen.set_alt_screen(mode, on),
            _ => {
                if !self.screen.modes.set_dec_mode(mode, on) {
                    tracing::debug!("unknown DEC private mode {}", mode);
                }
            },
        }
    }

    /// DSR
    fn device_status(&mut self, kind: u16) {
        match kind {
            5 => self.reply(b"\x1b[0n"),
            6 => {
                let cursor = self.screen.cursor();
                let top = if cursor.origin_mode {
                    self.screen.scroll_region().0
                } else {
                    0
                };
                let report = format!("\x1b[{};{}R", cursor.row.saturating_sub(top) + 1, cursor.col + 1);
                self.reply(report.as_bytes());
            },
            _ => tracing::debug!("unknown DSR {}", kind),
        }
    }

    /// XTWINOPS title stack
    fn window_op(&mut self, op: u16) {
        match op {
            22 => {
                if self.title_stack.len() == TITLE_STACK_MAX {
                    self.title_stack.remove(0);
                }
                self.title_stack.push(self.title.clone());
            },
            23 => {
                if let Some(title) = self.title_stack.pop() {
                    self.set_title(title);
                }
            },
            _ => tracing::debug!("unsupported window op {}", op),
        }
    }

    /// Execute SGR (Select Graphic Rendition)
    fn execute_sgr(&mut self, params: &[u16]) {
        let pen = &mut self.screen.cursor_mut().pen;
        if params.is_empty() {
            pen.fg = Color::Default;
            pen.bg = Color::Default;
            pen.attrs.reset();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            let attrs = &mut pen.attrs;
            match params[i] {
                0 => {
                    pen.fg = Color::Default;
                    pen.bg = Color::Default;
                    attrs.reset();
                },
                1 => attrs.bold = true,
                2 => attrs.faint = true,
                3 => attrs.italic = true,
                4 => attrs.underline = true,
                5 | 6 => attrs.blink = true,
                7 => attrs.reverse = true,
                8 => attrs.invisible = true,
                9 => attrs.struck = true,
                21 | 22 => {
                    attrs.bold = false;
                    attrs.faint = false;
                },
                23 => attrs.italic = false,
                24 => attrs.underline = false,
                25 => attrs.blink = false,
                27 => attrs.reverse = false,
                28 => attrs.invisible = false,
                29 => attrs.struck = false,
                code @ 30..=37 => pen.fg = Color::Indexed((code - 30) as u8),
                38 => {
                    let (color, used) = parse_extended_color(&params[i + 1..]);
                    if let Some(color) = color {
                        pen.fg = color;
                    }
                    i += used;
                },
                39 => pen.fg = Color::Default,
                code @ 40..=47 => pen.bg = Color::Indexed((code - 40) as u8),
                48 => {
                    let (color, used) = parse_extended_color(&params[i + 1..]);
                    if let Some(color) = color {
                        pen.bg = color;
                    }
                    i += used;
                },
                49 => pen.bg = Color::Default,
                code @ 90..=97 => pen.fg = Color::Indexed((code - 90 + 8) as u8),
                code @ 100..=107 => pen.bg = Color::Indexed((code - 100 + 8) as u8),
                code => tracing::debug!("unknown SGR code {}", code),
            }
            i += 1;
        }
    }

    /// Execute an OSC command
    fn execute_osc(&mut self, osc: OscCommand) {
        match osc {
            OscCommand::SetTitleAndIcon(title) => {
                self.set_icon_title(title.clone());
                self.set_title(title);
            },
            OscCommand::SetIconTitle(title) => self.set_icon_title(title),
            OscCommand::SetTitle(title) => self.set_title(title),
            OscCommand::SetPaletteColor { index, spec } => {
                if index > 255 {
                    tracing::debug!("palette index out of range: {}", index);
                } else {
                    self.set_color_override(index, &spec);
                }
            },
            OscCommand::ResetPaletteColor(Some(index)) => {
                if self.color_overrides.remove(&index).is_some() {
                    self.colors_changed();
                }
            },
            OscCommand::ResetPaletteColor(None) => {
                let before = self.color_overrides.len();
                self.color_overrides.retain(|&index, _| index > 255);
                if self.color_overrides.len() != before {
                    self.colors_changed();
                }
            },
            OscCommand::SetDynamicColor { which, spec } => {
                self.set_color_override(dynamic_slot(which), &spec);
            },
            OscCommand::ResetDynamicColor(which) => {
                if self.color_overrides.remove(&dynamic_slot(which)).is_some() {
                    self.colors_changed();
                }
            },
            OscCommand::Clipboard { selection, data } => self.set_clipboard(&selection, &data),
            OscCommand::WorkingDirectory(uri) => {
                let path = uri_path(&uri).to_string();
                self.observer.on_cwd(&path);
                self.cwd = Some(path);
            },
            OscCommand::Prompt { state, extra } => {
                self.prompt_state = Some(state);
                self.observer.on_prompt_state(state, &extra);
            },
            OscCommand::Unknown { command, args } => {
                tracing::debug!("unknown OSC {:?}: {:?}", command, args);
            },
        }
    }

    /// OSC 52
    fn set_clipboard(&mut self, selection: &str, data: &str) {
        if !self.config.allow_window_ops {
            tracing::debug!("clipboard write blocked");
            return;
        }
        match STANDARD.decode(data) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                self.observer.on_clipboard(selection, &text);
            },
            Err(e) => tracing::debug!("invalid base64 in OSC 52: {}", e),
        }
    }
}

/// Parse the tail of an SGR 38/48 sequence. Returns the colour, if valid,
/// and how many parameters it consumed.
fn parse_extended_color(params: &[u16]) -> (Option<Color>, usize) {
    match params.first() {
        Some(5) => match params.get(1) {
            Some(&index) => (u8::try_from(index).ok().map(Color::Indexed), 2),
            None => (None, 1),
        },
        Some(2) => {
            let used = params.len().min(4);
            let channel = |i: usize| params.get(i).and_then(|&v| u8::try_from(v).ok());
            match (channel(1), channel(2), channel(3)) {
                (Some(r), Some(g), Some(b)) => (Some(Color::Rgb(r, g, b)), used),
                _ => (None, used),
            }
        },
        Some(_) => (None, 1),
        None => (None, 0),
    }
}

fn dynamic_slot(which: DynamicColor) -> u16 {
    match which {
        DynamicColor::Foreground => COLOR_FOREGROUND,
        DynamicColor::Background => COLOR_BACKGROUND,
        DynamicColor::Cursor => COLOR_CURSOR,
    }
}

/// Path component of a `file://host/path` URI; other strings pass through
fn uri_path(uri: &str) -> &str {
    match uri.strip_prefix("file://") {
        Some(rest) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => uri,
    }
}
