//! Error types for the terminal facade

/// Errors surfaced by the terminal facade.
///
/// Malformed input never produces an error; it degrades inside the parser.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("invalid terminal size {cols}x{rows}")]
    InvalidSize { cols: usize, rows: usize },
    #[error("terminal hung up")]
    Hangup,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TerminalError>;
