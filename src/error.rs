use thiserror::Error;

/// Failures raised by grid construction, addressing and move parsing.
///
/// All variants are local and synchronous; nothing here is retryable.
/// A full board on spawn is not an error (see `Game::add_tile`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Malformed textual grid. `line` is the 1-based index among non-blank lines.
    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("cell ({x}, {y}) is outside the 4x4 grid")]
    Index { x: usize, y: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cell value {value} is outside 0..=15")]
    ValueRange { value: u32 },
}

impl GridError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        GridError::Parse { line, reason: reason.into() }
    }
}
