//! Errors produced by the grid, the text codec and the controller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Rows and columns must both be positive.
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    /// Grid text does not match the expected shape or alphabet.
    #[error("malformed grid data at line {line}: {kind}")]
    MalformedInput { line: usize, kind: Malformed },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Speed tier outside `1..=4`.
    #[error("speed level {0} is out of range 1..=4")]
    InvalidSpeed(u8),

    #[error("terminal error: {0}")]
    Terminal(String),
}

/// What exactly went wrong while parsing grid text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("unexpected character {ch:?} at column {col}")]
    InvalidChar { ch: char, col: usize },
    #[error("expected {expected} columns, found {found}")]
    RowLength { expected: usize, found: usize },
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
}

impl Error {
    pub(crate) fn malformed(line: usize, kind: Malformed) -> Self {
        Error::MalformedInput { line, kind }
    }
}
