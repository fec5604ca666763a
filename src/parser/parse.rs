//! Program text parsing
//!
//! Whitespace (including newlines) around each value is ignored and a single
//! trailing comma is tolerated, so files saved with a final newline or pasted
//! from a puzzle page load without cleanup.

use std::fmt;
use std::fs;
use std::path::Path;

/// Error raised while loading program text
#[derive(Debug)]
pub enum ParseError {
    /// The text contained no values
    Empty,

    /// A token could not be read as a signed 64-bit integer
    InvalidValue { position: usize, token: String },

    /// The program file could not be read
    Io { path: String, message: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Program is empty"),
            ParseError::InvalidValue { position, token } => {
                write!(
                    f,
                    "Invalid value '{}' at position {} (expected a signed integer)",
                    token, position
                )
            }
            ParseError::Io { path, message } => {
                write!(f, "Cannot read program '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse comma-separated program text into memory cells
pub fn parse_program(source: &str) -> Result<Vec<i64>, ParseError> {
    let trimmed = source.trim();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);

    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    trimmed
        .split(',')
        .enumerate()
        .map(|(position, token)| {
            let token = token.trim();
            token.parse::<i64>().map_err(|_| ParseError::InvalidValue {
                position,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Read and parse a program file
pub fn load_program(path: impl AsRef<Path>) -> Result<Vec<i64>, ParseError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_program(&source)
}
