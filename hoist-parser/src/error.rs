//! Parser error types

use thiserror::Error;

/// Malformed source text. Every variant carries the byte offset where the
/// problem was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected token at position {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input at position {position}: expected {expected}")]
    UnexpectedEof { position: usize, expected: String },

    #[error("Invalid character at position {position}: {text:?}")]
    InvalidCharacter { position: usize, text: String },

    #[error("Invalid integer literal at position {position}: {text}")]
    InvalidNumber { position: usize, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedToken,
    UnexpectedEof,
    InvalidCharacter,
    InvalidNumber,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            ParseError::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            ParseError::InvalidCharacter { .. } => ErrorKind::InvalidCharacter,
            ParseError::InvalidNumber { .. } => ErrorKind::InvalidNumber,
        }
    }

    /// Byte offset into the source
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::InvalidCharacter { position, .. }
            | ParseError::InvalidNumber { position, .. } => *position,
        }
    }

    /// One-based line and column of the error within `source`
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        let before = source.get(..self.position()).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        (line, column)
    }
}
