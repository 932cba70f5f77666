//! Parser error types

use crate::lexer::Region;
use thiserror::Error;

/// A parser error with location information
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {region}")]
pub struct ParseError {
    /// The kind of error
    pub kind: ParseErrorKind,
    /// Source region where the error occurred
    pub region: Region,
}

/// The kind of parse error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected token: found {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },

    #[error("malformed number: {0}")]
    MalformedNumber(String),

    #[error("malformed hex number: {0}")]
    MalformedHexNumber(String),

    #[error("cannot index a string literal directly, wrap it in parentheses")]
    StringIndex,

    #[error("cannot call a string literal directly, wrap it in parentheses")]
    StringCall,
}
