//! Tokenizer error types

use crate::logging::codes::{self, Code};

/// Failure to tokenize a command line
///
/// Every variant is detected at end of input and carries the complete line
/// that was being parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("terminated by an escape character: [{input}]")]
    UnterminatedEscape { input: String },

    #[error("single-quoted string not closed: [{input}]")]
    UnterminatedSingleQuote { input: String },

    #[error("double-quoted string not closed: [{input}]")]
    UnterminatedDoubleQuote { input: String },
}

impl ParseError {
    pub fn error_code(&self) -> Code {
        match self {
            ParseError::UnterminatedEscape { .. } => codes::tokenizer::UNTERMINATED_ESCAPE,
            ParseError::UnterminatedSingleQuote { .. } => {
                codes::tokenizer::UNTERMINATED_SINGLE_QUOTE
            }
            ParseError::UnterminatedDoubleQuote { .. } => {
                codes::tokenizer::UNTERMINATED_DOUBLE_QUOTE
            }
        }
    }

    /// The command line that failed to parse
    pub fn input(&self) -> &str {
        match self {
            ParseError::UnterminatedEscape { input }
            | ParseError::UnterminatedSingleQuote { input }
            | ParseError::UnterminatedDoubleQuote { input } => input,
        }
    }
}
