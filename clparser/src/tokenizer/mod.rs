//! Command-line tokenization
//!
//! Splits one line into argument tokens with POSIX-shell-like quoting:
//! backslash escapes outside quotes, literal single quotes, and double quotes
//! with `\\` / `\"` collapsing (plus C-style control escapes when enabled).
//! No expansion, globbing, or redirection is performed.

pub mod error;
pub mod parser;
pub mod state;

use crate::config::runtime::ParserPreferences;

pub use error::ParseError;
pub use parser::{decode_escape, CLParser, ParseMetrics};
pub use state::State;

/// Tokenize with escape decoding disabled
pub fn parse(command_line: &str) -> Result<Vec<String>, ParseError> {
    CLParser::new().parse(command_line)
}

/// Tokenize with escape decoding set explicitly
pub fn parse_with_escapes(
    command_line: &str,
    backslash_escapes: bool,
) -> Result<Vec<String>, ParseError> {
    CLParser::new()
        .backslash_escapes(backslash_escapes)
        .parse(command_line)
}

/// Create a parser with default settings
pub fn create_parser() -> CLParser {
    CLParser::new()
}

/// Create a parser from runtime preferences
pub fn create_parser_with_preferences(preferences: &ParserPreferences) -> CLParser {
    CLParser::with_preferences(preferences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_parse_defaults_to_literal_escapes() {
        assert_eq!(parse(r#"echo "a\tb""#).unwrap(), vec!["echo", r"a\tb"]);
    }

    #[test]
    fn test_parse_with_escapes() {
        assert_eq!(
            parse_with_escapes(r#"echo "a\tb""#, true).unwrap(),
            vec!["echo", "a\tb"]
        );
        assert_eq!(
            parse_with_escapes(r#"echo "a\tb""#, false).unwrap(),
            vec!["echo", r"a\tb"]
        );
    }

    #[test]
    fn test_create_parser() {
        assert!(!create_parser().backslash_escapes_enabled());

        let preferences = ParserPreferences {
            backslash_escapes: true,
            ..Default::default()
        };
        assert!(create_parser_with_preferences(&preferences).backslash_escapes_enabled());
    }
}
