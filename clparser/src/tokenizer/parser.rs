//! Command-line tokenizer state machine
//!
//! Walks the input one `char` at a time, so multi-byte text passes through
//! untouched, and finalizes once at end of input.

use super::error::ParseError;
use super::state::State;
use crate::config::constants::{control, is_separator, DOUBLE_QUOTE, ESCAPE, SINGLE_QUOTE};
use crate::config::runtime::ParserPreferences;
use crate::{log_debug, log_error, log_success};
use crate::logging::codes;
use serde::Serialize;

/// Counters gathered while tokenizing one line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseMetrics {
    pub chars_consumed: usize,
    pub tokens: usize,
    pub single_quoted_sections: usize,
    pub double_quoted_sections: usize,
    /// Backslash sequences consumed, quoted or not
    pub escapes_resolved: usize,
    /// Double-quoted escapes that collapsed into a single character
    pub decoded_escapes: usize,
}

impl ParseMetrics {
    /// Accumulate another line's counters into this one
    pub fn merge(&mut self, other: &ParseMetrics) {
        self.chars_consumed += other.chars_consumed;
        self.tokens += other.tokens;
        self.single_quoted_sections += other.single_quoted_sections;
        self.double_quoted_sections += other.double_quoted_sections;
        self.escapes_resolved += other.escapes_resolved;
        self.decoded_escapes += other.decoded_escapes;
    }
}

/// Shell-style command-line parser
///
/// The only setting is whether backslash escapes inside double quotes are
/// decoded. Parsing borrows the parser immutably, so one instance can be
/// shared across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CLParser {
    backslash_escapes: bool,
}

impl CLParser {
    /// Parser with escape decoding disabled
    pub fn new() -> Self {
        Self {
            backslash_escapes: false,
        }
    }

    pub fn with_preferences(preferences: &ParserPreferences) -> Self {
        Self {
            backslash_escapes: preferences.backslash_escapes,
        }
    }

    /// Builder form of [`CLParser::set_backslash_escapes`]
    pub fn backslash_escapes(mut self, enable: bool) -> Self {
        self.backslash_escapes = enable;
        self
    }

    pub fn set_backslash_escapes(&mut self, enable: bool) {
        self.backslash_escapes = enable;
    }

    pub fn backslash_escapes_enabled(&self) -> bool {
        self.backslash_escapes
    }

    /// Split `command_line` into tokens
    pub fn parse(&self, command_line: &str) -> Result<Vec<String>, ParseError> {
        self.parse_with_metrics(command_line).map(|(args, _)| args)
    }

    /// Split `command_line` into tokens and report what the parse encountered
    pub fn parse_with_metrics(
        &self,
        command_line: &str,
    ) -> Result<(Vec<String>, ParseMetrics), ParseError> {
        log_debug!("Starting tokenization",
            "bytes" => command_line.len(),
            "backslash_escapes" => self.backslash_escapes
        );

        let mut metrics = ParseMetrics::default();
        let mut args: Vec<String> = Vec::new();
        let mut arg = String::with_capacity(command_line.len());
        let mut state = State::Space;

        for ch in command_line.chars() {
            metrics.chars_consumed += 1;
            state = match state {
                State::Space | State::Plain => match ch {
                    ESCAPE => State::Escape,
                    SINGLE_QUOTE => {
                        metrics.single_quoted_sections += 1;
                        State::SingleQuote
                    }
                    DOUBLE_QUOTE => {
                        metrics.double_quoted_sections += 1;
                        State::DoubleQuote
                    }
                    c if is_separator(c) => {
                        if state == State::Plain {
                            args.push(std::mem::take(&mut arg));
                        }
                        State::Space
                    }
                    c => {
                        arg.push(c);
                        State::Plain
                    }
                },
                State::Escape => {
                    metrics.escapes_resolved += 1;
                    arg.push(ch);
                    State::Plain
                }
                State::SingleQuote => match ch {
                    SINGLE_QUOTE => State::Plain,
                    c => {
                        arg.push(c);
                        State::SingleQuote
                    }
                },
                State::DoubleQuote => match ch {
                    ESCAPE => State::DoubleQuoteEscape,
                    DOUBLE_QUOTE => State::Plain,
                    c => {
                        arg.push(c);
                        State::DoubleQuote
                    }
                },
                State::DoubleQuoteEscape => {
                    metrics.escapes_resolved += 1;
                    match decode_escape(ch, self.backslash_escapes) {
                        Some(decoded) => {
                            metrics.decoded_escapes += 1;
                            arg.push(decoded);
                        }
                        None => {
                            arg.push(ESCAPE);
                            arg.push(ch);
                        }
                    }
                    State::DoubleQuote
                }
            };
        }

        let unterminated: Option<fn(String) -> ParseError> = match state {
            State::Space => None,
            State::Plain => {
                args.push(arg);
                None
            }
            State::Escape => Some(|input| ParseError::UnterminatedEscape { input }),
            State::SingleQuote => Some(|input| ParseError::UnterminatedSingleQuote { input }),
            State::DoubleQuote | State::DoubleQuoteEscape => {
                Some(|input| ParseError::UnterminatedDoubleQuote { input })
            }
        };

        if let Some(make_error) = unterminated {
            return Err(report(make_error(command_line.to_string())));
        }

        metrics.tokens = args.len();
        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization complete",
            "tokens" => metrics.tokens,
            "chars" => metrics.chars_consumed
        );

        Ok((args, metrics))
    }
}

fn report(error: ParseError) -> ParseError {
    log_error!(error.error_code(), &error.to_string(),
        "input_chars" => error.input().chars().count()
    );
    error
}

/// Resolve the character following a backslash inside double quotes
///
/// `\\` and `\"` always collapse. The C-style control escapes only decode
/// when `backslash_escapes` is set. `None` means the backslash is kept and
/// the character follows it unchanged.
pub fn decode_escape(ch: char, backslash_escapes: bool) -> Option<char> {
    match ch {
        ESCAPE | DOUBLE_QUOTE => Some(ch),
        _ if !backslash_escapes => None,
        'a' => Some(control::ALERT),
        'b' => Some(control::BACKSPACE),
        'e' | 'E' => Some(control::ESC),
        'f' => Some(control::FORM_FEED),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some(control::VERTICAL_TAB),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(line: &str) -> Result<Vec<String>, ParseError> {
        CLParser::new().parse(line)
    }

    fn parse_escaped(line: &str) -> Result<Vec<String>, ParseError> {
        CLParser::new().backslash_escapes(true).parse(line)
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(parse("").unwrap(), Vec::<String>::new());
        assert_eq!(parse("   ").unwrap(), Vec::<String>::new());
        assert_eq!(parse(" \t\r\n\u{000C}\u{000B} ").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(parse("test").unwrap(), vec!["test"]);
        assert_eq!(
            parse("test1 test2 test3").unwrap(),
            vec!["test1", "test2", "test3"]
        );
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(
            parse(" test1  test2   test3    ").unwrap(),
            vec!["test1", "test2", "test3"]
        );
        assert_eq!(parse("a\t\tb\n\nc").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_adjacent_segments_concatenate() {
        assert_eq!(parse(r#"'ab'cd"ef""#).unwrap(), vec!["abcdef"]);
        assert_eq!(parse(r#"x"y z"'w'"#).unwrap(), vec!["xy zw"]);
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(parse(r"'a\b'").unwrap(), vec![r"a\b"]);
        assert_eq!(parse(r#"'say "hi"'"#).unwrap(), vec![r#"say "hi""#]);
        assert_eq!(parse_escaped(r"'\n'").unwrap(), vec![r"\n"]);
    }

    #[test]
    fn test_empty_quotes_yield_empty_token() {
        assert_eq!(parse("''").unwrap(), vec![""]);
        assert_eq!(parse(r#"a "" b"#).unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_unquoted_escape_takes_next_char_literally() {
        assert_eq!(parse(r"a\ b").unwrap(), vec!["a b"]);
        assert_eq!(parse(r#"\"x\'"#).unwrap(), vec![r#""x'"#]);
        assert_eq!(parse(r"\\").unwrap(), vec![r"\"]);
        assert_eq!(parse(r"\n").unwrap(), vec!["n"]);
    }

    #[test]
    fn test_double_quote_escapes_disabled() {
        assert_eq!(parse(r#""\n""#).unwrap(), vec![r"\n"]);
        assert_eq!(parse(r#""\"\\""#).unwrap(), vec![r#""\"#]);
    }

    #[test]
    fn test_double_quote_escapes_enabled() {
        assert_eq!(parse_escaped(r#""\n\t""#).unwrap(), vec!["\n\t"]);
    }

    #[test]
    fn test_unknown_escape_passthrough() {
        assert_eq!(parse(r#""\z""#).unwrap(), vec![r"\z"]);
        assert_eq!(parse_escaped(r#""\z""#).unwrap(), vec![r"\z"]);
    }

    #[test]
    fn test_quoted_worked_example() {
        let line = r#"t\e\s\t\1\''test2 '"test3""\"\\test4""#;
        assert_eq!(parse(line).unwrap(), vec![r#"test1'test2 test3"\test4"#]);
    }

    #[test]
    fn test_all_control_escapes() {
        let line = r#""\a\b\e\E\f\n\r\t\v""#;
        assert_eq!(
            parse_escaped(line).unwrap(),
            vec!["\u{7}\u{8}\u{1b}\u{1b}\u{c}\n\r\t\u{b}"]
        );
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(
            parse(r#""héllo wörld" 日本 'ça va'"#).unwrap(),
            vec!["héllo wörld", "日本", "ça va"]
        );
        assert_eq!(parse(r"\é").unwrap(), vec!["é"]);
    }

    #[test]
    fn test_non_ascii_whitespace_is_token_content() {
        assert_eq!(parse("a\u{00A0}b").unwrap(), vec!["a\u{00A0}b"]);
    }

    #[test]
    fn test_error_cases() {
        assert_matches!(parse("\\"), Err(ParseError::UnterminatedEscape { ref input }) if input == "\\");
        assert_matches!(parse("'"), Err(ParseError::UnterminatedSingleQuote { .. }));
        assert_matches!(parse("\""), Err(ParseError::UnterminatedDoubleQuote { .. }));
        assert_matches!(parse("\"\\"), Err(ParseError::UnterminatedDoubleQuote { .. }));
        assert_matches!(
            parse_escaped("ok \"\\"),
            Err(ParseError::UnterminatedDoubleQuote { ref input }) if input == "ok \"\\"
        );
    }

    #[test]
    fn test_errors_discard_completed_tokens() {
        let err = parse("one two 'three").unwrap_err();
        assert_eq!(err.input(), "one two 'three");
        assert_eq!(err.error_code(), codes::tokenizer::UNTERMINATED_SINGLE_QUOTE);
    }

    #[test]
    fn test_configuration_setters() {
        let mut parser = CLParser::new();
        assert!(!parser.backslash_escapes_enabled());

        parser.set_backslash_escapes(true);
        assert!(parser.backslash_escapes_enabled());
        assert_eq!(parser.parse(r#""\t""#).unwrap(), vec!["\t"]);

        let preferences = ParserPreferences {
            backslash_escapes: true,
            collect_metrics: false,
        };
        assert!(CLParser::with_preferences(&preferences).backslash_escapes_enabled());
        assert_eq!(CLParser::default(), CLParser::new());
    }

    #[test]
    fn test_decode_escape_table() {
        assert_eq!(decode_escape('\\', false), Some('\\'));
        assert_eq!(decode_escape('"', false), Some('"'));
        assert_eq!(decode_escape('n', false), None);
        assert_eq!(decode_escape('n', true), Some('\n'));
        assert_eq!(decode_escape('E', true), Some('\u{1b}'));
        assert_eq!(decode_escape('\'', true), None);
        assert_eq!(decode_escape('x', true), None);
    }

    #[test]
    fn test_metrics() {
        let line = r#"a 'b' "c\n" \d"#;

        let (tokens, metrics) = CLParser::new().parse_with_metrics(line).unwrap();
        assert_eq!(tokens, vec!["a", "b", r"c\n", "d"]);
        assert_eq!(metrics.tokens, 4);
        assert_eq!(metrics.chars_consumed, line.chars().count());
        assert_eq!(metrics.single_quoted_sections, 1);
        assert_eq!(metrics.double_quoted_sections, 1);
        assert_eq!(metrics.escapes_resolved, 2);
        assert_eq!(metrics.decoded_escapes, 0);

        let (_, metrics) = CLParser::new()
            .backslash_escapes(true)
            .parse_with_metrics(line)
            .unwrap();
        assert_eq!(metrics.decoded_escapes, 1);
    }

    #[test]
    fn test_metrics_merge() {
        let mut total = ParseMetrics::default();
        let (_, first) = CLParser::new().parse_with_metrics("a b").unwrap();
        let (_, second) = CLParser::new().parse_with_metrics("'c'").unwrap();
        total.merge(&first);
        total.merge(&second);

        assert_eq!(total.tokens, 3);
        assert_eq!(total.chars_consumed, 6);
        assert_eq!(total.single_quoted_sections, 1);
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CLParser>();

        let parser = CLParser::new().backslash_escapes(true);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let parser = &parser;
                    scope.spawn(move || parser.parse(&format!("run \"job\\t{}\"", i)))
                })
                .collect();

            for (i, handle) in handles.into_iter().enumerate() {
                let tokens = handle.join().unwrap().unwrap();
                assert_eq!(tokens, vec!["run".to_string(), format!("job\t{}", i)]);
            }
        });
    }

    #[test]
    fn test_parse_reports_to_global_logger() {
        let memory = crate::logging::install_memory_logger();

        assert_matches!(parse("'x"), Err(ParseError::UnterminatedSingleQuote { .. }));
        assert_eq!(parse("a b").unwrap(), vec!["a", "b"]);

        assert!(memory.has_error_with_code(codes::tokenizer::UNTERMINATED_SINGLE_QUOTE));
        assert!(memory.has_success_with_code(codes::success::TOKENIZATION_COMPLETE));
        assert!(memory
            .get_events()
            .iter()
            .any(|e| e.is_debug() && e.message == "Starting tokenization"));
    }
}
