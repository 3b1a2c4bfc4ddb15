//! States of the command-line tokenizer

/// Position of the tokenizer relative to quoting and escaping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    /// Between tokens; whitespace is skipped
    #[default]
    Space,
    /// Inside an unquoted token body
    Plain,
    /// After an unquoted backslash; the next character is taken literally
    Escape,
    /// Inside `'...'`; everything up to the closing quote is literal
    SingleQuote,
    /// Inside `"..."`
    DoubleQuote,
    /// After a backslash inside `"..."`
    DoubleQuoteEscape,
}
