//! Character classes recognized by the tokenizer state machine

/// Backslash: escapes the next character outside single quotes
pub const ESCAPE: char = '\\';

/// Opens and closes a literal section
pub const SINGLE_QUOTE: char = '\'';

/// Opens and closes a section with limited escape processing
pub const DOUBLE_QUOTE: char = '"';

/// Characters that separate tokens outside of quotes
pub const WHITESPACE: [char; 6] = [' ', '\t', '\r', '\n', '\u{000C}', '\u{000B}'];

/// Control characters produced by decoded double-quote escapes
pub mod control {
    pub const ALERT: char = '\u{0007}';
    pub const BACKSPACE: char = '\u{0008}';
    pub const ESC: char = '\u{001B}';
    pub const FORM_FEED: char = '\u{000C}';
    pub const VERTICAL_TAB: char = '\u{000B}';
}

/// Whether `ch` separates tokens outside of quotes
pub fn is_separator(ch: char) -> bool {
    WHITESPACE.contains(&ch)
}
