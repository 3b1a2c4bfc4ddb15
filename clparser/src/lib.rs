//! Shell-style command-line tokenizer.
//!
//! Splits a single line into argument tokens following POSIX-shell-like
//! quoting rules, with optional C-style escape decoding inside double quotes.

// Internal modules
pub mod batch;
pub mod config;
#[macro_use]
pub mod logging;
pub mod tokenizer;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchResults, LineOutcome};
pub use config::runtime::{ConfigError, ParserPreferences, RuntimeConfig};
pub use tokenizer::{CLParser, ParseError, ParseMetrics};
