//! Configuration module for the tokenizer
//!
//! `constants` holds the fixed character classes the state machine is built
//! on; `runtime` holds user preferences loaded from the environment or TOML.

pub mod constants;
pub mod runtime;
