// RUNTIME PREFERENCES (User Experience)

use crate::logging::codes::{self, Code};
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

fn env_flag(name: &str, fallback: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(fallback)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Decode `\n`, `\t` and friends inside double quotes
    pub backslash_escapes: bool,

    /// Whether batch runs keep per-line parse metrics
    pub collect_metrics: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            backslash_escapes: env_flag(env_vars::PARSER_BACKSLASH_ESCAPES, false),
            collect_metrics: env_flag(env_vars::PARSER_COLLECT_METRICS, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Events below this level are dropped before reaching a backend
    pub min_log_level: LogLevel,

    /// Emit JSON lines to stderr instead of forwarding to the `log` facade
    pub use_structured_logging: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads for multi-line input; 1 forces sequential processing
    pub max_threads: usize,

    /// Stop scheduling lines once one fails to tokenize
    pub fail_fast: bool,

    /// Leave blank lines out of the results entirely
    pub skip_blank_lines: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            fail_fast: false,
            skip_blank_lines: true,
        }
    }
}

pub(crate) fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors raised while loading a [`RuntimeConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn error_code(&self) -> Code {
        match self {
            ConfigError::Io { .. } => codes::config::CONFIG_UNREADABLE,
            ConfigError::Parse { .. } => codes::config::CONFIG_INVALID,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub parser: ParserPreferences,
    pub logging: LoggingPreferences,
    pub batch: BatchPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing tables and keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Self::parse_with_origin(source, "<inline>")
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_with_origin(&source, &path.display().to_string())
    }

    fn parse_with_origin(source: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Parser
    pub const PARSER_BACKSLASH_ESCAPES: &str = "CLPARSER_BACKSLASH_ESCAPES";
    pub const PARSER_COLLECT_METRICS: &str = "CLPARSER_COLLECT_METRICS";

    // Logging
    pub const LOGGING_MIN_LEVEL: &str = "CLPARSER_LOG_LEVEL";
    pub const LOGGING_USE_STRUCTURED: &str = "CLPARSER_STRUCTURED_LOGGING";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [parser]
            backslash_escapes = true

            [batch]
            max_threads = 3
            "#,
        )
        .unwrap();

        assert!(config.parser.backslash_escapes);
        assert_eq!(config.batch.max_threads, 3);
        assert_eq!(config.batch.skip_blank_lines, BatchPreferences::default().skip_blank_lines);
        assert_eq!(config.logging, LoggingPreferences::default());
    }

    #[test]
    fn test_log_level_from_toml() {
        let config = RuntimeConfig::from_toml_str("[logging]\nmin_log_level = \"debug\"\n").unwrap();
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml() {
        let err = RuntimeConfig::from_toml_str("[parser]\nbackslash_escapes = \"yes\"\n").unwrap_err();
        assert_matches!(err, ConfigError::Parse { ref origin, .. } if origin == "<inline>");
        assert_eq!(err.error_code(), codes::config::CONFIG_INVALID);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clparser.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[batch]\nfail_fast = true\nskip_blank_lines = false").unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert!(config.batch.fail_fast);
        assert!(!config.batch.skip_blank_lines);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuntimeConfig::load(&dir.path().join("absent.toml")).unwrap_err();

        assert_matches!(err, ConfigError::Io { .. });
        assert_eq!(err.error_code(), codes::config::CONFIG_UNREADABLE);
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(env_vars::PARSER_BACKSLASH_ESCAPES.starts_with("CLPARSER_"));
        assert!(env_vars::LOGGING_MIN_LEVEL.starts_with("CLPARSER_"));
    }
}
