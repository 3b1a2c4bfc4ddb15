//! Runtime logging configuration
//!
//! Preferences are installed once at startup; until then the environment-aware
//! defaults from [`LoggingPreferences`] apply.

use super::events::LogLevel;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences (first caller wins)
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime logging preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Get minimum log level
pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences().min_log_level
}

/// Check if structured logging is enabled
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Get configuration summary for diagnostics
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         - Min log level: {}\n\
         - Structured logging: {}\n\
         - Preferences installed: {}",
        preferences.min_log_level.as_str(),
        preferences.use_structured_logging,
        RUNTIME_PREFERENCES.get().is_some(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_summary_lists_settings() {
        let summary = get_config_summary();
        assert!(summary.contains("Min log level"));
        assert!(summary.contains("Structured logging"));
    }
}
