//! Error and success codes with their classification metadata
//!
//! Single source of truth for every code the tokenizer, configuration loader
//! and batch runner emit.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Tokenizer error codes, one per unterminated construct
pub mod tokenizer {
    use super::Code;

    pub const UNTERMINATED_ESCAPE: Code = Code::new("TK001");
    pub const UNTERMINATED_SINGLE_QUOTE: Code = Code::new("TK002");
    pub const UNTERMINATED_DOUBLE_QUOTE: Code = Code::new("TK003");
}

/// Configuration loading error codes
pub mod config {
    use super::Code;

    pub const CONFIG_UNREADABLE: Code = Code::new("CFG001");
    pub const CONFIG_INVALID: Code = Code::new("CFG002");
}

/// Input acquisition error codes
pub mod input {
    use super::Code;

    pub const INPUT_UNREADABLE: Code = Code::new("IN001");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I010");
    pub const BATCH_COMPLETE: Code = Code::new("I011");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System errors
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Initialize logging exactly once at program start",
            ),
            // Tokenizer errors
            ErrorMetadata::new(
                "TK001",
                "Tokenizer",
                Severity::Medium,
                true,
                false,
                "Input ends with an unresolved backslash",
                "Remove the trailing backslash or escape it as \\\\",
            ),
            ErrorMetadata::new(
                "TK002",
                "Tokenizer",
                Severity::Medium,
                true,
                false,
                "Single-quoted section is never closed",
                "Add the closing single quote",
            ),
            ErrorMetadata::new(
                "TK003",
                "Tokenizer",
                Severity::Medium,
                true,
                false,
                "Double-quoted section is never closed",
                "Add the closing double quote; a backslash right before the end also leaves it open",
            ),
            // Configuration errors
            ErrorMetadata::new(
                "CFG001",
                "Configuration",
                Severity::High,
                false,
                true,
                "Configuration file could not be read",
                "Check the path and file permissions",
            ),
            ErrorMetadata::new(
                "CFG002",
                "Configuration",
                Severity::High,
                false,
                true,
                "Configuration file is not valid TOML for this tool",
                "Fix the reported key or value in the configuration file",
            ),
            // Input errors
            ErrorMetadata::new(
                "IN001",
                "Input",
                Severity::High,
                false,
                true,
                "Input file could not be read",
                "Check the --file path and permissions, or pass lines as arguments",
            ),
            // Success codes
            ErrorMetadata::new(
                "I001",
                "System",
                Severity::Low,
                true,
                false,
                "Logging system initialized",
                "No action required",
            ),
            ErrorMetadata::new(
                "I010",
                "Tokenizer",
                Severity::Low,
                true,
                false,
                "Command line tokenized successfully",
                "No action required",
            ),
            ErrorMetadata::new(
                "I011",
                "Batch",
                Severity::Low,
                true,
                false,
                "Batch tokenization finished",
                "Review per-line failures, if any",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
