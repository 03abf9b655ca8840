//! Error and success codes with their classification metadata
//!
//! Every error type in the crate maps onto one of these codes via its
//! `error_code()` method. Behavior (severity, recoverability, halting) is looked
//! up here rather than hard-coded on the error types.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Wrapper shared by error, success and diagnostic codes
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

/// Complete metadata for an error code
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

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// Tokenizer error codes
pub mod lexical {
    use super::Code;

    pub const TOKEN_TOO_LARGE: Code = Code::new("E020");
    pub const UNTERMINATED_QUOTE: Code = Code::new("E021");
    pub const UNTERMINATED_ESCAPE: Code = Code::new("E022");
    pub const INVALID_BUFFER_CAPACITY: Code = Code::new("E023");
}

/// Chunked input error codes
pub mod stream {
    use super::Code;

    pub const IO_ERROR: Code = Code::new("E030");
    pub const FILE_NOT_FOUND: Code = Code::new("E031");
    pub const INVALID_CHUNK_SIZE: Code = Code::new("E032");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const TOKENIZER_RESET: Code = Code::new("I021");

    pub const STREAM_PROCESSING_COMPLETE: Code = Code::new("I030");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

#[allow(clippy::too_many_arguments)]
fn register(
    registry: &mut HashMap<&'static str, ErrorMetadata>,
    code: Code,
    category: &'static str,
    severity: Severity,
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
) {
    registry.insert(
        code.as_str(),
        ErrorMetadata {
            code: code.as_str(),
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        },
    );
}

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        register(
            &mut registry,
            system::INTERNAL_ERROR,
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal error",
            "File a bug report with the input that triggered it",
        );
        register(
            &mut registry,
            system::INITIALIZATION_FAILURE,
            "System",
            Severity::Critical,
            false,
            true,
            "Logging or configuration could not be initialized",
            "Check runtime configuration and environment variables",
        );
        register(
            &mut registry,
            system::CONFIGURATION_ERROR,
            "System",
            Severity::High,
            false,
            true,
            "Runtime configuration is invalid or unreadable",
            "Fix the configuration file or the SIMPLE_LEXER_* environment variables",
        );

        // Tokenizer errors
        register(
            &mut registry,
            lexical::TOKEN_TOO_LARGE,
            "Lexical",
            Severity::High,
            false,
            true,
            "Token does not fit in the scratch buffer",
            "Increase the token buffer capacity or split the input",
        );
        register(
            &mut registry,
            lexical::UNTERMINATED_QUOTE,
            "Lexical",
            Severity::Medium,
            true,
            false,
            "Input ended inside a quoted token",
            "Add the closing double quote",
        );
        register(
            &mut registry,
            lexical::UNTERMINATED_ESCAPE,
            "Lexical",
            Severity::Medium,
            true,
            false,
            "Input ended right after a backslash",
            "Remove the trailing backslash or add the escaped character",
        );
        register(
            &mut registry,
            lexical::INVALID_BUFFER_CAPACITY,
            "Lexical",
            Severity::High,
            false,
            true,
            "Requested token buffer capacity is outside the configured bounds",
            "Choose a capacity between the configured minimum and maximum",
        );

        // Stream errors
        register(
            &mut registry,
            stream::IO_ERROR,
            "Stream",
            Severity::High,
            false,
            true,
            "Reading input failed",
            "Check that the input is readable",
        );
        register(
            &mut registry,
            stream::FILE_NOT_FOUND,
            "Stream",
            Severity::High,
            false,
            true,
            "Input file does not exist",
            "Check the file path",
        );
        register(
            &mut registry,
            stream::INVALID_CHUNK_SIZE,
            "Stream",
            Severity::High,
            false,
            true,
            "Read chunk size is zero or above the configured maximum",
            "Choose a chunk size between 1 and the configured maximum",
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Category for a code. Success and diagnostic codes fall back on their prefix.
pub fn get_category(code: &str) -> &'static str {
    if let Some(metadata) = get_error_registry().get(code) {
        return metadata.category;
    }
    match code.chars().next() {
        Some('I') => "Success",
        Some('W') => "Warning",
        Some('D') => "Debug",
        _ => "Unknown",
    }
}

/// Codes every build must have metadata for
pub fn registered_error_codes() -> Vec<Code> {
    vec![
        system::INTERNAL_ERROR,
        system::INITIALIZATION_FAILURE,
        system::CONFIGURATION_ERROR,
        lexical::TOKEN_TOO_LARGE,
        lexical::UNTERMINATED_QUOTE,
        lexical::UNTERMINATED_ESCAPE,
        lexical::INVALID_BUFFER_CAPACITY,
        stream::IO_ERROR,
        stream::FILE_NOT_FOUND,
        stream::INVALID_CHUNK_SIZE,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_has_metadata() {
        for code in registered_error_codes() {
            let metadata = get_error_metadata(code.as_str());
            assert!(metadata.is_some(), "missing metadata for {}", code);
            assert_eq!(metadata.unwrap().code, code.as_str());
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_severity("E020"), Severity::High);
        assert!(requires_halt("E020"));
        assert!(is_recoverable("E021"));
        assert!(!requires_halt("E022"));
        assert_eq!(get_category("E031"), "Stream");
        assert_eq!(get_category("I020"), "Success");
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_action("E999"), "No specific action available");
        assert_eq!(get_severity("E999"), Severity::Medium);
        assert_eq!(get_category("X1"), "Unknown");
    }
}
