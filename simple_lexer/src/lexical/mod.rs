//! Lexical analysis: byte-level tokenization of shell-like text
//!
//! The [`Tokenizer`] is pull-based and chunk-aware. These free functions cover
//! the common cases of building one and tokenizing an in-memory buffer.

pub mod error;
pub mod tokenizer;

use crate::config::compile_time::lexical::{
    DEFAULT_TOKEN_BUFFER_CAPACITY, MAX_TOKEN_BUFFER_CAPACITY, MIN_TOKEN_BUFFER_CAPACITY,
};
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{duplicate, OwnedToken};

pub use error::LexerError;
pub use tokenizer::{
    decode_escape, is_separator, validate_capacity, FinishOutcome, InputView, LexerState,
    Tokenizer, TokenizerMetrics,
};

// ============================================================================
// MODULE API
// ============================================================================

/// Tokenizer with the default buffer capacity
pub fn create_tokenizer() -> Tokenizer {
    Tokenizer::default()
}

/// Tokenizer sized and configured from runtime preferences
pub fn create_tokenizer_with_preferences(
    preferences: LexicalPreferences,
) -> Result<Tokenizer, LexerError> {
    Tokenizer::with_preferences(preferences)
}

/// Tokenize a complete buffer.
///
/// Any error ends tokenization, including a dangling quote or escape at the
/// end of input.
pub fn tokenize(input: &[u8], capacity: usize) -> Result<Vec<OwnedToken>, LexerError> {
    let mut tokenizer = Tokenizer::new(capacity)?;
    let mut tokens = Vec::new();

    let mut view = tokenizer.set_input(input);
    while let Some(token) = view.next_token()? {
        tokens.push(duplicate(&token));
    }
    drop(view);

    if let Some(token) = tokenizer.finish().into_result()? {
        tokens.push(duplicate(&token));
    }

    Ok(tokens)
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

/// Check that every lexical code is registered and the capacity limits are sane
pub fn init_lexical_logging() -> Result<(), String> {
    let lexical_codes = [
        codes::lexical::TOKEN_TOO_LARGE,
        codes::lexical::UNTERMINATED_QUOTE,
        codes::lexical::UNTERMINATED_ESCAPE,
        codes::lexical::INVALID_BUFFER_CAPACITY,
    ];

    for code in &lexical_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    validate_capacity(DEFAULT_TOKEN_BUFFER_CAPACITY)
        .map_err(|e| format!("Default token buffer capacity rejected: {}", e))?;

    crate::log_debug!("Lexical limits initialized",
        "default_capacity" => DEFAULT_TOKEN_BUFFER_CAPACITY,
        "min_capacity" => MIN_TOKEN_BUFFER_CAPACITY,
        "max_capacity" => MAX_TOKEN_BUFFER_CAPACITY
    );

    Ok(())
}

/// Compile-time token buffer limits (for reporting)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityLimits {
    pub default: usize,
    pub min: usize,
    pub max: usize,
}

pub fn get_capacity_limits() -> CapacityLimits {
    CapacityLimits {
        default: DEFAULT_TOKEN_BUFFER_CAPACITY,
        min: MIN_TOKEN_BUFFER_CAPACITY,
        max: MAX_TOKEN_BUFFER_CAPACITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_create_tokenizer() {
        let tokenizer = create_tokenizer();
        assert_eq!(tokenizer.capacity(), DEFAULT_TOKEN_BUFFER_CAPACITY);
        assert_eq!(tokenizer.state(), LexerState::Normal);
    }

    #[test]
    fn test_create_tokenizer_with_preferences() {
        let preferences = LexicalPreferences {
            token_buffer_capacity: 32,
            log_token_events: true,
            ..Default::default()
        };
        let tokenizer = create_tokenizer_with_preferences(preferences).unwrap();
        assert_eq!(tokenizer.capacity(), 32);
        assert!(tokenizer.preferences().log_token_events);

        let invalid = LexicalPreferences {
            token_buffer_capacity: 0,
            ..Default::default()
        };
        assert_matches!(
            create_tokenizer_with_preferences(invalid),
            Err(LexerError::InvalidBufferCapacity { requested: 0, .. })
        );
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize(b"set name \"John Smith\" # greeting\n", 64).unwrap();
        let texts: Vec<&str> = tokens.iter().filter_map(|t| t.as_str()).collect();
        assert_eq!(texts, vec!["set", "name", "John Smith"]);
        assert!(tokens[2].quoted);
    }

    #[test]
    fn test_tokenize_reports_errors() {
        assert_matches!(
            tokenize(b"echo \"unclosed", 64),
            Err(LexerError::UnterminatedQuote { .. })
        );
        assert_matches!(
            tokenize(b"abcdef", 4),
            Err(LexerError::TokenTooLarge { capacity: 4, .. })
        );
        assert_matches!(tokenize(b"", 1), Err(LexerError::InvalidBufferCapacity { .. }));
    }

    #[test]
    fn test_init_lexical_logging() {
        assert!(init_lexical_logging().is_ok());
    }

    #[test]
    fn test_capacity_limits() {
        let limits = get_capacity_limits();
        assert!(limits.min >= 2);
        assert!(limits.min <= limits.default && limits.default <= limits.max);
    }
}
