//! Tokenizer errors

use crate::logging::codes;
use crate::tokens::OwnedToken;
use crate::utils::TextPosition;

/// Errors reported by the tokenizer.
///
/// Running out of input is not an error: extraction returns `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    /// The scratch buffer is full. The text gathered so far is force-finished
    /// and carried along so the caller can still inspect it.
    #[error("Token too large for a buffer of capacity {capacity} (at most {} bytes)", .capacity - 1)]
    TokenTooLarge {
        capacity: usize,
        partial: OwnedToken,
    },

    #[error("Unterminated quoted token starting at {start}")]
    UnterminatedQuote { start: TextPosition },

    #[error("Input ended after the backslash at {position}")]
    UnterminatedEscape { position: TextPosition },

    #[error("Invalid token buffer capacity {requested} (must be between {min} and {max})")]
    InvalidBufferCapacity {
        requested: usize,
        min: usize,
        max: usize,
    },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::TokenTooLarge { .. } => codes::lexical::TOKEN_TOO_LARGE,
            LexerError::UnterminatedQuote { .. } => codes::lexical::UNTERMINATED_QUOTE,
            LexerError::UnterminatedEscape { .. } => codes::lexical::UNTERMINATED_ESCAPE,
            LexerError::InvalidBufferCapacity { .. } => codes::lexical::INVALID_BUFFER_CAPACITY,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    /// Where in the input the problem was detected, if anywhere
    pub fn position(&self) -> Option<TextPosition> {
        match self {
            LexerError::TokenTooLarge { partial, .. } => Some(partial.span.end),
            LexerError::UnterminatedQuote { start } => Some(*start),
            LexerError::UnterminatedEscape { position } => Some(*position),
            LexerError::InvalidBufferCapacity { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_classification() {
        let quote = LexerError::UnterminatedQuote {
            start: TextPosition::new(3, 4),
        };
        assert_eq!(quote.error_code().as_str(), "E021");
        assert!(quote.is_recoverable());
        assert!(!quote.requires_halt());
        assert_eq!(quote.category(), "Lexical");
        assert_eq!(quote.position(), Some(TextPosition::new(3, 4)));

        let capacity = LexerError::InvalidBufferCapacity {
            requested: 1,
            min: 2,
            max: 16,
        };
        assert_eq!(capacity.severity(), "High");
        assert!(capacity.requires_halt());
        assert_eq!(capacity.position(), None);
    }

    #[test]
    fn test_messages() {
        let too_large = LexerError::TokenTooLarge {
            capacity: 8,
            partial: OwnedToken::default(),
        };
        assert_eq!(
            too_large.to_string(),
            "Token too large for a buffer of capacity 8 (at most 7 bytes)"
        );

        let escape = LexerError::UnterminatedEscape {
            position: TextPosition::new(1, 6),
        };
        assert_eq!(escape.to_string(), "Input ended after the backslash at 1:6");
    }
}
