//! Shared primitive types used by the tokenizer, its tokens and the logging system.

pub mod span;

pub use span::{TextPosition, TextSpan};
