//! Token types produced by the tokenizer
//!
//! A token is a contiguous lexical unit of shell-like text together with the
//! span it came from and two provenance flags.
//!
//! ## Key Components
//!
//! - **[`Token`]** - borrowed view of the tokenizer's scratch buffer, valid until
//!   the next extraction call
//! - **[`OwnedToken`]** - detached copy with its own storage
//!
//! ## Text
//!
//! Token text is raw bytes. Enclosing quotes and escaping backslashes are not
//! part of it and escape sequences are already decoded (`\n` becomes 0x0A).
//! Use [`Token::as_str`] or [`Token::text_lossy`] when a string is needed.
//!
//! ## Provenance
//!
//! - `quoted` is set only for tokens opened and closed by an unescaped `"`
//! - `started_escaped` is set when the first character was produced by `\`
//!
//! ## Lifecycle
//!
//! Keeping a token past the next extraction requires a copy:
//! [`duplicate`] (or [`Token::to_owned_token`]) allocates a new
//! [`OwnedToken`], [`OwnedToken::copy_from`] refills an existing one.
//! Dropping an [`OwnedToken`] releases its storage.

pub mod token;

pub use token::{OwnedToken, Token};

/// Deep-copy a borrowed token into new owned storage
pub fn duplicate(token: &Token<'_>) -> OwnedToken {
    token.to_owned_token()
}
