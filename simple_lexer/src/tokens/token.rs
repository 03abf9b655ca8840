//! Token value types
//!
//! [`Token`] is what the tokenizer hands out: a view of its scratch buffer that
//! lives until the next extraction call. [`OwnedToken`] is the detached copy a
//! caller keeps after that.

use crate::utils::TextSpan;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A token borrowed from the tokenizer's scratch buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Decoded bytes: quotes and backslashes removed, escapes resolved
    pub text: &'a [u8],
    /// Inclusive source span
    pub span: TextSpan,
    /// Opened and closed by an unescaped `"`
    pub quoted: bool,
    /// First character came from a backslash escape
    pub started_escaped: bool,
}

impl<'a> Token<'a> {
    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text as UTF-8 if it is valid UTF-8
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.text).ok()
    }

    /// Text with invalid UTF-8 replaced by U+FFFD
    pub fn text_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }

    /// Deep copy into independently owned storage
    pub fn to_owned_token(&self) -> OwnedToken {
        OwnedToken {
            text: self.text.to_vec(),
            span: self.span,
            quoted: self.quoted,
            started_escaped: self.started_escaped,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_lossy())
    }
}

/// A token whose text is owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OwnedToken {
    pub text: Vec<u8>,
    pub span: TextSpan,
    pub quoted: bool,
    pub started_escaped: bool,
}

impl OwnedToken {
    /// Overwrite this token with a copy of `source`, reusing the existing allocation
    pub fn copy_from(&mut self, source: &Token<'_>) {
        self.text.clear();
        self.text.extend_from_slice(source.text);
        self.span = source.span;
        self.quoted = source.quoted;
        self.started_escaped = source.started_escaped;
    }

    /// Borrow as a [`Token`]
    pub fn as_token(&self) -> Token<'_> {
        Token {
            text: &self.text,
            span: self.span,
            quoted: self.quoted,
            started_escaped: self.started_escaped,
        }
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.text).ok()
    }

    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Give up the token and keep only its text
    pub fn into_text(self) -> Vec<u8> {
        self.text
    }
}

impl From<Token<'_>> for OwnedToken {
    fn from(token: Token<'_>) -> Self {
        token.to_owned_token()
    }
}

impl fmt::Display for OwnedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_lossy())
    }
}
