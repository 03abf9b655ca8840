//! Pull-based tokenizer for shell-like text
//!
//! The tokenizer owns a bounded scratch buffer and all in-progress token state.
//! Input arrives as borrowed chunks through [`InputView`]; a token may span any
//! number of chunks. Each extraction returns at most one token, which borrows
//! the scratch buffer until the next extraction.
//!
//! Per-byte rules, in priority order:
//!
//! 1. inside a comment, bytes are discarded up to and including `\n`
//! 2. after a backslash, the byte is decoded through the C escape table and appended
//! 3. `\n` is kept inside quotes, ends an unquoted token, and is skipped otherwise
//! 4. other whitespace and NUL behave like `\n` without touching the line counter
//! 5. `"` opens or closes a quoted token; next to unquoted text it ends that token
//!    and is re-read on the next call
//! 6. `\` starts an escape (and an unquoted token, if none is open)
//! 7. `#` is literal inside quotes, otherwise starts a comment and ends unquoted text
//! 8. anything else is token text

use super::error::LexerError;
use crate::config::compile_time::lexical::{
    DEFAULT_TOKEN_BUFFER_CAPACITY, MAX_TOKEN_BUFFER_CAPACITY, MIN_TOKEN_BUFFER_CAPACITY,
};
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::Token;
use crate::utils::{TextPosition, TextSpan};
use crate::{log_debug, log_error, log_success};
use serde::Serialize;

/// Scanner state. Escaping is only possible inside a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerState {
    /// Between tokens
    Normal,
    /// After an unquoted `#`, until the next newline
    InComment,
    Unquoted { escaping: bool },
    Quoted { escaping: bool },
    /// `finish` has run; only a reset leaves this state
    Finished,
}

impl LexerState {
    pub fn in_token(&self) -> bool {
        matches!(self, LexerState::Unquoted { .. } | LexerState::Quoted { .. })
    }

    pub fn is_escaping(&self) -> bool {
        matches!(
            self,
            LexerState::Unquoted { escaping: true } | LexerState::Quoted { escaping: true }
        )
    }

    pub fn is_finished(&self) -> bool {
        *self == LexerState::Finished
    }

    fn with_escaping(self, escaping: bool) -> Self {
        match self {
            LexerState::Unquoted { .. } => LexerState::Unquoted { escaping },
            LexerState::Quoted { .. } => LexerState::Quoted { escaping },
            other => other,
        }
    }
}

/// Running counters kept by a tokenizer between resets
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TokenizerMetrics {
    pub total_tokens: usize,
    pub quoted_tokens: usize,
    pub escaped_starts: usize,
    pub comments_skipped: usize,
    pub max_token_length: usize,
    pub bytes_consumed: usize,
    pub chunks_fed: usize,
}

impl TokenizerMetrics {
    fn record_token(&mut self, shape: &TokenShape, length: usize) {
        self.total_tokens += 1;
        if shape.quoted {
            self.quoted_tokens += 1;
        }
        if shape.started_escaped {
            self.escaped_starts += 1;
        }
        self.max_token_length = self.max_token_length.max(length);
    }
}

/// Everything about a completed token except its text
#[derive(Debug, Clone, Copy)]
struct TokenShape {
    span: TextSpan,
    quoted: bool,
    started_escaped: bool,
}

/// Result of feeding one byte to the state machine
enum Step {
    /// Byte consumed, keep scanning
    Continue,
    /// Token complete. `consumed` is false when the byte must be read again.
    Emit { shape: TokenShape, consumed: bool },
    /// Byte did not fit into the scratch buffer and was not consumed
    Overflow,
}

/// C escape table; any other byte stands for itself
pub fn decode_escape(byte: u8) -> u8 {
    match byte {
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0B,
        other => other,
    }
}

/// Token separators: C `isspace` in the default locale, plus NUL.
/// `u8::is_ascii_whitespace` would miss vertical tab.
pub fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r' | 0)
}

#[derive(Debug)]
pub struct Tokenizer {
    state: LexerState,
    position: TextPosition,
    /// Column reached on the previous line when its newline was consumed
    previous_line_columns: usize,
    token_start: TextPosition,
    escape_position: TextPosition,
    started_escaped: bool,
    buffer: Vec<u8>,
    capacity: usize,
    /// Buffer still holds the last delivered token
    delivered: bool,
    metrics: TokenizerMetrics,
    preferences: LexicalPreferences,
}

impl Tokenizer {
    /// Tokenizer whose longest token is `capacity - 1` bytes
    pub fn new(capacity: usize) -> Result<Self, LexerError> {
        validate_capacity(capacity)?;
        Ok(Self::build(capacity, LexicalPreferences::default()))
    }

    /// Tokenizer sized and configured from runtime preferences
    pub fn with_preferences(preferences: LexicalPreferences) -> Result<Self, LexerError> {
        validate_capacity(preferences.token_buffer_capacity)?;
        Ok(Self::build(preferences.token_buffer_capacity, preferences))
    }

    fn build(capacity: usize, preferences: LexicalPreferences) -> Self {
        Self {
            state: LexerState::Normal,
            position: TextPosition::start(),
            previous_line_columns: 0,
            token_start: TextPosition::start(),
            escape_position: TextPosition::start(),
            started_escaped: false,
            buffer: Vec::new(),
            capacity,
            delivered: false,
            metrics: TokenizerMetrics::default(),
            preferences,
        }
    }

    /// Return to the start-of-stream state with a new buffer capacity.
    ///
    /// On error the tokenizer is left untouched.
    pub fn reset(&mut self, capacity: usize) -> Result<(), LexerError> {
        validate_capacity(capacity)?;

        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.clear();
        let preferences = std::mem::take(&mut self.preferences);
        *self = Self::build(capacity, preferences);
        self.buffer = buffer;

        log_success!(codes::success::TOKENIZER_RESET, "Tokenizer reset",
            "capacity" => capacity);
        Ok(())
    }

    /// Supply the next chunk of input.
    ///
    /// Reading starts at the first byte of `input`. Dropping the returned view
    /// discards whatever it has not consumed; in-progress token state stays.
    pub fn set_input<'src>(&mut self, input: &'src [u8]) -> InputView<'_, 'src> {
        if self.preferences.collect_metrics {
            self.metrics.chunks_fed += 1;
        }
        InputView {
            tokenizer: self,
            input,
            cursor: 0,
        }
    }

    /// End of all input.
    ///
    /// Reports a dangling quote or backslash and flushes buffered text as a
    /// final token; both can happen at once. Afterwards every call yields
    /// end of input until [`reset`](Self::reset).
    pub fn finish(&mut self) -> FinishOutcome<'_> {
        self.release_delivered();

        if self.state.is_finished() {
            return FinishOutcome::end_of_input();
        }

        let mut error = None;
        if self.state.is_escaping() {
            error = Some(LexerError::UnterminatedEscape {
                position: self.escape_position,
            });
        }
        if let LexerState::Quoted { .. } = self.state {
            error = Some(LexerError::UnterminatedQuote {
                start: self.token_start,
            });
        }

        let shape = if self.buffer.is_empty() {
            None
        } else {
            Some(self.finish_token(false))
        };
        self.state = LexerState::Finished;

        if let Some(error) = &error {
            log_error!(error.error_code(), &error.to_string(),
                span = TextSpan::single(error.position().unwrap_or(self.position)),
                "flushed_token" => shape.is_some()
            );
        }
        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization finished",
            "tokens" => self.metrics.total_tokens,
            "bytes" => self.metrics.bytes_consumed,
            "chunks" => self.metrics.chunks_fed
        );

        match shape {
            Some(shape) => {
                self.delivered = true;
                FinishOutcome {
                    token: Some(self.token(shape)),
                    error,
                }
            }
            None => FinishOutcome { token: None, error },
        }
    }

    pub fn state(&self) -> LexerState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Position of the next byte to be read
    pub fn position(&self) -> TextPosition {
        self.position
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Longest token text the buffer can hold
    pub fn max_token_length(&self) -> usize {
        self.capacity - 1
    }

    /// Bytes of the token currently being assembled
    pub fn pending_len(&self) -> usize {
        if self.delivered {
            0
        } else {
            self.buffer.len()
        }
    }

    pub fn metrics(&self) -> &TokenizerMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    fn release_delivered(&mut self) {
        if self.delivered {
            self.buffer.clear();
            self.delivered = false;
        }
    }

    fn step(&mut self, byte: u8) -> Step {
        match self.state {
            // next_token never steps a finished tokenizer
            LexerState::Finished => return Step::Continue,
            LexerState::InComment => {
                if byte == b'\n' {
                    self.state = LexerState::Normal;
                }
                self.advance(byte);
                return Step::Continue;
            }
            LexerState::Unquoted { escaping: true } | LexerState::Quoted { escaping: true } => {
                if !self.append(decode_escape(byte)) {
                    return Step::Overflow;
                }
                self.state = self.state.with_escaping(false);
                self.advance(byte);
                return Step::Continue;
            }
            _ => {}
        }

        match byte {
            b'"' => self.on_quote(),
            b'\\' => self.on_backslash(),
            b'#' => self.on_hash(),
            b if is_separator(b) => self.on_separator(b),
            b => self.on_text(b),
        }
    }

    fn on_separator(&mut self, byte: u8) -> Step {
        match self.state {
            LexerState::Quoted { .. } => {
                if !self.append(byte) {
                    return Step::Overflow;
                }
                self.advance(byte);
                Step::Continue
            }
            LexerState::Unquoted { .. } => {
                let shape = self.finish_token(false);
                self.advance(byte);
                Step::Emit {
                    shape,
                    consumed: true,
                }
            }
            _ => {
                self.advance(byte);
                Step::Continue
            }
        }
    }

    fn on_quote(&mut self) -> Step {
        match self.state {
            LexerState::Quoted { .. } => {
                // The closing quote itself is the last position of the span
                let shape = self.finish_token(true);
                self.advance(b'"');
                Step::Emit {
                    shape,
                    consumed: true,
                }
            }
            LexerState::Unquoted { .. } => Step::Emit {
                shape: self.finish_token(false),
                consumed: false,
            },
            _ => {
                self.start_token(LexerState::Quoted { escaping: false }, false);
                self.advance(b'"');
                Step::Continue
            }
        }
    }

    fn on_backslash(&mut self) -> Step {
        if self.state.in_token() {
            self.state = self.state.with_escaping(true);
        } else {
            self.start_token(LexerState::Unquoted { escaping: true }, true);
        }
        self.escape_position = self.position;
        self.advance(b'\\');
        Step::Continue
    }

    fn on_hash(&mut self) -> Step {
        if let LexerState::Quoted { .. } = self.state {
            if !self.append(b'#') {
                return Step::Overflow;
            }
            self.advance(b'#');
            return Step::Continue;
        }

        if self.preferences.collect_metrics {
            self.metrics.comments_skipped += 1;
        }

        if self.buffer.is_empty() {
            self.state = LexerState::InComment;
            self.advance(b'#');
            return Step::Continue;
        }

        let shape = self.finish_token(false);
        self.state = LexerState::InComment;
        self.advance(b'#');
        Step::Emit {
            shape,
            consumed: true,
        }
    }

    fn on_text(&mut self, byte: u8) -> Step {
        if !self.state.in_token() {
            self.start_token(LexerState::Unquoted { escaping: false }, false);
        }
        if !self.append(byte) {
            return Step::Overflow;
        }
        self.advance(byte);
        Step::Continue
    }

    fn start_token(&mut self, state: LexerState, started_escaped: bool) {
        debug_assert!(!self.state.in_token());
        self.state = state;
        self.token_start = self.position;
        self.started_escaped = started_escaped;
    }

    /// Close the current token. Its end is either the current position or the
    /// byte before it.
    fn finish_token(&mut self, end_at_current: bool) -> TokenShape {
        let end = if end_at_current {
            self.position
        } else {
            self.position.previous(self.previous_line_columns)
        };

        let shape = TokenShape {
            span: TextSpan::new(self.token_start, end),
            quoted: matches!(self.state, LexerState::Quoted { .. }),
            started_escaped: self.started_escaped,
        };
        self.state = LexerState::Normal;

        if self.preferences.collect_metrics {
            self.metrics.record_token(&shape, self.buffer.len());
        }
        shape
    }

    fn append(&mut self, byte: u8) -> bool {
        if self.buffer.len() < self.capacity - 1 {
            self.buffer.push(byte);
            true
        } else {
            false
        }
    }

    fn advance(&mut self, byte: u8) {
        if byte == b'\n' {
            self.previous_line_columns = self.position.column;
            self.position = self.position.next_line();
        } else {
            self.position = self.position.next_column();
        }
    }

    fn token(&self, shape: TokenShape) -> Token<'_> {
        Token {
            text: &self.buffer,
            span: shape.span,
            quoted: shape.quoted,
            started_escaped: shape.started_escaped,
        }
    }

    fn overflow(&mut self) -> LexerError {
        let shape = self.finish_token(false);
        let partial = self.token(shape).to_owned_token();
        self.buffer.clear();

        log_error!(codes::lexical::TOKEN_TOO_LARGE, "Token exceeds buffer capacity",
            span = shape.span,
            "capacity" => self.capacity,
            "length" => partial.len()
        );

        LexerError::TokenTooLarge {
            capacity: self.capacity,
            partial,
        }
    }

    fn record_consumed(&mut self, bytes: usize) {
        if self.preferences.collect_metrics {
            self.metrics.bytes_consumed += bytes;
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::build(DEFAULT_TOKEN_BUFFER_CAPACITY, LexicalPreferences::default())
    }
}

pub fn validate_capacity(capacity: usize) -> Result<(), LexerError> {
    if (MIN_TOKEN_BUFFER_CAPACITY..=MAX_TOKEN_BUFFER_CAPACITY).contains(&capacity) {
        Ok(())
    } else {
        Err(LexerError::InvalidBufferCapacity {
            requested: capacity,
            min: MIN_TOKEN_BUFFER_CAPACITY,
            max: MAX_TOKEN_BUFFER_CAPACITY,
        })
    }
}

/// A chunk of input being read by a tokenizer
pub struct InputView<'t, 'src> {
    tokenizer: &'t mut Tokenizer,
    input: &'src [u8],
    cursor: usize,
}

impl<'t, 'src> InputView<'t, 'src> {
    /// Extract the next token from this chunk.
    ///
    /// `Ok(None)` means the chunk is used up (or the tokenizer is finished);
    /// any partial token is kept for the next chunk or for `finish`.
    pub fn next_token(&mut self) -> Result<Option<Token<'_>>, LexerError> {
        let tokenizer = &mut *self.tokenizer;
        tokenizer.release_delivered();

        if tokenizer.state.is_finished() || self.cursor >= self.input.len() {
            return Ok(None);
        }

        let first = self.cursor;
        while self.cursor < self.input.len() {
            match tokenizer.step(self.input[self.cursor]) {
                Step::Continue => self.cursor += 1,
                Step::Emit { shape, consumed } => {
                    if consumed {
                        self.cursor += 1;
                    }
                    tokenizer.record_consumed(self.cursor - first);
                    tokenizer.delivered = true;

                    let token = tokenizer.token(shape);
                    if tokenizer.preferences.log_token_events {
                        log_debug!("Token emitted",
                            span = shape.span,
                            "length" => token.len(),
                            "quoted" => token.quoted,
                            "started_escaped" => token.started_escaped
                        );
                    }
                    return Ok(Some(token));
                }
                Step::Overflow => {
                    tokenizer.record_consumed(self.cursor - first);
                    return Err(tokenizer.overflow());
                }
            }
        }

        tokenizer.record_consumed(self.cursor - first);
        Ok(None)
    }

    /// Bytes not yet read from this chunk
    pub fn remaining(&self) -> &'src [u8] {
        &self.input[self.cursor..]
    }

    /// Offset of the next byte to be read within this chunk
    pub fn offset(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.input.len()
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        self.tokenizer
    }
}

/// What [`Tokenizer::finish`] produced.
///
/// A token and an error can both be present: an unclosed quote still flushes
/// the text gathered so far. Neither present means end of input.
#[derive(Debug)]
pub struct FinishOutcome<'a> {
    pub token: Option<Token<'a>>,
    pub error: Option<LexerError>,
}

impl<'a> FinishOutcome<'a> {
    fn end_of_input() -> Self {
        Self {
            token: None,
            error: None,
        }
    }

    pub fn is_end_of_input(&self) -> bool {
        self.token.is_none() && self.error.is_none()
    }

    /// Collapse into a single result, preferring the error
    pub fn into_result(self) -> Result<Option<Token<'a>>, LexerError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.token),
        }
    }
}
