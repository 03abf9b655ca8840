//! Chunked tokenization of readers and files

use crate::config::compile_time::stream::MAX_READ_CHUNK_SIZE;
use crate::config::RuntimeConfig;
use crate::lexical::{LexerError, Tokenizer, TokenizerMetrics};
use crate::logging::codes;
use crate::tokens::{duplicate, OwnedToken};
use crate::{log_debug, log_error, log_success, log_warning};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Stream driver errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("I/O error reading input: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid read chunk size: {size} (must be between 1 and {max})")]
    InvalidChunkSize { size: usize, max: usize },

    #[error(transparent)]
    Lexer(#[from] LexerError),
}

impl StreamError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            StreamError::Io { .. } => codes::stream::IO_ERROR,
            StreamError::FileNotFound { .. } => codes::stream::FILE_NOT_FOUND,
            StreamError::InvalidChunkSize { .. } => codes::stream::INVALID_CHUNK_SIZE,
            StreamError::Lexer(error) => error.error_code(),
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
}

impl From<io::Error> for StreamError {
    fn from(error: io::Error) -> Self {
        StreamError::Io {
            message: error.to_string(),
        }
    }
}

/// Everything a stream run produced
#[derive(Debug, Clone, PartialEq)]
pub struct StreamReport {
    pub tokens: Vec<OwnedToken>,
    pub metrics: TokenizerMetrics,
    /// Dangling quote or escape detected at end of input. The flushed text,
    /// if any, is still the last entry of `tokens`.
    pub finish_error: Option<LexerError>,
}

impl StreamReport {
    pub fn is_clean(&self) -> bool {
        self.finish_error.is_none()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Fail on a finish error, otherwise hand back the tokens
    pub fn into_tokens(self) -> Result<Vec<OwnedToken>, LexerError> {
        match self.finish_error {
            Some(error) => Err(error),
            None => Ok(self.tokens),
        }
    }
}

/// Feeds a tokenizer from any reader, one fixed-size chunk at a time
#[derive(Debug)]
pub struct StreamTokenizer {
    tokenizer: Tokenizer,
    chunk: Vec<u8>,
}

impl StreamTokenizer {
    pub fn new(chunk_size: usize, capacity: usize) -> Result<Self, StreamError> {
        validate_chunk_size(chunk_size)?;
        Ok(Self {
            tokenizer: Tokenizer::new(capacity)?,
            chunk: vec![0; chunk_size],
        })
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<Self, StreamError> {
        validate_chunk_size(config.stream.read_chunk_size)?;
        Ok(Self {
            tokenizer: Tokenizer::with_preferences(config.lexical.clone())?,
            chunk: vec![0; config.stream.read_chunk_size],
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk.len()
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Tokenize everything `reader` yields.
    ///
    /// The tokenizer is reset first, so one driver can process many inputs.
    pub fn tokenize_reader<R: Read>(&mut self, mut reader: R) -> Result<StreamReport, StreamError> {
        let capacity = self.tokenizer.capacity();
        self.tokenizer.reset(capacity)?;

        let mut tokens = Vec::new();
        loop {
            let read = match reader.read(&mut self.chunk) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let error = StreamError::from(e);
                    log_error!(error.error_code(), "Failed to read input chunk",
                        "message" => &error
                    );
                    return Err(error);
                }
            };

            let mut view = self.tokenizer.set_input(&self.chunk[..read]);
            while let Some(token) = view.next_token()? {
                tokens.push(duplicate(&token));
            }
        }

        let outcome = self.tokenizer.finish();
        if let Some(token) = &outcome.token {
            tokens.push(duplicate(token));
        }
        let finish_error = outcome.error;
        if let Some(error) = &finish_error {
            log_warning!("Input ended inside an unfinished token",
                "error" => error,
                "flushed" => outcome.token.is_some()
            );
        }

        let report = StreamReport {
            tokens,
            metrics: self.tokenizer.metrics().clone(),
            finish_error,
        };

        log_success!(codes::success::STREAM_PROCESSING_COMPLETE, "Stream tokenized",
            "tokens" => report.token_count(),
            "bytes" => report.metrics.bytes_consumed,
            "chunks" => report.metrics.chunks_fed,
            "clean" => report.is_clean()
        );

        Ok(report)
    }

    pub fn tokenize_bytes(&mut self, input: &[u8]) -> Result<StreamReport, StreamError> {
        self.tokenize_reader(input)
    }

    pub fn tokenize_file<P: AsRef<Path>>(&mut self, path: P) -> Result<StreamReport, StreamError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        log_debug!("Opening input file", "file" => display.as_str());

        let file = File::open(path).map_err(|e| {
            let error = if e.kind() == io::ErrorKind::NotFound {
                StreamError::FileNotFound {
                    path: display.clone(),
                }
            } else {
                StreamError::from(e)
            };
            log_error!(error.error_code(), "Failed to open input file",
                "file" => display.as_str()
            );
            error
        })?;

        self.tokenize_reader(io::BufReader::new(file))
    }
}

pub fn validate_chunk_size(chunk_size: usize) -> Result<(), StreamError> {
    if chunk_size == 0 || chunk_size > MAX_READ_CHUNK_SIZE {
        let error = StreamError::InvalidChunkSize {
            size: chunk_size,
            max: MAX_READ_CHUNK_SIZE,
        };
        log_error!(error.error_code(), "Rejected read chunk size",
            "size" => chunk_size
        );
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    const INPUT: &[u8] = b"# config\nname \"Jane Doe\"\npath /usr/local\\ bin\nflags -v\\t-x # trailing\n";

    fn texts(report: &StreamReport) -> Vec<String> {
        report.tokens.iter().map(|t| t.text_lossy().into_owned()).collect()
    }

    #[test]
    fn test_chunk_size_does_not_change_tokens() {
        let whole = StreamTokenizer::new(INPUT.len(), 64)
            .unwrap()
            .tokenize_bytes(INPUT)
            .unwrap();
        let bytewise = StreamTokenizer::new(1, 64)
            .unwrap()
            .tokenize_bytes(INPUT)
            .unwrap();

        assert_eq!(whole.tokens, bytewise.tokens);
        assert_eq!(
            texts(&whole),
            vec!["name", "Jane Doe", "path", "/usr/local bin", "flags", "-v\t-x"]
        );
        assert_eq!(bytewise.metrics.chunks_fed, INPUT.len());
        assert_eq!(whole.metrics.chunks_fed, 1);
        assert_eq!(bytewise.metrics.bytes_consumed, INPUT.len());
    }

    #[test]
    fn test_driver_is_reusable() {
        let mut driver = StreamTokenizer::new(8, 64).unwrap();
        let first = driver.tokenize_bytes(b"one two").unwrap();
        let second = driver.tokenize_bytes(b"one two").unwrap();
        assert_eq!(first, second);
        assert_eq!(second.metrics.total_tokens, 2);
    }

    #[test]
    fn test_finish_error_keeps_flushed_token() {
        let mut driver = StreamTokenizer::new(4, 64).unwrap();
        let report = driver.tokenize_bytes(b"say \"unfinished").unwrap();

        assert!(!report.is_clean());
        assert_matches!(report.finish_error, Some(LexerError::UnterminatedQuote { .. }));
        assert_eq!(texts(&report), vec!["say", "unfinished"]);
        assert_matches!(report.into_tokens(), Err(LexerError::UnterminatedQuote { .. }));
    }

    #[test]
    fn test_token_too_large_is_an_error() {
        let mut driver = StreamTokenizer::new(3, 4).unwrap();
        let result = driver.tokenize_bytes(b"ok waytoolong");
        assert_matches!(
            result,
            Err(StreamError::Lexer(LexerError::TokenTooLarge { capacity: 4, .. }))
        );
    }

    #[test]
    fn test_tokenize_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(INPUT).unwrap();
        file.flush().unwrap();

        let report = StreamTokenizer::new(5, 64)
            .unwrap()
            .tokenize_file(file.path())
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.token_count(), 6);
        assert_eq!(report.tokens[1].span.start.line, 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.txt");

        let result = StreamTokenizer::new(16, 64).unwrap().tokenize_file(&missing);
        assert_matches!(result, Err(StreamError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_chunk_size() {
        assert_matches!(
            StreamTokenizer::new(0, 64),
            Err(StreamError::InvalidChunkSize { size: 0, .. })
        );
        assert_matches!(
            StreamTokenizer::new(MAX_READ_CHUNK_SIZE + 1, 64),
            Err(StreamError::InvalidChunkSize { .. })
        );
        assert_matches!(
            StreamTokenizer::new(16, 1),
            Err(StreamError::Lexer(LexerError::InvalidBufferCapacity { .. }))
        );
    }

    #[test]
    fn test_from_config() {
        let config = RuntimeConfig::from_toml_str(
            "[lexical]\ntoken_buffer_capacity = 16\n[stream]\nread_chunk_size = 2\n",
        )
        .unwrap();
        let driver = StreamTokenizer::from_config(&config).unwrap();
        assert_eq!(driver.chunk_size(), 2);
        assert_eq!(driver.tokenizer().capacity(), 16);
    }

    #[test]
    fn test_error_classification() {
        let error = StreamError::FileNotFound {
            path: "x".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E031");
        assert_eq!(error.category(), "Stream");

        let lexer: StreamError = LexerError::UnterminatedEscape {
            position: crate::utils::TextPosition::start(),
        }
        .into();
        assert_eq!(lexer.error_code().as_str(), "E022");
        assert!(lexer.is_recoverable());
    }
}
