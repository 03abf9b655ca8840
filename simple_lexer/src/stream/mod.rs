//! Stream driver: feeds readers and files to a tokenizer chunk by chunk

mod processor;

use crate::config::compile_time::stream::{DEFAULT_READ_CHUNK_SIZE, MAX_READ_CHUNK_SIZE};
use crate::config::compile_time::lexical::DEFAULT_TOKEN_BUFFER_CAPACITY;
use crate::config::RuntimeConfig;
use crate::logging::codes;
use std::path::Path;

pub use processor::{validate_chunk_size, StreamError, StreamReport, StreamTokenizer};

/// Driver with the compile-time default chunk size and buffer capacity
pub fn create_stream_tokenizer() -> Result<StreamTokenizer, StreamError> {
    StreamTokenizer::new(DEFAULT_READ_CHUNK_SIZE, DEFAULT_TOKEN_BUFFER_CAPACITY)
}

/// Driver configured from runtime preferences
pub fn create_stream_tokenizer_from_config(
    config: &RuntimeConfig,
) -> Result<StreamTokenizer, StreamError> {
    StreamTokenizer::from_config(config)
}

/// Tokenize a file with default settings
pub fn tokenize_file<P: AsRef<Path>>(path: P) -> Result<StreamReport, StreamError> {
    create_stream_tokenizer()?.tokenize_file(path)
}

/// Check that every stream code is registered
pub fn init_stream_logging() -> Result<(), String> {
    let stream_codes = [
        codes::stream::IO_ERROR,
        codes::stream::FILE_NOT_FOUND,
        codes::stream::INVALID_CHUNK_SIZE,
    ];

    for code in &stream_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Stream error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Stream limits initialized",
        "default_chunk_size" => DEFAULT_READ_CHUNK_SIZE,
        "max_chunk_size" => MAX_READ_CHUNK_SIZE
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_create_stream_tokenizer() {
        let driver = create_stream_tokenizer().unwrap();
        assert_eq!(driver.chunk_size(), DEFAULT_READ_CHUNK_SIZE);
        assert_eq!(driver.tokenizer().capacity(), DEFAULT_TOKEN_BUFFER_CAPACITY);
    }

    #[test]
    fn test_tokenize_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha beta").unwrap();
        writeln!(file, "\"gamma delta\"").unwrap();

        let report = tokenize_file(file.path()).unwrap();
        let tokens = report.into_tokens().unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].as_str(), Some("gamma delta"));
        assert!(tokens[2].quoted);
    }

    #[test]
    fn test_init_stream_logging() {
        assert!(init_stream_logging().is_ok());
    }
}
