// RUNTIME PREFERENCES (User Experience)
//
// Defaults come from SIMPLE_LEXER_* environment variables and fall back on the
// compile-time defaults. A TOML file can override any subset of fields.

use super::compile_time::{lexical, stream};
use crate::logging::codes;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration TOML: {message}")]
    Parse { message: String },

    #[error("Invalid value {value} for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        codes::system::CONFIGURATION_ERROR
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Scratch buffer capacity; the longest token is one byte shorter
    pub token_buffer_capacity: usize,

    /// Whether the tokenizer keeps running metrics
    pub collect_metrics: bool,

    /// Whether every emitted token is logged at debug level
    pub log_token_events: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            token_buffer_capacity: env::var(env_vars::TOKEN_BUFFER_CAPACITY)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(lexical::DEFAULT_TOKEN_BUFFER_CAPACITY),
            collect_metrics: env::var(env_vars::COLLECT_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_token_events: env::var(env_vars::LOG_TOKEN_EVENTS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamPreferences {
    /// Bytes handed to the tokenizer per input view
    pub read_chunk_size: usize,
}

impl Default for StreamPreferences {
    fn default() -> Self {
        Self {
            read_chunk_size: env::var(env_vars::READ_CHUNK_SIZE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(stream::DEFAULT_READ_CHUNK_SIZE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    pub enable_console_logging: bool,

    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub stream: StreamPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse and validate a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Check preferences against the compile-time bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let capacity = self.lexical.token_buffer_capacity;
        if !(lexical::MIN_TOKEN_BUFFER_CAPACITY..=lexical::MAX_TOKEN_BUFFER_CAPACITY)
            .contains(&capacity)
        {
            return Err(ConfigError::InvalidValue {
                field: "lexical.token_buffer_capacity",
                value: capacity.to_string(),
                reason: format!(
                    "must be between {} and {}",
                    lexical::MIN_TOKEN_BUFFER_CAPACITY,
                    lexical::MAX_TOKEN_BUFFER_CAPACITY
                ),
            });
        }

        let chunk = self.stream.read_chunk_size;
        if chunk == 0 || chunk > stream::MAX_READ_CHUNK_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "stream.read_chunk_size",
                value: chunk.to_string(),
                reason: format!("must be between 1 and {}", stream::MAX_READ_CHUNK_SIZE),
            });
        }

        Ok(())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Lexical
    pub const TOKEN_BUFFER_CAPACITY: &str = "SIMPLE_LEXER_TOKEN_BUFFER_CAPACITY";
    pub const COLLECT_METRICS: &str = "SIMPLE_LEXER_COLLECT_METRICS";
    pub const LOG_TOKEN_EVENTS: &str = "SIMPLE_LEXER_LOG_TOKEN_EVENTS";

    // Stream
    pub const READ_CHUNK_SIZE: &str = "SIMPLE_LEXER_READ_CHUNK_SIZE";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SIMPLE_LEXER_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SIMPLE_LEXER_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SIMPLE_LEXER_LOGGING_MIN_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [lexical]
            token_buffer_capacity = 64

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.lexical.token_buffer_capacity, 64);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
        assert!(config.stream.read_chunk_size > 0);
    }

    #[test]
    fn test_capacity_below_minimum_is_rejected() {
        let result = RuntimeConfig::from_toml_str("[lexical]\ntoken_buffer_capacity = 1\n");
        assert_matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "lexical.token_buffer_capacity",
                ..
            })
        );
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let result = RuntimeConfig::from_toml_str("[stream]\nread_chunk_size = 0\n");
        let error = result.unwrap_err();
        assert_matches!(error, ConfigError::InvalidValue { .. });
        assert_eq!(error.error_code(), codes::system::CONFIGURATION_ERROR);
    }

    #[test]
    fn test_malformed_toml() {
        assert_matches!(
            RuntimeConfig::from_toml_str("[lexical\n"),
            Err(ConfigError::Parse { .. })
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stream]\nread_chunk_size = 3").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.stream.read_chunk_size, 3);

        assert_matches!(
            RuntimeConfig::load(file.path().with_extension("missing")),
            Err(ConfigError::Io { .. })
        );
    }
}
