//! Configuration for the tokenizer
//!
//! Hard limits are generated by build.rs from `config/<profile>.toml` and live in
//! [`compile_time`]. User preferences are loaded at runtime from the
//! environment or a TOML file, see [`runtime`].

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{ConfigError, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("SIMPLE_LEXER_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("SIMPLE_LEXER_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::{lexical, logging, stream};

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(lexical::MIN_TOKEN_BUFFER_CAPACITY >= 2);
        assert!(lexical::DEFAULT_TOKEN_BUFFER_CAPACITY >= lexical::MIN_TOKEN_BUFFER_CAPACITY);
        assert!(lexical::DEFAULT_TOKEN_BUFFER_CAPACITY <= lexical::MAX_TOKEN_BUFFER_CAPACITY);
        assert!(stream::DEFAULT_READ_CHUNK_SIZE > 0);
        assert!(logging::LOG_BUFFER_SIZE > 0);
    }

    #[test]
    fn test_source_info_names_profile() {
        assert!(super::build_info::source_info().ends_with(".toml"));
    }
}
