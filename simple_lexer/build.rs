// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    stream: StreamLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    default_token_buffer_capacity: usize,
    min_token_buffer_capacity: usize,
    max_token_buffer_capacity: usize,
}

#[derive(serde::Deserialize)]
struct StreamLimits {
    default_read_chunk_size: usize,
    max_read_chunk_size: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SIMPLE_LEXER_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SIMPLE_LEXER_CONFIG_DIR");

    let profile =
        env::var("SIMPLE_LEXER_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("SIMPLE_LEXER_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the simple_lexer directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_BUFFER: usize = 1 << 30;

    let lexical = &config.lexical;
    if lexical.min_token_buffer_capacity < 2 {
        panic!("LIMITS: min_token_buffer_capacity must be at least 2");
    }
    if lexical.max_token_buffer_capacity > ABSOLUTE_MAX_BUFFER {
        panic!("LIMITS: max_token_buffer_capacity exceeds absolute maximum");
    }
    if lexical.default_token_buffer_capacity < lexical.min_token_buffer_capacity
        || lexical.default_token_buffer_capacity > lexical.max_token_buffer_capacity
    {
        panic!("LIMITS: default_token_buffer_capacity outside [min, max]");
    }

    let stream = &config.stream;
    if stream.default_read_chunk_size == 0 || stream.default_read_chunk_size > stream.max_read_chunk_size
    {
        panic!("LIMITS: default_read_chunk_size must be in 1..=max_read_chunk_size");
    }

    if config.logging.log_buffer_size == 0 || config.logging.max_log_message_length == 0 {
        panic!("LIMITS: logging buffers must be non-empty");
    }

    if profile == "production" && lexical.max_token_buffer_capacity > 64 * 1024 * 1024 {
        panic!("PRODUCTION: max_token_buffer_capacity too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const DEFAULT_TOKEN_BUFFER_CAPACITY: usize = {};
        pub const MIN_TOKEN_BUFFER_CAPACITY: usize = {};
        pub const MAX_TOKEN_BUFFER_CAPACITY: usize = {};
    }}

    pub mod stream {{
        pub const DEFAULT_READ_CHUNK_SIZE: usize = {};
        pub const MAX_READ_CHUNK_SIZE: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.lexical.default_token_buffer_capacity,
        config.lexical.min_token_buffer_capacity,
        config.lexical.max_token_buffer_capacity,
        config.stream.default_read_chunk_size,
        config.stream.max_read_chunk_size,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
    );

    fs::write(output_path, constants_code).unwrap();
}
