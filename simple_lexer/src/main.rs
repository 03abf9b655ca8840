use simple_lexer::config::{build_info, compile_time, RuntimeConfig};
use simple_lexer::logging::codes;
use simple_lexer::{lexical, logging, stream};
use simple_lexer::{LexerError, OwnedToken, StreamError, StreamReport, StreamTokenizer};
use std::env;
use std::io::{self, BufWriter, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("simplelex");

    let options = match parse_options(args.get(1..).unwrap_or(&[])) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <file|-> [options]", program_name);
            eprintln!("       {} --help", program_name);
            std::process::exit(1);
        }
    };

    if options.help {
        print_help(program_name);
        return Ok(());
    }

    let config = match load_config(&options) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    // Initialize global logging system
    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;
    lexical::init_lexical_logging()?;
    stream::init_stream_logging()?;

    let mut driver = StreamTokenizer::from_config(&config)?;
    simple_lexer::log_info!("Tokenizing input",
        "source" => if options.input == "-" { "stdin" } else { options.input.as_str() },
        "chunk_size" => driver.chunk_size(),
        "buffer_capacity" => driver.tokenizer().capacity()
    );
    let result = if options.input == "-" {
        driver.tokenize_reader(io::stdin().lock())
    } else {
        driver.tokenize_file(&options.input)
    };

    let report = match result {
        Ok(report) => report,
        Err(error) => {
            print_stream_error(&error);
            std::process::exit(1);
        }
    };

    print_tokens(&report.tokens, options.json)?;

    if !options.quiet {
        print_summary(&report);
    }

    if let Some(error) = &report.finish_error {
        eprintln!("error[{}]: {}", error.error_code(), error);
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    input: String,
    chunk_size: Option<usize>,
    buffer_capacity: Option<usize>,
    config_path: Option<String>,
    json: bool,
    quiet: bool,
    help: bool,
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut input = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                options.help = true;
                return Ok(options);
            }
            "--json" => options.json = true,
            "--quiet" => options.quiet = true,
            "--chunk-size" => {
                options.chunk_size = Some(parse_number(args, i)?);
                i += 1;
            }
            "--buffer-capacity" => {
                options.buffer_capacity = Some(parse_number(args, i)?);
                i += 1;
            }
            "--config" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| "--config requires a path".to_string())?;
                options.config_path = Some(path.clone());
                i += 1;
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown option '{}'", other));
            }
            other => {
                if input.is_some() {
                    return Err(format!("Unexpected argument '{}'", other));
                }
                input = Some(other.to_string());
            }
        }
        i += 1;
    }

    options.input = input.ok_or_else(|| "Missing input file (use - for stdin)".to_string())?;
    Ok(options)
}

fn parse_number(args: &[String], i: usize) -> Result<usize, String> {
    let value = args
        .get(i + 1)
        .ok_or_else(|| format!("{} requires a number", args[i]))?;
    value
        .parse::<usize>()
        .map_err(|_| format!("Invalid value '{}' for {}", value, args[i]))
}

/// Config file (or environment defaults) with command-line overrides applied
fn load_config(options: &CliOptions) -> Result<RuntimeConfig, String> {
    let mut config = match &options.config_path {
        Some(path) => RuntimeConfig::load(path)
            .map_err(|e| format!("[{}] {}", e.error_code(), e))?,
        None => RuntimeConfig::default(),
    };

    if let Some(chunk_size) = options.chunk_size {
        config.stream.read_chunk_size = chunk_size;
    }
    if let Some(capacity) = options.buffer_capacity {
        config.lexical.token_buffer_capacity = capacity;
    }

    config
        .validate()
        .map_err(|e| format!("[{}] {}", e.error_code(), e))?;
    Ok(config)
}

fn print_help(program_name: &str) {
    println!("simplelex v{}", env!("CARGO_PKG_VERSION"));
    println!("Shell-like tokenizer: whitespace-separated words, double quotes, backslash escapes, # comments");
    println!();
    println!("USAGE:");
    println!("    {} <file> [options]       # Tokenize a file", program_name);
    println!("    {} - [options]            # Tokenize stdin", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help                  Show this help message");
    println!("    --chunk-size N          Bytes read per input chunk");
    println!("    --buffer-capacity N     Token buffer capacity (longest token is N - 1 bytes)");
    println!("    --config PATH           Load runtime preferences from a TOML file");
    println!("    --json                  Print one JSON object per token");
    println!("    --quiet                 Suppress the summary line");
    println!();
    println!("OUTPUT:");
    println!("    <start>-<end> <flags> <text>");
    println!("    flags: q = quoted, e = started with an escape");
    println!();
    println!("LIMITS ({}):", build_info::source_info());
    println!(
        "    Token buffer capacity: default {}, min {}, max {}",
        compile_time::lexical::DEFAULT_TOKEN_BUFFER_CAPACITY,
        compile_time::lexical::MIN_TOKEN_BUFFER_CAPACITY,
        compile_time::lexical::MAX_TOKEN_BUFFER_CAPACITY
    );
    println!(
        "    Read chunk size: default {}, max {}",
        compile_time::stream::DEFAULT_READ_CHUNK_SIZE,
        compile_time::stream::MAX_READ_CHUNK_SIZE
    );
}

fn flags(token: &OwnedToken) -> String {
    let quoted = if token.quoted { 'q' } else { '-' };
    let escaped = if token.started_escaped { 'e' } else { '-' };
    format!("{}{}", quoted, escaped)
}

fn format_token(token: &OwnedToken, json: bool) -> String {
    if json {
        serde_json::json!({
            "start": { "line": token.span.start.line, "column": token.span.start.column },
            "end": { "line": token.span.end.line, "column": token.span.end.column },
            "quoted": token.quoted,
            "started_escaped": token.started_escaped,
            "text": token.text_lossy(),
        })
        .to_string()
    } else {
        format!(
            "{} {} {}",
            token.span,
            flags(token),
            token.text().escape_ascii()
        )
    }
}

fn print_tokens(tokens: &[OwnedToken], json: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for token in tokens {
        writeln!(out, "{}", format_token(token, json))?;
    }
    out.flush()
}

fn print_summary(report: &StreamReport) {
    let metrics = &report.metrics;
    eprintln!(
        "{} tokens ({} quoted, {} escaped), {} comments, {} bytes in {} chunks",
        metrics.total_tokens,
        metrics.quoted_tokens,
        metrics.escaped_starts,
        metrics.comments_skipped,
        metrics.bytes_consumed,
        metrics.chunks_fed
    );
}

fn print_stream_error(error: &StreamError) {
    eprintln!("error[{}]: {}", error.error_code(), error);

    if let StreamError::Lexer(LexerError::TokenTooLarge { partial, .. }) = error {
        eprintln!(
            "  --> {} (first {} bytes kept)",
            partial.span,
            partial.len()
        );
    }

    let code = error.error_code();
    let action = codes::get_action(code.as_str());
    if !action.is_empty() {
        eprintln!("  = help: {}", action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_lexer::{TextPosition, TextSpan};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&[
            "input.txt",
            "--chunk-size",
            "16",
            "--buffer-capacity",
            "128",
            "--json",
        ]))
        .unwrap();

        assert_eq!(options.input, "input.txt");
        assert_eq!(options.chunk_size, Some(16));
        assert_eq!(options.buffer_capacity, Some(128));
        assert!(options.json);
        assert!(!options.quiet);
    }

    #[test]
    fn test_parse_options_stdin_and_help() {
        let options = parse_options(&args(&["-", "--quiet", "--config", "lexer.toml"])).unwrap();
        assert_eq!(options.input, "-");
        assert!(options.quiet);
        assert_eq!(options.config_path.as_deref(), Some("lexer.toml"));

        assert!(parse_options(&args(&["--help"])).unwrap().help);
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&args(&[])).is_err());
        assert!(parse_options(&args(&["a", "b"])).is_err());
        assert!(parse_options(&args(&["a", "--chunk-size"])).is_err());
        assert!(parse_options(&args(&["a", "--chunk-size", "many"])).is_err());
        assert!(parse_options(&args(&["a", "--verbose"])).is_err());
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let options = CliOptions {
            input: "-".to_string(),
            chunk_size: Some(7),
            buffer_capacity: Some(33),
            ..Default::default()
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.stream.read_chunk_size, 7);
        assert_eq!(config.lexical.token_buffer_capacity, 33);

        let invalid = CliOptions {
            input: "-".to_string(),
            buffer_capacity: Some(1),
            ..Default::default()
        };
        assert!(load_config(&invalid).unwrap_err().contains("ERR003"));
    }

    #[test]
    fn test_format_token() {
        let token = OwnedToken {
            text: b"a\tb".to_vec(),
            span: TextSpan::new(TextPosition::new(1, 1), TextPosition::new(1, 6)),
            quoted: true,
            started_escaped: false,
        };

        assert_eq!(format_token(&token, false), "1:1-6 q- a\\tb");

        let json: serde_json::Value = serde_json::from_str(&format_token(&token, true)).unwrap();
        assert_eq!(json["text"], "a\tb");
        assert_eq!(json["quoted"], true);
        assert_eq!(json["end"]["column"], 6);
    }
}
