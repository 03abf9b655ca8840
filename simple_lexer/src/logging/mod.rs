//! Global logging for the tokenizer
//!
//! Events are keyed by [`Code`]s whose metadata lives in [`codes`]. A single
//! [`LoggingService`] is installed process-wide; until then every macro is a
//! no-op, so the library can be embedded without touching global state.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::utils::TextSpan;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, Logger, LoggingService, MemoryLogger, NullLogger, StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the configured logging service
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    for code in codes::registered_error_codes() {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    let logging_service = Arc::new(service::create_configured_service());
    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Hand an event to the global service, if any
pub fn dispatch(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Whether debug events would be recorded
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<TextSpan>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);

    if let Some(s) = span {
        event = event.with_span(s);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    dispatch(event);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    dispatch(event);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    dispatch(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_without_logger_is_silent() {
        if is_initialized() {
            return;
        }
        assert!(!debug_enabled());
        dispatch(LogEvent::info("dropped"));
        log_error_with_context(
            codes::system::INTERNAL_ERROR,
            "dropped",
            Some(TextSpan::default()),
            vec![("key", "value")],
        );
    }
}
