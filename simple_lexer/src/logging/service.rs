//! Logging service and logger implementations

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front end over a [`Logger`]
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
    output_enabled: bool,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self {
            logger,
            min_level,
            output_enabled: true,
        }
    }

    /// Service built from the installed runtime logging preferences
    pub fn with_config() -> Self {
        Self::build(
            config::use_console_logging(),
            config::use_structured_logging(),
            config::get_min_log_level(),
        )
    }

    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        Self::build(
            preferences.enable_console_logging,
            preferences.use_structured_logging,
            preferences.min_log_level.to_events_log_level(),
        )
    }

    fn build(console: bool, structured: bool, min_level: LogLevel) -> Self {
        if !console {
            return Self {
                logger: Arc::new(NullLogger),
                min_level,
                output_enabled: false,
            };
        }

        let logger: Arc<dyn Logger> = if structured {
            Arc::new(StructuredLogger::new(min_level))
        } else {
            Arc::new(ConsoleLogger::new(min_level))
        };
        Self::new(logger, min_level)
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// False for every level when console output is disabled
    pub fn should_log(&self, level: LogLevel) -> bool {
        self.output_enabled && level <= self.min_level
    }

    pub fn log_event(&self, mut event: LogEvent) {
        if self.should_log(event.level) {
            event.truncate_message(config::get_max_log_message_length());
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Human-readable lines on stderr; stdout belongs to the token output
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            eprintln!("{}", event.format());
        }
    }
}

/// Discards everything; installed when console logging is disabled
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// One JSON object per line on stderr
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level > self.min_level {
            return;
        }
        let line = event.format_json().unwrap_or_else(|_| event.format());
        eprintln!("{}", line);
    }
}

/// Bounded in-memory capture, mainly for tests
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(config::get_log_buffer_size())
    }

    /// Keep at most `capacity` events, dropping the oldest
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        // Poisoning is ignored: the event list is never left half-written
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.lock().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn get_events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_info() && e.code == code)
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        if events.len() >= self.capacity {
            let remove_count = events.len() - self.capacity + 1;
            events.drain(0..remove_count);
        }
        events.push(event.clone());
    }
}

pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

pub fn create_test_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::error(
            codes::lexical::UNTERMINATED_QUOTE,
            "Error message",
        ));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.get_errors().len(), 1);
        assert!(logger.has_error_with_code(codes::lexical::UNTERMINATED_QUOTE));

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_memory_logger_drops_oldest() {
        let logger = MemoryLogger::with_capacity(2);
        logger.log(&LogEvent::info("first"));
        logger.log(&LogEvent::info("second"));
        logger.log(&LogEvent::info("third"));

        let messages: Vec<String> = logger.get_events().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["second", "third"]);
    }

    #[test]
    fn test_logging_service() {
        let logger = create_test_logger();
        let service = LoggingService::new(logger.clone(), LogLevel::Debug);

        service.log_error(codes::stream::IO_ERROR, "Read failed");
        service.log_success(codes::success::TOKENIZATION_COMPLETE, "Done");
        service.log_warning("Careful");
        service.log_debug("Details");

        assert_eq!(logger.event_count(), 4);
        assert!(logger.has_error_with_code(codes::stream::IO_ERROR));
        assert!(logger.has_success_with_code(codes::success::TOKENIZATION_COMPLETE));
        assert_eq!(
            logger
                .get_events_with_code(codes::success::TOKENIZATION_COMPLETE)
                .len(),
            1
        );
    }

    #[test]
    fn test_log_level_filtering() {
        let logger = create_test_logger();
        let mut service = LoggingService::new(logger.clone(), LogLevel::Error);

        service.log_debug("Debug message");
        service.log_info("Info message");
        service.log_error(codes::system::INTERNAL_ERROR, "Error message");
        assert_eq!(logger.event_count(), 1);

        service.set_min_level(LogLevel::Info);
        service.log_info("Now visible");
        assert_eq!(logger.event_count(), 2);
    }

    #[test]
    fn test_console_preference_gates_output() {
        let mut preferences = LoggingPreferences {
            use_structured_logging: false,
            enable_console_logging: true,
            min_log_level: crate::config::runtime::LogLevel::Warning,
        };

        let service = LoggingService::from_preferences(&preferences);
        assert!(service.should_log(LogLevel::Error));
        assert!(!service.should_log(LogLevel::Debug));

        preferences.enable_console_logging = false;
        preferences.min_log_level = crate::config::runtime::LogLevel::Debug;
        let silent = LoggingService::from_preferences(&preferences);
        assert!(!silent.should_log(LogLevel::Error));
        assert!(!silent.should_log(LogLevel::Debug));
        silent.log_error(codes::system::INTERNAL_ERROR, "discarded");
    }

    #[test]
    fn test_console_and_structured_loggers_do_not_panic() {
        let event = LogEvent::error(codes::lexical::TOKEN_TOO_LARGE, "Too large")
            .with_context("capacity", "4");
        ConsoleLogger::new(LogLevel::Debug).log(&event);
        StructuredLogger::new(LogLevel::Debug).log(&event);
    }
}
