//! Log events

use super::codes::Code;
use crate::utils::TextSpan;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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
}

/// Generic codes for events that do not carry a specific one
pub const GENERIC_WARNING: Code = Code::new("W000");
pub const GENERIC_INFO: Code = Code::new("I000");
pub const GENERIC_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<TextSpan>,
    /// Ordered so formatted output is stable
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn with_level(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Error, error_code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::with_level(LogLevel::Warning, GENERIC_WARNING, message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::with_level(LogLevel::Info, GENERIC_INFO, message)
    }

    /// Info event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::with_level(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::with_level(LogLevel::Debug, GENERIC_DEBUG, message)
    }

    pub fn with_span(mut self, span: TextSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Cut the message down to at most `max_len` bytes on a char boundary
    pub fn truncate_message(&mut self, max_len: usize) {
        if self.message.len() <= max_len {
            return;
        }
        let mut cut = max_len;
        while !self.message.is_char_boundary(cut) {
            cut -= 1;
        }
        self.message.truncate(cut);
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    pub fn requires_halt(&self) -> bool {
        super::codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        super::codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        super::codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        super::codes::is_recoverable(self.code.as_str())
    }

    /// One-line format: `[LEVEL] CODE - message at line:col`
    pub fn format(&self) -> String {
        let span_str = self
            .span
            .as_ref()
            .map(|s| format!(" at {}", s.start()))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            span_str
        )
    }

    /// Multi-line format with registry metadata and context
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
            output.push_str(&format!("\n  Requires halt: {}", self.requires_halt()));

            let description = self.description();
            if description != "Unknown error" {
                output.push_str(&format!("\n  Description: {}", description));
            }

            let action = self.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("\n  Recommended action: {}", action));
            }
        }

        if let Some(span) = &self.span {
            output.push_str(&format!("\n  Span: {}", span));
        }

        if !self.context.is_empty() {
            output.push_str("\n  Context:");
            for (key, value) in &self.context {
                output.push_str(&format!("\n    {}: {}", key, value));
            }
        }

        output
    }

    /// JSON object for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "requires_halt": self.requires_halt(),
                "description": self.description(),
                "recommended_action": self.recommended_action(),
            });
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::to_value(span)?;
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::TextPosition;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::lexical::TOKEN_TOO_LARGE, "Token too large");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E020");
        assert_eq!(event.category(), "Lexical");
        assert!(event.requires_halt());
    }

    #[test]
    fn test_generic_codes() {
        assert_eq!(LogEvent::warning("w").code.as_str(), "W000");
        assert_eq!(LogEvent::info("i").code.as_str(), "I000");
        assert_eq!(LogEvent::debug("d").category(), "Debug");
    }

    #[test]
    fn test_event_formatting_with_span() {
        let span = TextSpan::new(TextPosition::new(2, 3), TextPosition::new(2, 9));
        let event = LogEvent::error(codes::lexical::UNTERMINATED_QUOTE, "Unclosed quote")
            .with_span(span)
            .with_context("capacity", "16");

        assert_eq!(event.format(), "[ERROR] E021 - Unclosed quote at 2:3");

        let detailed = event.format_detailed();
        assert!(detailed.contains("Category: Lexical"));
        assert!(detailed.contains("Recoverable: true"));
        assert!(detailed.contains("Span: 2:3-9"));
        assert!(detailed.contains("capacity: 16"));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::success(codes::success::TOKENIZATION_COMPLETE, "Done")
            .with_context("tokens", "3");

        let json: serde_json::Value =
            serde_json::from_str(&event.format_json().unwrap()).unwrap();

        assert_eq!(json["level"], "INFO");
        assert_eq!(json["code"], "I020");
        assert_eq!(json["context"]["tokens"], "3");
        assert!(json.get("error_metadata").is_none());
        assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_truncate_message_respects_char_boundaries() {
        let mut event = LogEvent::info("héllo");
        event.truncate_message(2);
        assert_eq!(event.message, "h");

        let mut short = LogEvent::info("ok");
        short.truncate_message(10);
        assert_eq!(short.message, "ok");
    }
}
