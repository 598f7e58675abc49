//! User-facing log messages attached to tasks and prediction stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// One entry of a task's chronological narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub level: LogLevel,
    /// Component that produced the message
    pub source: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogMessage {
    pub fn new(level: LogLevel, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            source: source.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn info(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, source, message)
    }

    pub fn warn(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, source, message)
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, source, message)
    }
}

impl std::fmt::Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_level() {
        assert_eq!(LogMessage::info("t", "m").level, LogLevel::Info);
        assert_eq!(LogMessage::warn("t", "m").level, LogLevel::Warn);
        assert_eq!(LogMessage::error("t", "m").level, LogLevel::Error);
    }

    #[test]
    fn test_display() {
        let msg = LogMessage::warn("SelectionTask", "Evaluation could not be performed");
        assert_eq!(msg.to_string(), "[warn] Evaluation could not be performed");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Info);
    }
}
