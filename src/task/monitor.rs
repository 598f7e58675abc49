//! Progress and narrative log of a running task.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{LogLevel, LogMessage};

#[derive(Debug, Default)]
struct MonitorState {
    max_progress: usize,
    progress: usize,
    messages: Vec<LogMessage>,
}

/// Progress counter plus the ordered messages a task produced.
///
/// Messages added through [`TaskMonitor::info`] and friends are attributed
/// to the monitor's source.
#[derive(Debug)]
pub struct TaskMonitor {
    source: String,
    state: Mutex<MonitorState>,
}

impl TaskMonitor {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            state: Mutex::new(MonitorState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_max_progress(&self, max: usize) {
        self.state().max_progress = max;
    }

    pub fn increment_progress(&self) {
        let mut state = self.state();
        state.progress = state.progress.saturating_add(1);
    }

    /// Current and maximum progress
    pub fn progress(&self) -> (usize, usize) {
        let state = self.state();
        (state.progress, state.max_progress)
    }

    pub fn add_message(&self, message: LogMessage) {
        self.state().messages.push(message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.add_message(LogMessage::new(LogLevel::Info, self.source.as_str(), message));
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.add_message(LogMessage::new(LogLevel::Warn, self.source.as_str(), message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.add_message(LogMessage::new(LogLevel::Error, self.source.as_str(), message));
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.state().messages.clone()
    }

    /// Put a predecessor's messages ahead of this monitor's own.
    pub fn inherit(&self, messages: Vec<LogMessage>) {
        let mut state = self.state();
        let own = std::mem::replace(&mut state.messages, messages);
        state.messages.extend(own);
    }
}
