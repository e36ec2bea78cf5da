use std::sync::{Arc, Mutex};

use crate::log::{LogLevel, LogMessage};

/// In-memory logger used by tests.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    messages: Arc<Mutex<Vec<LogMessage>>>,
}

impl Mock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self, scope: &'static str, message: String, level: LogLevel) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(LogMessage::new(level, scope, message));
        }
    }

    /// Returns every record logged so far, oldest first.
    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}
