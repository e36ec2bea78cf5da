use std::fmt::Display;

use tokio::sync::{mpsc::UnboundedSender, oneshot};

use crate::ArcPath;

mod core;
mod data;
mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use self::core::LogCore;
pub use data::{LogLevel, LogMessage};
use message::Message;

/// The logging actor.
///
/// Records are tagged with a scope naming the component that produced them
/// (`"sync.scheduler"`, `"net"`, ...). Sending never blocks the caller, so the
/// logger can be used from inside other actors' message loops.
///
/// # Examples
/// ```ignore
/// let log = Log::spawn(LogLevel::Warning, 7, log_dir).await?;
/// log.info("app", "Dashboard started");
/// log.flush().await;
/// ```
#[derive(Debug, Clone)]
pub enum Log {
    /// A real logging actor that writes to files and stderr
    Actual(UnboundedSender<Message>),
    /// An in-memory logger for tests
    Mock(mock::Mock),
}

impl Log {
    /// Builds the log files under `log_dir` and spawns the actor.
    pub async fn spawn(level: LogLevel, max_age: usize, log_dir: ArcPath) -> anyhow::Result<Self> {
        let (log, _) = LogCore::build(level, max_age, log_dir).await?.spawn();
        Ok(log)
    }

    pub fn mock() -> Self {
        Self::Mock(mock::Mock::new())
    }

    fn log(&self, scope: &'static str, message: String, level: LogLevel) {
        match self {
            Log::Actual(sender) => {
                // a closed channel means the logger was flushed during shutdown
                let _ = sender.send(Message::Log(LogMessage::new(level, scope, message)));
            }
            Log::Mock(mock) => mock.log(scope, message, level),
        }
    }

    /// Log a message with the `INFO` level
    pub fn info<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Info);
    }

    /// Log a message with the `WARNING` level
    pub fn warn<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Warning);
    }

    /// Log a message with the `ERROR` level
    pub fn error<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Error);
    }

    /// Log a warning if the result is an error and return the result as is
    pub fn warn_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        if let Err(err) = &result {
            self.log(scope, err.to_string(), LogLevel::Warning);
        }
        result
    }

    /// Log an error if the result is an error and return the result as is
    pub fn error_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        if let Err(err) = &result {
            self.log(scope, err.to_string(), LogLevel::Error);
        }
        result
    }

    /// Prints buffered records to stderr and stops the actor. Records sent
    /// afterwards are silently dropped.
    pub async fn flush(self) {
        let Self::Actual(sender) = self else {
            return;
        };
        let (tx, rx) = oneshot::channel();
        if sender.send(Message::Flush { tx }).is_ok() {
            let _ = rx.await;
        }
    }

    /// Deletes log files older than the configured maximum age.
    pub async fn collect_garbage(&self) {
        let Self::Actual(sender) = self else {
            return;
        };
        let (tx, rx) = oneshot::channel();
        if sender.send(Message::CollectGarbage { tx }).is_ok() {
            let _ = rx.await;
        }
    }

    /// Records captured by a mock logger, `None` for the real one.
    pub fn messages(&self) -> Option<Vec<LogMessage>> {
        match self {
            Log::Actual(_) => None,
            Log::Mock(mock) => Some(mock.messages()),
        }
    }
}
