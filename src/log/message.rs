use tokio::sync::oneshot;

use super::data::LogMessage;

/// Messages that can be sent to a [`LogCore`](super::core::LogCore) actor.
#[derive(Debug)]
pub enum Message {
    /// Appends a record to the log files
    Log(LogMessage),
    /// Prints the buffered records to stderr and stops the actor
    Flush { tx: oneshot::Sender<()> },
    /// Deletes log files older than the configured maximum age
    CollectGarbage { tx: oneshot::Sender<()> },
}
