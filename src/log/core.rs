use anyhow::Context;
use tokio::{fs::File, io::AsyncWriteExt, sync::mpsc, task::JoinHandle};

use super::data::{LogLevel, LogMessage};
use super::message::Message;
use crate::ArcPath;

/// Prefix shared by every timestamped log file, used by garbage collection to
/// recognise files it owns.
pub const LOG_FILE_PREFIX: &str = "logidash_";

/// The core of the logging actor.
///
/// Every record is appended to a timestamped log file and to `latest.log`.
/// Records at or above `print_level` are also buffered and written to stderr
/// on flush, after the terminal has been released.
#[derive(Debug)]
pub struct LogCore {
    /// Directory where log files are stored
    log_dir: ArcPath,
    /// Path to the current timestamped log file
    log_path: ArcPath,
    log_file: File,
    latest_log_file: File,
    /// Records waiting to be printed to stderr
    logs_to_print: Vec<LogMessage>,
    print_level: LogLevel,
    /// Maximum age of log files in days, 0 keeps everything
    max_age: usize,
}

impl LogCore {
    /// Creates the log directory and opens both log files.
    pub async fn build(level: LogLevel, max_age: usize, log_dir: ArcPath) -> anyhow::Result<Self> {
        let log_path = ArcPath::from(&log_dir.join(format!(
            "{}{}.log",
            LOG_FILE_PREFIX,
            chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S")
        )));
        let latest_log_path = log_dir.join("latest.log");

        tokio::fs::create_dir_all(&log_dir)
            .await
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let log_file = File::create(&log_path)
            .await
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
        let latest_log_file = File::create(&latest_log_path).await.with_context(|| {
            format!(
                "Failed to create latest log file: {}",
                latest_log_path.display()
            )
        })?;

        Ok(Self {
            log_dir,
            log_path,
            log_file,
            latest_log_file,
            logs_to_print: Vec::new(),
            print_level: level,
            max_age,
        })
    }

    /// Transforms the core into an actor and returns its handle.
    pub fn spawn(mut self) -> (super::Log, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Message::Log(msg) => {
                        self.log(msg).await;
                    }
                    Message::Flush { tx } => {
                        // drain what was queued before the flush request
                        while let Ok(Message::Log(msg)) = rx.try_recv() {
                            self.log(msg).await;
                        }
                        rx.close();
                        self.flush();
                        let _ = tx.send(());
                        break;
                    }
                    Message::CollectGarbage { tx } => {
                        self.collect_garbage().await;
                        let _ = tx.send(());
                    }
                }
            }
        });
        (super::Log::Actual(tx), handle)
    }

    async fn log(&mut self, message: LogMessage) {
        let line = format!("{}\n", &message);
        let written = async {
            self.log_file.write_all(line.as_bytes()).await?;
            self.log_file.flush().await?;
            self.latest_log_file.write_all(line.as_bytes()).await?;
            self.latest_log_file.flush().await
        }
        .await;

        if let Err(e) = written {
            self.logs_to_print.push(LogMessage::new(
                LogLevel::Error,
                "log",
                format!("Failed to write to {}: {}", self.log_path.display(), e),
            ));
        }

        if message.level >= self.print_level {
            self.logs_to_print.push(message);
        }
    }

    fn flush(self) {
        for message in &self.logs_to_print {
            eprintln!("{}", message);
        }
        if !self.logs_to_print.is_empty() {
            eprintln!("Check the full log file: {}", self.log_path.display());
        }
    }

    async fn collect_garbage(&mut self) {
        if self.max_age == 0 {
            return;
        }
        let now = std::time::SystemTime::now();

        let Ok(mut entries) = tokio::fs::read_dir(&self.log_dir).await else {
            self.log(LogMessage::new(
                LogLevel::Error,
                "log",
                "Failed to read the logs directory during garbage collection",
            ))
            .await;
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let filename = entry.file_name();
            let filename = filename.to_string_lossy();
            if !filename.starts_with(LOG_FILE_PREFIX) || !filename.ends_with(".log") {
                continue;
            }
            let Ok(Ok(modified)) = entry.metadata().await.map(|meta| meta.modified()) else {
                continue;
            };
            let Ok(age) = now.duration_since(modified) else {
                continue;
            };
            let age_days = age.as_secs() / 60 / 60 / 24;

            if age_days as usize > self.max_age
                && tokio::fs::remove_file(entry.path()).await.is_err()
            {
                self.log(LogMessage::new(
                    LogLevel::Warning,
                    "log",
                    format!("Failed to remove the log file: {}", entry.path().display()),
                ))
                .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = ArcPath::from(&dir.path().join("logs"));
        let core = LogCore::build(LogLevel::Info, 0, log_dir.clone())
            .await
            .unwrap();
        assert!(core.log_path.exists());
        assert!(log_dir.join("latest.log").exists());
    }

    #[tokio::test]
    async fn test_log_level_filtering() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = ArcPath::from(dir.path());
        let mut core = LogCore::build(LogLevel::Warning, 0, log_dir).await.unwrap();

        core.log(LogMessage::new(LogLevel::Info, "test", "info")).await;
        assert!(core.logs_to_print.is_empty());

        core.log(LogMessage::new(LogLevel::Warning, "test", "warn")).await;
        assert_eq!(core.logs_to_print.len(), 1);

        let written = tokio::fs::read_to_string(&core.log_path).await.unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_collect_garbage_keeps_fresh_files() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = ArcPath::from(dir.path());
        let mut core = LogCore::build(LogLevel::Info, 1, log_dir).await.unwrap();
        core.collect_garbage().await;
        assert!(core.log_path.exists());
    }
}
