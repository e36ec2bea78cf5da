use std::io::ErrorKind;

use anyhow::Context;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{ArcPath, BUFFER_SIZE};

use super::{data::Data, message::Message};

/// The core of the configuration actor.
///
/// Owns the in-memory [`Data`] and the path of the TOML file it mirrors.
pub struct Core {
    path: ArcPath,
    data: Data,
}

impl Core {
    pub fn new(path: ArcPath) -> Self {
        Self {
            path,
            data: Data::default(),
        }
    }

    /// Transforms the core into an actor and returns its handle.
    pub fn spawn(mut self) -> (super::Config, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Load { tx } => {
                        let _ = tx.send(self.load().await);
                    }
                    Message::Save { tx } => {
                        let _ = tx.send(self.save().await);
                    }
                    Message::Snapshot { tx } => {
                        let _ = tx.send(self.data.clone());
                    }
                    Message::GetPath { opt, tx } => {
                        let _ = tx.send(self.data.path(opt));
                    }
                    Message::SetPath { opt, path } => self.data.set_path(opt, path),
                    Message::GetLogLevel { tx } => {
                        let _ = tx.send(self.data.log_level());
                    }
                    Message::SetLogLevel { level } => self.data.set_log_level(level),
                    Message::GetUSize { opt, tx } => {
                        let _ = tx.send(self.data.usize(opt));
                    }
                    Message::SetUSize { opt, size } => self.data.set_usize(opt, size),
                    Message::GetDuration { opt, tx } => {
                        let _ = tx.send(self.data.duration(opt));
                    }
                    Message::SetDuration { opt, duration } => {
                        self.data.set_duration(opt, duration)
                    }
                    Message::GetStr { opt, tx } => {
                        let _ = tx.send(self.data.str(opt));
                    }
                    Message::SetStr { opt, value } => self.data.set_str(opt, value),
                    Message::GetBool { opt, tx } => {
                        let _ = tx.send(self.data.bool(opt));
                    }
                    Message::SetBool { opt, value } => self.data.set_bool(opt, value),
                }
            }
        });
        (super::Config::Actual(tx), handle)
    }

    /// Reads the file into memory. A missing file is created with the
    /// defaults; a file that parses but fails validation is rejected and the
    /// previous values are kept.
    async fn load(&mut self) -> anyhow::Result<()> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.data = Data::default();
                return self.save().await;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read config file: {}", self.path.display())
                });
            }
        };
        let data: Data = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", self.path.display()))?;
        data.validate()
            .with_context(|| format!("Invalid config file: {}", self.path.display()))?;
        self.data = data;
        Ok(())
    }

    async fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = toml::to_string_pretty(&self.data).context("Serializing config")?;
        tokio::fs::write(&self.path, contents)
            .await
            .with_context(|| format!("Failed to write config file: {}", self.path.display()))
    }
}
