use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use crate::{ArcPath, ArcStr, log::LogLevel};

mod core;
mod data;
mod message;
mod mock;

pub use data::{
    BoolOpt, ConfigError, Data, DurationOpt, Intervals, MAX_ACTIVITIES_LIMIT, PathOpt, StrOpt,
    USizeOpt,
};
use message::Message;

/// The configuration actor.
///
/// Wraps `config.toml`: values are read once with [`Config::load`] and then
/// queried per option. Command-line overrides are applied with the setters and
/// never written back unless [`Config::save`] is called.
///
/// # Examples
/// ```ignore
/// let config = Config::spawn(config_path);
/// config.load().await?;
/// let timeout = config.duration(DurationOpt::Timeout).await;
/// ```
#[derive(Debug, Clone)]
pub enum Config {
    /// A real configuration actor backed by a TOML file
    Actual(Sender<Message>),
    /// An in-memory configuration for tests
    Mock(mock::Mock),
}

impl Config {
    pub fn spawn(path: ArcPath) -> Self {
        let (config, _) = self::core::Core::new(path).spawn();
        config
    }

    pub fn mock(data: Data) -> Self {
        Self::Mock(mock::Mock::new(data))
    }

    async fn request<R>(
        sender: &Sender<Message>,
        what: &'static str,
        message: impl FnOnce(oneshot::Sender<R>) -> Message,
    ) -> R {
        let (tx, rx) = oneshot::channel();
        sender
            .send(message(tx))
            .await
            .with_context(|| format!("{what} with Config actor"))
            .expect("Config actor died");
        rx.await
            .with_context(|| format!("Awaiting response for {what} with Config actor"))
            .expect("Config actor died")
    }

    async fn notify(sender: &Sender<Message>, what: &'static str, message: Message) {
        sender
            .send(message)
            .await
            .with_context(|| format!("{what} with Config actor"))
            .expect("Config actor died");
    }

    /// Loads and validates the file. A missing file is created with defaults.
    pub async fn load(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Loading config", |tx| Message::Load { tx }).await
            }
            Self::Mock(mock) => mock.load().await,
        }
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Saving config", |tx| Message::Save { tx }).await
            }
            Self::Mock(mock) => mock.save().await,
        }
    }

    /// Every option at once, for code that needs several values together.
    pub async fn snapshot(&self) -> Data {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Taking snapshot", |tx| Message::Snapshot { tx }).await
            }
            Self::Mock(mock) => mock.snapshot().await,
        }
    }

    pub async fn path(&self, opt: PathOpt) -> ArcPath {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting path", |tx| Message::GetPath { opt, tx }).await
            }
            Self::Mock(mock) => mock.path(opt).await,
        }
    }

    pub async fn set_path(&self, opt: PathOpt, path: ArcPath) {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting path", Message::SetPath { opt, path }).await
            }
            Self::Mock(mock) => mock.set_path(opt, path).await,
        }
    }

    pub async fn log_level(&self) -> LogLevel {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting log level", |tx| Message::GetLogLevel { tx }).await
            }
            Self::Mock(mock) => mock.log_level().await,
        }
    }

    pub async fn set_log_level(&self, level: LogLevel) {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting log level", Message::SetLogLevel { level }).await
            }
            Self::Mock(mock) => mock.set_log_level(level).await,
        }
    }

    pub async fn usize(&self, opt: USizeOpt) -> usize {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting numeric value", |tx| Message::GetUSize {
                    opt,
                    tx,
                })
                .await
            }
            Self::Mock(mock) => mock.usize(opt).await,
        }
    }

    pub async fn set_usize(&self, opt: USizeOpt, size: usize) {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting numeric value", Message::SetUSize { opt, size })
                    .await
            }
            Self::Mock(mock) => mock.set_usize(opt, size).await,
        }
    }

    pub async fn duration(&self, opt: DurationOpt) -> Duration {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting duration", |tx| Message::GetDuration {
                    opt,
                    tx,
                })
                .await
            }
            Self::Mock(mock) => mock.duration(opt).await,
        }
    }

    pub async fn set_duration(&self, opt: DurationOpt, duration: Duration) {
        match self {
            Self::Actual(sender) => {
                Self::notify(
                    sender,
                    "Setting duration",
                    Message::SetDuration { opt, duration },
                )
                .await
            }
            Self::Mock(mock) => mock.set_duration(opt, duration).await,
        }
    }

    pub async fn str(&self, opt: StrOpt) -> ArcStr {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting string", |tx| Message::GetStr { opt, tx }).await
            }
            Self::Mock(mock) => mock.str(opt).await,
        }
    }

    pub async fn set_str(&self, opt: StrOpt, value: ArcStr) {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting string", Message::SetStr { opt, value }).await
            }
            Self::Mock(mock) => mock.set_str(opt, value).await,
        }
    }

    pub async fn bool(&self, opt: BoolOpt) -> bool {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting flag", |tx| Message::GetBool { opt, tx }).await
            }
            Self::Mock(mock) => mock.bool(opt).await,
        }
    }

    pub async fn set_bool(&self, opt: BoolOpt, value: bool) {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting flag", Message::SetBool { opt, value }).await
            }
            Self::Mock(mock) => mock.set_bool(opt, value).await,
        }
    }
}
