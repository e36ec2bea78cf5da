use std::time::Duration;

use tokio::sync::oneshot;

use crate::{ArcPath, ArcStr, log::LogLevel};

use super::data::{BoolOpt, Data, DurationOpt, PathOpt, StrOpt, USizeOpt};

/// Requests understood by the configuration actor.
#[derive(Debug)]
pub enum Message {
    /// Read and validate the file, creating it with defaults when missing
    Load {
        tx: oneshot::Sender<anyhow::Result<()>>,
    },
    /// Write the in-memory configuration back to the file
    Save {
        tx: oneshot::Sender<anyhow::Result<()>>,
    },
    /// A snapshot of every option at once
    Snapshot {
        tx: oneshot::Sender<Data>,
    },
    GetPath {
        opt: PathOpt,
        tx: oneshot::Sender<ArcPath>,
    },
    SetPath {
        opt: PathOpt,
        path: ArcPath,
    },
    GetLogLevel {
        tx: oneshot::Sender<LogLevel>,
    },
    SetLogLevel {
        level: LogLevel,
    },
    GetUSize {
        opt: USizeOpt,
        tx: oneshot::Sender<usize>,
    },
    SetUSize {
        opt: USizeOpt,
        size: usize,
    },
    GetDuration {
        opt: DurationOpt,
        tx: oneshot::Sender<Duration>,
    },
    SetDuration {
        opt: DurationOpt,
        duration: Duration,
    },
    GetStr {
        opt: StrOpt,
        tx: oneshot::Sender<ArcStr>,
    },
    SetStr {
        opt: StrOpt,
        value: ArcStr,
    },
    GetBool {
        opt: BoolOpt,
        tx: oneshot::Sender<bool>,
    },
    SetBool {
        opt: BoolOpt,
        value: bool,
    },
}
