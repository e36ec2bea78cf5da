use tokio::sync::oneshot::Sender;

use crate::sync::{FetchError, ResourceKey, SharedFetcher};

/// Requests understood by the deduplicator.
pub enum Message<T> {
    Run {
        key: ResourceKey,
        fetcher: SharedFetcher<T>,
        tx: Sender<Result<T, FetchError>>,
    },
    InFlight {
        key: ResourceKey,
        tx: Sender<bool>,
    },
}

/// A request finished; sent by the task driving it.
#[derive(Debug)]
pub struct Settled<T> {
    pub key: ResourceKey,
    pub result: Result<T, FetchError>,
}
