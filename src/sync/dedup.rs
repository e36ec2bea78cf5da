use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use super::{FetchError, Payload, ResourceKey, SharedFetcher};
use crate::log::Log;

mod core;
mod message;

use message::Message;

/// The request deduplicator.
///
/// While a request for a key is in flight, further [`Dedup::run`] calls for
/// that key join it instead of starting another; every caller receives the
/// same value or error. Nothing is cached once the request settles.
pub struct Dedup<T> {
    tx: Sender<Message<T>>,
}

impl<T> Clone for Dedup<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Dedup<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dedup").finish_non_exhaustive()
    }
}

impl<T: Payload> Dedup<T> {
    pub fn spawn(log: Log) -> Self {
        let (dedup, _) = self::core::Core::new(log).spawn();
        dedup
    }

    /// Runs `fetcher` for `key` unless a request for `key` is already in
    /// flight, in which case `fetcher` is not called and the caller waits
    /// for the pending result.
    pub async fn run(&self, key: &ResourceKey, fetcher: SharedFetcher<T>) -> Result<T, FetchError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Message::Run {
                key: key.clone(),
                fetcher,
                tx,
            })
            .await
            .context("Sending message to Dedup actor")
            .expect("Dedup actor died");
        rx.await
            .context("Awaiting response from Dedup actor")
            .expect("Dedup actor died")
    }

    pub async fn in_flight(&self, key: &ResourceKey) -> bool {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Message::InFlight {
                key: key.clone(),
                tx,
            })
            .await
            .context("Sending message to Dedup actor")
            .expect("Dedup actor died");
        rx.await
            .context("Awaiting response from Dedup actor")
            .expect("Dedup actor died")
    }
}
