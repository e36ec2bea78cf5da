use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use super::{Dedup, Payload, ResourceKey, SharedFetcher, Store};
use crate::log::Log;

mod core;
mod data;
mod message;
#[cfg(test)]
mod tests;

pub use data::{Revalidation, Subscription, SubscriptionId, SubscriptionOptions};
use message::Message;

/// The revalidation scheduler.
///
/// Keeps every subscribed key on a timer and revalidates it on each tick,
/// on [`Scheduler::focus`] and on demand. A revalidation marks the entry as
/// validating, fetches through the [`Dedup`] and commits the outcome to the
/// [`Store`]. A tick that arrives while the key is still fetching is dropped.
///
/// # Examples
/// ```ignore
/// let scheduler = Scheduler::spawn(log, store.clone(), Dedup::spawn(log.clone()));
/// let subscription = scheduler
///     .register(resource_key!("overview"), SubscriptionOptions::every(interval), fetcher)
///     .await;
/// ```
pub struct Scheduler<T> {
    tx: Sender<Message<T>>,
}

impl<T> Clone for Scheduler<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}

impl<T: Payload> Scheduler<T> {
    pub fn spawn(log: Log, store: Store<T>, dedup: Dedup<T>) -> Self {
        let (scheduler, _) = self::core::Core::new(log, store, dedup).spawn();
        scheduler
    }

    async fn request<R>(&self, message: impl FnOnce(oneshot::Sender<R>) -> Message<T>) -> R {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(message(tx))
            .await
            .context("Sending message to Scheduler actor")
            .expect("Scheduler actor died");
        rx.await
            .context("Awaiting response from Scheduler actor")
            .expect("Scheduler actor died")
    }

    /// Subscribes to `key`. The first subscription of a key starts its timer
    /// and fixes its fetcher; later ones only add interest.
    pub async fn register(
        &self,
        key: ResourceKey,
        options: SubscriptionOptions,
        fetcher: SharedFetcher<T>,
    ) -> Subscription {
        self.request(|tx| Message::Register {
            key,
            options,
            fetcher,
            tx,
        })
        .await
    }

    /// Revalidates `key` now, ignoring its interval. Resolves when the fetch
    /// settles, joining one already in flight.
    pub async fn revalidate(&self, key: &ResourceKey) -> Revalidation {
        let key = key.clone();
        self.request(|tx| Message::Revalidate { key, tx }).await
    }

    /// Revalidates every key with a focus-enabled subscription. Does not
    /// wait for the fetches.
    pub async fn focus(&self) {
        self.tx
            .send(Message::Focus)
            .await
            .context("Sending message to Scheduler actor")
            .expect("Scheduler actor died");
    }

    /// Keys with at least one live subscription, sorted.
    pub async fn keys(&self) -> Vec<ResourceKey> {
        self.request(|tx| Message::Keys { tx }).await
    }

    pub async fn is_fetching(&self, key: &ResourceKey) -> bool {
        let key = key.clone();
        self.request(|tx| Message::IsFetching { key, tx }).await
    }
}
