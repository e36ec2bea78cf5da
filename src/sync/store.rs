use std::collections::HashMap;

use anyhow::Context;
use tokio::sync::{
    mpsc::{self, Sender, UnboundedReceiver},
    oneshot,
};

use super::{Payload, ResourceKey};
use crate::log::Log;

mod core;
mod data;
mod message;
#[cfg(test)]
mod tests;

pub use data::{CacheEntry, EntryPatch, EntryStatus, ListenerId, Update};
use message::Message;

/// The resource cache actor.
///
/// Maps each [`ResourceKey`] to a [`CacheEntry`]. Reads return snapshots and
/// never wait on network work. Every patch is broadcast to the key's
/// listeners, in registration order, before the next message is handled.
/// Entries are never evicted.
#[derive(Debug)]
pub struct Store<T> {
    tx: Sender<Message<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Payload> Store<T> {
    pub fn spawn(log: Log) -> Self {
        let (store, _) = self::core::Core::new(log).spawn();
        store
    }

    async fn request<R>(&self, message: impl FnOnce(oneshot::Sender<R>) -> Message<T>) -> R {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(message(tx))
            .await
            .context("Sending message to Store actor")
            .expect("Store actor died");
        rx.await
            .context("Awaiting response from Store actor")
            .expect("Store actor died")
    }

    pub async fn get(&self, key: &ResourceKey) -> Option<CacheEntry<T>> {
        let key = key.clone();
        self.request(|tx| Message::Get { key, tx }).await
    }

    /// Applies `patch` and returns the entry as listeners saw it.
    pub async fn set(&self, key: &ResourceKey, patch: EntryPatch<T>) -> CacheEntry<T> {
        let key = key.clone();
        self.request(|tx| Message::Set { key, patch, tx }).await
    }

    /// Registers `listener` for changes to `key`. A listener whose receiver
    /// is dropped is removed on the next change.
    pub async fn subscribe(
        &self,
        key: &ResourceKey,
        listener: mpsc::UnboundedSender<Update<T>>,
    ) -> ListenerId {
        let key = key.clone();
        self.request(|tx| Message::Subscribe { key, listener, tx })
            .await
    }

    /// Convenience over [`Store::subscribe`] that creates the channel.
    pub async fn listen(&self, key: &ResourceKey) -> (ListenerId, UnboundedReceiver<Update<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.subscribe(key, tx).await, rx)
    }

    pub async fn unsubscribe(&self, id: ListenerId) {
        self.tx
            .send(Message::Unsubscribe { id })
            .await
            .context("Sending message to Store actor")
            .expect("Store actor died");
    }

    /// Keys with a resident entry, sorted.
    pub async fn keys(&self) -> Vec<ResourceKey> {
        self.request(|tx| Message::Keys { tx }).await
    }

    pub async fn snapshot(&self) -> HashMap<ResourceKey, CacheEntry<T>> {
        self.request(|tx| Message::Snapshot { tx }).await
    }
}
