use std::collections::HashMap;

use tokio::{
    sync::mpsc::{self, UnboundedSender},
    task::JoinHandle,
};

use super::{
    Store,
    data::{CacheEntry, EntryPatch, ListenerId, Update},
    message::Message,
};
use crate::{
    BUFFER_SIZE,
    log::Log,
    sync::{Payload, ResourceKey},
};

const SCOPE: &str = "sync.store";

/// The core of the store actor: the only owner of cache entries.
#[derive(Debug)]
pub struct Core<T> {
    log: Log,
    entries: HashMap<ResourceKey, CacheEntry<T>>,
    /// Listeners per key, in registration order
    listeners: HashMap<ResourceKey, Vec<(ListenerId, UnboundedSender<Update<T>>)>>,
    next_listener: u64,
}

impl<T: Payload> Core<T> {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            entries: HashMap::new(),
            listeners: HashMap::new(),
            next_listener: 0,
        }
    }

    /// Transforms the core into an actor and returns its handle.
    pub fn spawn(mut self) -> (Store<T>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Get { key, tx } => {
                        let _ = tx.send(self.entries.get(&key).cloned());
                    }
                    Message::Set { key, patch, tx } => {
                        let entry = self.set(key, patch);
                        let _ = tx.send(entry);
                    }
                    Message::Subscribe { key, listener, tx } => {
                        let _ = tx.send(self.subscribe(key, listener));
                    }
                    Message::Unsubscribe { id } => self.unsubscribe(id),
                    Message::Keys { tx } => {
                        let mut keys: Vec<_> = self.entries.keys().cloned().collect();
                        keys.sort();
                        let _ = tx.send(keys);
                    }
                    Message::Snapshot { tx } => {
                        let _ = tx.send(self.entries.clone());
                    }
                }
            }
        });
        (Store { tx }, handle)
    }

    fn set(&mut self, key: ResourceKey, patch: EntryPatch<T>) -> CacheEntry<T> {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.apply(patch);
        let entry = entry.clone();

        if let Some(listeners) = self.listeners.get_mut(&key) {
            listeners.retain(|(_, listener)| {
                listener
                    .send(Update {
                        key: key.clone(),
                        entry: entry.clone(),
                    })
                    .is_ok()
            });
            if listeners.is_empty() {
                self.listeners.remove(&key);
            }
        }
        entry
    }

    fn subscribe(&mut self, key: ResourceKey, listener: UnboundedSender<Update<T>>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.log.info(SCOPE, format!("Listener {} attached to {key}", id.0));
        self.listeners.entry(key).or_default().push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|_, listeners| {
            listeners.retain(|(listener_id, _)| *listener_id != id);
            !listeners.is_empty()
        });
    }
}
