use std::collections::HashMap;

use tokio::sync::{mpsc::UnboundedSender, oneshot::Sender};

use super::data::{CacheEntry, EntryPatch, ListenerId, Update};
use crate::sync::ResourceKey;

/// Messages understood by the store actor.
#[derive(Debug)]
pub enum Message<T> {
    Get {
        key: ResourceKey,
        tx: Sender<Option<CacheEntry<T>>>,
    },
    /// Applies a patch and replies with the resulting entry once every
    /// listener has been notified
    Set {
        key: ResourceKey,
        patch: EntryPatch<T>,
        tx: Sender<CacheEntry<T>>,
    },
    Subscribe {
        key: ResourceKey,
        listener: UnboundedSender<Update<T>>,
        tx: Sender<ListenerId>,
    },
    Unsubscribe {
        id: ListenerId,
    },
    Keys {
        tx: Sender<Vec<ResourceKey>>,
    },
    Snapshot {
        tx: Sender<HashMap<ResourceKey, CacheEntry<T>>>,
    },
}
