use std::time::Duration;

use tokio::sync::{mpsc::UnboundedSender, oneshot};

use crate::sync::{FetchError, ResourceKey};

/// How a consumer wants its resource kept fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionOptions {
    /// Background revalidation period. Only the first subscription of a key
    /// decides it.
    pub interval: Duration,
    pub revalidate_on_focus: bool,
    /// Fetch right away when the cache has no data for the key
    pub revalidate_if_empty: bool,
}

impl SubscriptionOptions {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            revalidate_on_focus: true,
            revalidate_if_empty: true,
        }
    }

    pub fn on_focus(mut self, enabled: bool) -> Self {
        self.revalidate_on_focus = enabled;
        self
    }

    pub fn if_empty(mut self, enabled: bool) -> Self {
        self.revalidate_if_empty = enabled;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(super) u64);

/// How an explicit revalidation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revalidation {
    /// The fetch succeeded and the cache holds the new data
    Updated,
    /// The fetch failed; any older data is still cached
    Failed(FetchError),
    /// Nothing is subscribed to the key
    NotRegistered,
}

impl Revalidation {
    pub fn is_updated(&self) -> bool {
        matches!(self, Revalidation::Updated)
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Revalidation::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Internal events: timer ticks, fetch settlements, dropped subscriptions.
#[derive(Debug)]
pub enum Event {
    Tick(ResourceKey),
    Settled {
        key: ResourceKey,
        outcome: Revalidation,
    },
    Unregister {
        id: SubscriptionId,
        ack: Option<oneshot::Sender<()>>,
    },
}

/// Binds one consumer to a key.
///
/// The key stays scheduled while at least one subscription is alive.
/// Dropping the value unsubscribes too, without waiting.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    key: ResourceKey,
    events: UnboundedSender<Event>,
    active: bool,
}

impl Subscription {
    pub(super) fn new(id: SubscriptionId, key: ResourceKey, events: UnboundedSender<Event>) -> Self {
        Self {
            id,
            key,
            events,
            active: true,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Unsubscribes and waits until the scheduler has processed it.
    pub async fn unsubscribe(mut self) {
        self.active = false;
        let (tx, rx) = oneshot::channel();
        let sent = self.events.send(Event::Unregister {
            id: self.id,
            ack: Some(tx),
        });
        if sent.is_ok() {
            let _ = rx.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.active {
            let _ = self.events.send(Event::Unregister {
                id: self.id,
                ack: None,
            });
        }
    }
}
