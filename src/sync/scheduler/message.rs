use tokio::sync::oneshot::Sender;

use super::data::{Revalidation, Subscription, SubscriptionOptions};
use crate::sync::{ResourceKey, SharedFetcher};

/// Requests understood by the scheduler.
pub enum Message<T> {
    Register {
        key: ResourceKey,
        options: SubscriptionOptions,
        fetcher: SharedFetcher<T>,
        tx: Sender<Subscription>,
    },
    Revalidate {
        key: ResourceKey,
        tx: Sender<Revalidation>,
    },
    /// The user came back to the dashboard
    Focus,
    Keys {
        tx: Sender<Vec<ResourceKey>>,
    },
    IsFetching {
        key: ResourceKey,
        tx: Sender<bool>,
    },
}
