//! Keeps remote resources fresh in a local cache.
//!
//! The pieces are independent actors wired together by the caller:
//! [`Store`] owns every [`CacheEntry`], [`Dedup`] collapses concurrent
//! requests for one key, [`Scheduler`] decides when a key is revalidated and
//! [`RefreshCoordinator`] fans a manual refresh out over every registered key.

use std::{fmt::Display, future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::ArcStr;

mod coordinator;
mod dedup;
mod scheduler;
mod store;
mod timer;

pub use crate::net::FetchError;
pub use coordinator::{RefreshCoordinator, RefreshReport};
pub use dedup::Dedup;
pub use scheduler::{Revalidation, Scheduler, Subscription, SubscriptionId, SubscriptionOptions};
pub use store::{CacheEntry, EntryPatch, EntryStatus, ListenerId, Store, Update};
pub use timer::ScheduledTask;

/// Names one logical remote source. Query parameters are part of the key, so
/// `activities?limit=20` and `activities?limit=50` are cached separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey(ArcStr);

impl ResourceKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ResourceKey {
    fn from(value: &str) -> Self {
        Self(ArcStr::from(value))
    }
}

impl From<String> for ResourceKey {
    fn from(value: String) -> Self {
        Self(ArcStr::from(value))
    }
}

impl From<ArcStr> for ResourceKey {
    fn from(value: ArcStr) -> Self {
        Self(value)
    }
}

/// Values that can be cached and shared between actors.
pub trait Payload: Clone + std::fmt::Debug + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + std::fmt::Debug + Send + Sync + 'static {}

pub type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send>>;

/// Produces a fresh request for one resource each time it is called.
pub trait Fetcher<T>: Send + Sync {
    fn fetch(&self) -> FetchFuture<T>;
}

impl<T, F, Fut> Fetcher<T> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    fn fetch(&self) -> FetchFuture<T> {
        Box::pin(self())
    }
}

pub type SharedFetcher<T> = Arc<dyn Fetcher<T>>;

/// Wraps an async closure into a [`SharedFetcher`].
pub fn fetcher<T, F, Fut>(f: F) -> SharedFetcher<T>
where
    T: Payload,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    Arc::new(f)
}
