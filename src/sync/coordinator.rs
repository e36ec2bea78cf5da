use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinSet,
    time::{Instant, sleep_until},
};

use super::{Payload, ResourceKey, Revalidation, Scheduler};
use crate::log::Log;

const SCOPE: &str = "sync.coordinator";

/// Outcome of one [`RefreshCoordinator::refresh_all`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    /// Per key, in key order
    pub outcomes: Vec<(ResourceKey, Revalidation)>,
    pub started: Instant,
    pub settled: Instant,
}

impl RefreshReport {
    pub fn failed(&self) -> impl Iterator<Item = &ResourceKey> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_updated())
            .map(|(key, _)| key)
    }

    pub fn all_updated(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_updated())
    }
}

/// One manual refresh in progress. Holds the busy flag raised until it is
/// dropped and the minimum visible duration has passed.
struct RefreshBatch {
    keys: Vec<ResourceKey>,
    started: Instant,
    release_at: Instant,
    busy: Arc<watch::Sender<usize>>,
}

impl RefreshBatch {
    fn begin(keys: Vec<ResourceKey>, minimum_visible: Duration, busy: Arc<watch::Sender<usize>>) -> Self {
        let started = Instant::now();
        busy.send_modify(|count| *count += 1);
        Self {
            keys,
            started,
            release_at: started + minimum_visible,
            busy,
        }
    }
}

impl Drop for RefreshBatch {
    fn drop(&mut self) {
        let busy = self.busy.clone();
        let release = move || busy.send_modify(|count| *count = count.saturating_sub(1));
        if Instant::now() >= self.release_at {
            release();
            return;
        }
        let release_at = self.release_at;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    sleep_until(release_at).await;
                    release();
                });
            }
            Err(_) => release(),
        }
    }
}

/// Fans a manual refresh out over every scheduled key.
///
/// Exposes a combined busy flag: raised from the start of
/// [`RefreshCoordinator::refresh_all`] until every member settled and at
/// least `minimum_visible` elapsed, so a fast refresh still shows feedback.
/// Overlapping refreshes keep the flag up until the last one is released.
pub struct RefreshCoordinator<T> {
    log: Log,
    scheduler: Scheduler<T>,
    minimum_visible: Duration,
    busy: Arc<watch::Sender<usize>>,
}

impl<T> Clone for RefreshCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            log: self.log.clone(),
            scheduler: self.scheduler.clone(),
            minimum_visible: self.minimum_visible,
            busy: self.busy.clone(),
        }
    }
}

impl<T: Payload> RefreshCoordinator<T> {
    pub fn new(log: Log, scheduler: Scheduler<T>, minimum_visible: Duration) -> Self {
        let (busy, _) = watch::channel(0);
        Self {
            log,
            scheduler,
            minimum_visible,
            busy: Arc::new(busy),
        }
    }

    /// Revalidates every registered key concurrently and returns once all of
    /// them settled. A failing key never aborts the others.
    pub async fn refresh_all(&self) -> RefreshReport {
        let keys = self.scheduler.keys().await;
        let batch = RefreshBatch::begin(keys, self.minimum_visible, self.busy.clone());
        self.log
            .info(SCOPE, format!("Refreshing {} resources", batch.keys.len()));

        let mut fetches = JoinSet::new();
        for key in batch.keys.iter().cloned() {
            let scheduler = self.scheduler.clone();
            fetches.spawn(async move {
                let outcome = scheduler.revalidate(&key).await;
                (key, outcome)
            });
        }
        let mut outcomes = Vec::with_capacity(batch.keys.len());
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => self.log.error(SCOPE, format!("Refresh task failed: {e}")),
            }
        }
        outcomes.sort_by(|(a, _), (b, _)| a.cmp(b));

        let report = RefreshReport {
            outcomes,
            started: batch.started,
            settled: Instant::now(),
        };
        for key in report.failed() {
            self.log.warn(SCOPE, format!("Refresh of {key} failed"));
        }
        report
    }

    pub fn is_refreshing(&self) -> bool {
        *self.busy.borrow() > 0
    }

    /// Number of refreshes currently holding the flag; changes wake the
    /// receiver.
    pub fn watch(&self) -> watch::Receiver<usize> {
        self.busy.subscribe()
    }

    pub fn minimum_visible(&self) -> Duration {
        self.minimum_visible
    }
}
