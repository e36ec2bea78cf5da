use tokio::sync::{mpsc, watch};

use super::data::{DashboardSettings, DashboardView, Resource, ResourceKind, ResourceView};
use crate::{
    ArcStr,
    api::dashboard::{ChartsData, DashboardApi, DashboardOverview, RecentActivities},
    log::Log,
    sync::{
        CacheEntry, Dedup, RefreshCoordinator, RefreshReport, ResourceKey, Revalidation, Scheduler,
        SharedFetcher, Store, Subscription, SubscriptionOptions, Update, fetcher,
    },
};

const SCOPE: &str = "app.dashboard";

/// The dashboard's view of the synchronization layer.
///
/// Owns one store, deduplicator, scheduler and refresh coordinator, all keyed
/// by [`ResourceKind::key`]. Panels read snapshots through
/// [`Dashboard::snapshot`] and never wait on the network.
#[derive(Clone)]
pub struct Dashboard {
    log: Log,
    api: DashboardApi,
    api_url: ArcStr,
    settings: DashboardSettings,
    store: Store<Resource>,
    scheduler: Scheduler<Resource>,
    coordinator: RefreshCoordinator<Resource>,
}

impl Dashboard {
    pub fn new(log: Log, api: DashboardApi, api_url: ArcStr, settings: DashboardSettings) -> Self {
        let store = Store::spawn(log.clone());
        let dedup = Dedup::spawn(log.clone());
        let scheduler = Scheduler::spawn(log.clone(), store.clone(), dedup);
        let coordinator =
            RefreshCoordinator::new(log.clone(), scheduler.clone(), settings.refresh_visible);
        Self {
            log,
            api,
            api_url,
            settings,
            store,
            scheduler,
            coordinator,
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn key(&self, kind: ResourceKind) -> ResourceKey {
        kind.key(self.settings.activities_limit)
    }

    fn fetcher(&self, kind: ResourceKind) -> SharedFetcher<Resource> {
        let api = self.api.clone();
        match kind {
            ResourceKind::Overview => fetcher(move || {
                let api = api.clone();
                async move { api.overview().await.map(Resource::Overview) }
            }),
            ResourceKind::Charts => fetcher(move || {
                let api = api.clone();
                async move { api.charts().await.map(Resource::Charts) }
            }),
            ResourceKind::Activities => {
                let limit = self.settings.activities_limit;
                fetcher(move || {
                    let api = api.clone();
                    async move { api.recent_activities(limit).await.map(Resource::Activities) }
                })
            }
        }
    }

    /// Starts keeping `kind` fresh. The returned subscription keeps the
    /// panel scheduled until dropped.
    pub async fn mount(&self, kind: ResourceKind) -> Subscription {
        let options = SubscriptionOptions::every(self.settings.interval(kind))
            .on_focus(self.settings.revalidate_on_focus);
        self.log.info(SCOPE, format!("Mounting {kind} panel"));
        self.scheduler
            .register(self.key(kind), options, self.fetcher(kind))
            .await
    }

    pub async fn mount_all(&self) -> Vec<Subscription> {
        let mut subscriptions = Vec::with_capacity(ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            subscriptions.push(self.mount(kind).await);
        }
        subscriptions
    }

    /// Merged change feed of every panel, one update per cache write.
    pub async fn updates(&self) -> mpsc::UnboundedReceiver<Update<Resource>> {
        let (tx, rx) = mpsc::unbounded_channel();
        for kind in ResourceKind::ALL {
            self.store.subscribe(&self.key(kind), tx.clone()).await;
        }
        rx
    }

    pub async fn entry(&self, kind: ResourceKind) -> Option<CacheEntry<Resource>> {
        self.store.get(&self.key(kind)).await
    }

    pub async fn overview(&self) -> ResourceView<DashboardOverview> {
        ResourceView::from_entry(
            self.entry(ResourceKind::Overview).await,
            Resource::into_overview,
        )
    }

    pub async fn charts(&self) -> ResourceView<ChartsData> {
        ResourceView::from_entry(self.entry(ResourceKind::Charts).await, Resource::into_charts)
    }

    pub async fn activities(&self) -> ResourceView<RecentActivities> {
        ResourceView::from_entry(
            self.entry(ResourceKind::Activities).await,
            Resource::into_activities,
        )
    }

    pub async fn snapshot(&self) -> DashboardView {
        DashboardView {
            api_url: self.api_url.clone(),
            overview: self.overview().await,
            charts: self.charts().await,
            activities: self.activities().await,
            is_refreshing: self.is_refreshing(),
            spinner_frame: 0,
            now: Some(chrono::Utc::now()),
        }
    }

    /// Revalidates one panel and waits for the outcome.
    pub async fn refresh(&self, kind: ResourceKind) -> Revalidation {
        let outcome = self.scheduler.revalidate(&self.key(kind)).await;
        if let Revalidation::Failed(e) = &outcome {
            self.log.warn(SCOPE, format!("Refreshing {kind} failed: {e}"));
        }
        outcome
    }

    pub async fn refresh_all(&self) -> RefreshReport {
        self.coordinator.refresh_all().await
    }

    pub fn is_refreshing(&self) -> bool {
        self.coordinator.is_refreshing()
    }

    pub fn watch_refreshing(&self) -> watch::Receiver<usize> {
        self.coordinator.watch()
    }

    /// The terminal regained focus.
    pub async fn focus(&self) {
        self.scheduler.focus().await;
    }
}
