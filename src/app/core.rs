use std::time::Duration;

use anyhow::{anyhow, bail};
use tokio::{
    sync::mpsc::UnboundedReceiver,
    time::{MissedTickBehavior, interval},
};

use super::{
    dashboard::Dashboard,
    data::{DashboardSettings, ResourceKind, ResourceView},
    text,
};
use crate::{
    ArcStr,
    api::DashboardApi,
    config::{ConfigError, MAX_ACTIVITIES_LIMIT},
    log::Log,
    terminal::{Terminal, UiEvent},
};

const SCOPE: &str = "app";

/// Frame period of the loading spinner.
const SPINNER_PERIOD: Duration = Duration::from_millis(120);

pub struct Core {
    log: Log,
    api: DashboardApi,
    api_url: ArcStr,
    dashboard: Dashboard,
}

impl Core {
    pub fn new(log: Log, api: DashboardApi, api_url: ArcStr, settings: DashboardSettings) -> Self {
        let dashboard = Dashboard::new(log.clone(), api.clone(), api_url.clone(), settings);
        Self {
            log,
            api,
            api_url,
            dashboard,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// Mounts one panel, forces a fetch through the sync layer and unmounts.
    async fn fetch_once(&self, dashboard: &Dashboard, kind: ResourceKind) {
        let subscription = dashboard.mount(kind).await;
        dashboard.refresh(kind).await;
        subscription.unsubscribe().await;
    }

    fn settle<T>(&self, kind: ResourceKind, view: ResourceView<T>) -> anyhow::Result<T> {
        match (view.data, view.error) {
            (Some(data), None) => Ok(data),
            (Some(data), Some(e)) => {
                self.log
                    .warn(SCOPE, format!("Showing cached {kind} after failure: {e}"));
                Ok(data)
            }
            (None, Some(e)) => Err(anyhow::Error::new(e).context(format!("Fetching {kind}"))),
            (None, None) => Err(anyhow!("No {kind} data was received")),
        }
    }

    pub async fn handle_overview_command(&self) -> anyhow::Result<String> {
        self.fetch_once(&self.dashboard, ResourceKind::Overview).await;
        let overview = self.settle(ResourceKind::Overview, self.dashboard.overview().await)?;
        Ok(text::overview(&overview))
    }

    pub async fn handle_charts_command(&self) -> anyhow::Result<String> {
        self.fetch_once(&self.dashboard, ResourceKind::Charts).await;
        let charts = self.settle(ResourceKind::Charts, self.dashboard.charts().await)?;
        Ok(text::charts(&charts))
    }

    /// A `limit` other than the configured one gets its own cache key.
    pub async fn handle_activities_command(&self, limit: Option<usize>) -> anyhow::Result<String> {
        let configured = self.dashboard.settings().activities_limit;
        let limit = limit.unwrap_or(configured);
        if !(1..=MAX_ACTIVITIES_LIMIT).contains(&limit) {
            bail!(ConfigError::ActivitiesLimitOutOfRange(limit));
        }
        let dashboard = if limit == configured {
            self.dashboard.clone()
        } else {
            let settings = DashboardSettings {
                activities_limit: limit,
                ..*self.dashboard.settings()
            };
            Dashboard::new(
                self.log.clone(),
                self.api.clone(),
                self.api_url.clone(),
                settings,
            )
        };
        self.fetch_once(&dashboard, ResourceKind::Activities).await;
        let page = self.settle(ResourceKind::Activities, dashboard.activities().await)?;
        Ok(text::activities(&page))
    }

    /// Probes the backend directly; health is never cached.
    pub async fn handle_health_command(&self) -> anyhow::Result<String> {
        let health = self
            .log
            .warn_on_error(SCOPE, self.api.health().await)
            .map_err(|e| anyhow::Error::new(e).context(format!("Probing {}", self.api_url)))?;
        if !health.is_healthy() {
            bail!("{} reports status `{}`", self.api_url, health.status);
        }
        Ok(text::health(&health))
    }

    /// The interactive loop: repaints on every cache write, refresh flag
    /// change and input event, and animates the spinner while busy.
    pub async fn run_interactive(
        &self,
        terminal: &Terminal,
        mut events: UnboundedReceiver<UiEvent>,
    ) -> anyhow::Result<()> {
        let mut updates = self.dashboard.updates().await;
        let mut refreshing = self.dashboard.watch_refreshing();
        let _subscriptions = self.dashboard.mount_all().await;
        self.log.info(SCOPE, format!("Watching {}", self.api_url));

        let mut spinner = interval(SPINNER_PERIOD);
        spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frame = 0usize;

        let mut view = self.dashboard.snapshot().await;
        terminal.draw(view.clone()).await?;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    None | Some(UiEvent::Quit) => break,
                    Some(UiEvent::RefreshAll) => {
                        let dashboard = self.dashboard.clone();
                        tokio::spawn(async move {
                            dashboard.refresh_all().await;
                        });
                    }
                    Some(UiEvent::Refresh(kind)) => {
                        let dashboard = self.dashboard.clone();
                        tokio::spawn(async move {
                            dashboard.refresh(kind).await;
                        });
                    }
                    Some(UiEvent::Focus) => self.dashboard.focus().await,
                    Some(UiEvent::Redraw) => {}
                },
                Some(_) = updates.recv() => {}
                Ok(()) = refreshing.changed() => {}
                _ = spinner.tick(), if view.is_busy() => {
                    frame = frame.wrapping_add(1);
                }
            }
            view = self.dashboard.snapshot().await;
            view.spinner_frame = frame;
            terminal.draw(view.clone()).await?;
        }

        self.log.info(SCOPE, "Leaving dashboard");
        Ok(())
    }
}
