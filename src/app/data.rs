use std::{fmt::Display, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    ArcStr,
    api::dashboard::{ChartsData, DashboardOverview, RecentActivities},
    config::{BoolOpt, Data, DurationOpt, USizeOpt},
    sync::{CacheEntry, EntryStatus, FetchError, ResourceKey},
};

/// One-shot commands run without the full-screen dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Overview,
    Charts,
    /// Recent activities; `None` uses the configured page size
    Activities { limit: Option<usize> },
    Health,
}

/// The three independently refreshed panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Overview,
    Charts,
    Activities,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Overview,
        ResourceKind::Charts,
        ResourceKind::Activities,
    ];

    /// Cache key; the activities page size is part of it.
    pub fn key(self, activities_limit: usize) -> ResourceKey {
        match self {
            ResourceKind::Overview => ResourceKey::from("overview"),
            ResourceKind::Charts => ResourceKey::from("charts"),
            ResourceKind::Activities => crate::resource_key!("activities?limit={activities_limit}"),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Overview => "Overview",
            ResourceKind::Charts => "Charts",
            ResourceKind::Activities => "Recent activity",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Cached payload of any panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Overview(DashboardOverview),
    Charts(ChartsData),
    Activities(RecentActivities),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Overview(_) => ResourceKind::Overview,
            Resource::Charts(_) => ResourceKind::Charts,
            Resource::Activities(_) => ResourceKind::Activities,
        }
    }

    pub fn into_overview(self) -> Option<DashboardOverview> {
        match self {
            Resource::Overview(overview) => Some(overview),
            _ => None,
        }
    }

    pub fn into_charts(self) -> Option<ChartsData> {
        match self {
            Resource::Charts(charts) => Some(charts),
            _ => None,
        }
    }

    pub fn into_activities(self) -> Option<RecentActivities> {
        match self {
            Resource::Activities(activities) => Some(activities),
            _ => None,
        }
    }
}

/// What a panel needs to render: data, error and whether a fetch is running.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceView<T> {
    pub data: Option<T>,
    pub error: Option<FetchError>,
    pub is_validating: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for ResourceView<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_validating: false,
            fetched_at: None,
        }
    }
}

impl<T> ResourceView<T> {
    pub fn status(&self) -> EntryStatus {
        CacheEntry {
            data: self.data.as_ref(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
            is_validating: self.is_validating,
        }
        .status()
    }

    pub fn from_entry(entry: Option<CacheEntry<Resource>>, pick: fn(Resource) -> Option<T>) -> Self {
        let Some(entry) = entry else {
            return Self::default();
        };
        Self {
            data: entry.data.and_then(pick),
            error: entry.error,
            is_validating: entry.is_validating,
            fetched_at: entry.fetched_at,
        }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub api_url: ArcStr,
    pub overview: ResourceView<DashboardOverview>,
    pub charts: ResourceView<ChartsData>,
    pub activities: ResourceView<RecentActivities>,
    pub is_refreshing: bool,
    /// Advances while anything is loading
    pub spinner_frame: usize,
    pub now: Option<DateTime<Utc>>,
}

impl DashboardView {
    pub fn is_busy(&self) -> bool {
        self.is_refreshing
            || self.overview.is_validating
            || self.charts.is_validating
            || self.activities.is_validating
    }
}

/// Timing and paging knobs of the dashboard, read from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub overview_interval: Duration,
    pub charts_interval: Duration,
    pub activities_interval: Duration,
    pub activities_limit: usize,
    pub refresh_visible: Duration,
    pub revalidate_on_focus: bool,
}

impl DashboardSettings {
    pub fn from_config(data: &Data) -> Self {
        Self {
            overview_interval: data.duration(DurationOpt::OverviewInterval),
            charts_interval: data.duration(DurationOpt::ChartsInterval),
            activities_interval: data.duration(DurationOpt::ActivitiesInterval),
            activities_limit: data.usize(USizeOpt::ActivitiesLimit),
            refresh_visible: data.duration(DurationOpt::RefreshVisible),
            revalidate_on_focus: data.bool(BoolOpt::RevalidateOnFocus),
        }
    }

    pub fn interval(&self, kind: ResourceKind) -> Duration {
        match kind {
            ResourceKind::Overview => self.overview_interval,
            ResourceKind::Charts => self.charts_interval,
            ResourceKind::Activities => self.activities_interval,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from_config(&Data::default())
    }
}
