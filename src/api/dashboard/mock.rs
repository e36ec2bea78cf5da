use std::sync::{Arc, Mutex};

use super::data::{ChartsData, DashboardOverview, Health, RecentActivities};
use crate::net::FetchError;

#[derive(Debug, Default)]
struct State {
    overview: Option<Result<DashboardOverview, FetchError>>,
    charts: Option<Result<ChartsData, FetchError>>,
    activities: Option<Result<RecentActivities, FetchError>>,
    health: Option<Result<Health, FetchError>>,
}

fn canned<T: Clone>(slot: &Option<Result<T, FetchError>>, what: &str) -> Result<T, FetchError> {
    slot.clone()
        .unwrap_or_else(|| Err(FetchError::Network(format!("no mock {what} response"))))
}

/// Typed canned responses for tests that do not care about JSON.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    state: Arc<Mutex<State>>,
}

impl Mock {
    pub fn set_overview(&self, result: Result<DashboardOverview, FetchError>) {
        if let Ok(mut state) = self.state.lock() {
            state.overview = Some(result);
        }
    }

    pub fn set_charts(&self, result: Result<ChartsData, FetchError>) {
        if let Ok(mut state) = self.state.lock() {
            state.charts = Some(result);
        }
    }

    pub fn set_activities(&self, result: Result<RecentActivities, FetchError>) {
        if let Ok(mut state) = self.state.lock() {
            state.activities = Some(result);
        }
    }

    pub fn set_health(&self, result: Result<Health, FetchError>) {
        if let Ok(mut state) = self.state.lock() {
            state.health = Some(result);
        }
    }

    pub fn overview(&self) -> Result<DashboardOverview, FetchError> {
        let state = self.state.lock().map_err(|_| poisoned())?;
        canned(&state.overview, "overview")
    }

    pub fn charts(&self) -> Result<ChartsData, FetchError> {
        let state = self.state.lock().map_err(|_| poisoned())?;
        canned(&state.charts, "charts")
    }

    /// Truncates the canned page to `limit` like the backend does.
    pub fn recent_activities(&self, limit: usize) -> Result<RecentActivities, FetchError> {
        let state = self.state.lock().map_err(|_| poisoned())?;
        canned(&state.activities, "activities").map(|mut page| {
            page.activities.truncate(limit);
            page
        })
    }

    pub fn health(&self) -> Result<Health, FetchError> {
        let state = self.state.lock().map_err(|_| poisoned())?;
        canned(&state.health, "health")
    }
}

fn poisoned() -> FetchError {
    FetchError::Network("mock state poisoned".into())
}
