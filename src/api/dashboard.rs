use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use crate::{ArcStr, net::{FetchError, Net}};

mod core;
pub mod data;
#[cfg(test)]
pub(crate) mod fixtures;
mod message;
mod mock;
pub mod parse;
#[cfg(test)]
mod tests;

pub use data::{
    BoxMetrics, ChartsData, DashboardOverview, DeliveryMetrics, DeliveryTrend, Distribution,
    Health, OverviewStats, RecentActivities, RecentActivity, RouteEfficiency, RouteMetrics,
    VehicleTypeDistribution,
};
use message::Message;

/// The dashboard API actor.
///
/// Sits between the synchronization layer and the networking actor: one
/// method per backend endpoint, each returning a typed payload or a
/// [`FetchError`]. Requests are independent and may run concurrently.
///
/// # Examples
/// ```ignore
/// let api = DashboardApi::spawn(net, arc_str!("http://localhost:8000"));
/// let overview = api.overview().await?;
/// ```
#[derive(Debug, Clone)]
pub enum DashboardApi {
    /// A real API actor requesting through [`Net`]
    Actual(Sender<Message>),
    /// Typed canned responses for tests
    Mock(mock::Mock),
}

impl DashboardApi {
    pub fn spawn(net: Net, base_url: ArcStr) -> Self {
        let (api, _) = self::core::Core::new(net, base_url).spawn();
        api
    }

    pub fn mock() -> Self {
        Self::Mock(mock::Mock::default())
    }

    async fn request<T>(
        sender: &Sender<Message>,
        message: impl FnOnce(oneshot::Sender<Result<T, FetchError>>) -> Message,
    ) -> Result<T, FetchError> {
        let (tx, rx) = oneshot::channel();
        sender
            .send(message(tx))
            .await
            .context("Sending message to DashboardApi actor")
            .expect("DashboardApi actor died");
        rx.await
            .context("Awaiting response from DashboardApi actor")
            .expect("DashboardApi actor died")
    }

    /// `GET /api/v1/dashboard/overview`
    pub async fn overview(&self) -> Result<DashboardOverview, FetchError> {
        match self {
            Self::Actual(sender) => Self::request(sender, |tx| Message::Overview { tx }).await,
            Self::Mock(mock) => mock.overview(),
        }
    }

    /// `GET /api/v1/dashboard/charts`
    pub async fn charts(&self) -> Result<ChartsData, FetchError> {
        match self {
            Self::Actual(sender) => Self::request(sender, |tx| Message::Charts { tx }).await,
            Self::Mock(mock) => mock.charts(),
        }
    }

    /// `GET /api/v1/dashboard/recent-activities?limit={limit}`
    pub async fn recent_activities(&self, limit: usize) -> Result<RecentActivities, FetchError> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, |tx| Message::RecentActivities { limit, tx }).await
            }
            Self::Mock(mock) => mock.recent_activities(limit),
        }
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Health, FetchError> {
        match self {
            Self::Actual(sender) => Self::request(sender, |tx| Message::Health { tx }).await,
            Self::Mock(mock) => mock.health(),
        }
    }

    pub fn set_overview(&self, result: Result<DashboardOverview, FetchError>) {
        if let Self::Mock(mock) = self {
            mock.set_overview(result);
        }
    }

    pub fn set_charts(&self, result: Result<ChartsData, FetchError>) {
        if let Self::Mock(mock) = self {
            mock.set_charts(result);
        }
    }

    pub fn set_activities(&self, result: Result<RecentActivities, FetchError>) {
        if let Self::Mock(mock) = self {
            mock.set_activities(result);
        }
    }

    pub fn set_health(&self, result: Result<Health, FetchError>) {
        if let Self::Mock(mock) = self {
            mock.set_health(result);
        }
    }
}
