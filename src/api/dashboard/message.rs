use tokio::sync::oneshot::Sender;

use super::data::{ChartsData, DashboardOverview, Health, RecentActivities};
use crate::net::FetchError;

/// Messages understood by the dashboard API actor.
#[derive(Debug)]
pub enum Message {
    Overview {
        tx: Sender<Result<DashboardOverview, FetchError>>,
    },
    Charts {
        tx: Sender<Result<ChartsData, FetchError>>,
    },
    RecentActivities {
        limit: usize,
        tx: Sender<Result<RecentActivities, FetchError>>,
    },
    Health {
        tx: Sender<Result<Health, FetchError>>,
    },
}
