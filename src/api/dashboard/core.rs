use serde::de::DeserializeOwned;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use super::{DashboardApi, message::Message, parse::parse_json};
use crate::{ArcStr, BUFFER_SIZE, net::{FetchError, Net}};

/// Path prefix of the versioned dashboard endpoints.
const DASHBOARD_PREFIX: &str = "/api/v1/dashboard";

/// The core of the dashboard API actor.
///
/// Builds endpoint URLs from the configured base URL and decodes the bodies
/// returned by the networking actor into typed payloads.
#[derive(Debug)]
pub struct Core {
    net: Net,
    /// Backend origin without a trailing slash, e.g. `http://localhost:8000`
    base_url: ArcStr,
}

impl Core {
    pub fn new(net: Net, base_url: ArcStr) -> Self {
        let base_url = ArcStr::from(base_url.trim_end_matches('/'));
        Self { net, base_url }
    }

    pub fn overview_url(&self) -> ArcStr {
        ArcStr::from(format!("{}{DASHBOARD_PREFIX}/overview", self.base_url))
    }

    pub fn charts_url(&self) -> ArcStr {
        ArcStr::from(format!("{}{DASHBOARD_PREFIX}/charts", self.base_url))
    }

    pub fn activities_url(&self, limit: usize) -> ArcStr {
        ArcStr::from(format!(
            "{}{DASHBOARD_PREFIX}/recent-activities?limit={limit}",
            self.base_url
        ))
    }

    pub fn health_url(&self) -> ArcStr {
        ArcStr::from(format!("{}/health", self.base_url))
    }

    /// Transforms the core into an actor and returns its handle.
    pub fn spawn(self) -> (DashboardApi, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Overview { tx } => self.fetch(self.overview_url(), tx),
                    Message::Charts { tx } => self.fetch(self.charts_url(), tx),
                    Message::RecentActivities { limit, tx } => {
                        self.fetch(self.activities_url(limit), tx)
                    }
                    Message::Health { tx } => self.fetch(self.health_url(), tx),
                }
            }
        });

        (DashboardApi::Actual(tx), handle)
    }

    /// Requests `url` on its own task and replies with the decoded body.
    fn fetch<T>(&self, url: ArcStr, tx: oneshot::Sender<Result<T, FetchError>>)
    where
        T: DeserializeOwned + Send + 'static,
    {
        let net = self.net.clone();
        tokio::spawn(async move {
            let result = match net.get(url).await {
                Ok(body) => parse_json(&body),
                Err(e) => Err(e),
            };
            let _ = tx.send(result);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let core = Core::new(Net::mock_empty(), ArcStr::from("http://localhost:8000/"));
        assert_eq!(
            &*core.overview_url(),
            "http://localhost:8000/api/v1/dashboard/overview"
        );
        assert_eq!(
            &*core.charts_url(),
            "http://localhost:8000/api/v1/dashboard/charts"
        );
        assert_eq!(
            &*core.activities_url(20),
            "http://localhost:8000/api/v1/dashboard/recent-activities?limit=20"
        );
        assert_eq!(&*core.health_url(), "http://localhost:8000/health");
    }
}
