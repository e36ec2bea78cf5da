use std::{collections::HashMap, time::Duration};

use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use crate::{ArcStr, log::Log};

mod core;
mod data;
mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::FetchError;
use message::Message;
pub use mock::MockResponse;

/// The networking actor.
///
/// Issues plain HTTP GETs and normalizes every failure into a [`FetchError`]:
/// transport problems and timeouts become `Network`, non-2xx statuses become
/// `Http`. Decoding is left to the caller.
///
/// # Examples
/// ```ignore
/// let net = Net::spawn(log, Duration::from_secs(15))?;
/// let body = net.get(arc_str!("http://localhost:8000/health")).await?;
/// ```
#[derive(Debug, Clone)]
pub enum Net {
    /// A real networking actor backed by reqwest
    Actual(Sender<Message>),
    /// Canned responses for tests
    Mock(mock::Mock),
}

impl Net {
    pub fn spawn(log: Log, timeout: Duration) -> anyhow::Result<Self> {
        let (net, _) = self::core::Core::new(log, timeout)?.spawn();
        Ok(net)
    }

    pub fn mock(responses: HashMap<ArcStr, MockResponse>) -> Self {
        Self::Mock(mock::Mock::new(responses))
    }

    pub fn mock_empty() -> Self {
        Self::Mock(mock::Mock::default())
    }

    /// Performs an HTTP GET and returns the body of a 2xx response.
    pub async fn get(&self, url: ArcStr) -> Result<ArcStr, FetchError> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::Get { url, tx })
                    .await
                    .context("Sending message to Net actor")
                    .expect("Net actor died");
                rx.await
                    .context("Awaiting response from Net actor")
                    .expect("Net actor died")
            }
            Net::Mock(mock) => mock.get(url).await,
        }
    }

    /// Replaces a canned response. No-op on a real actor.
    pub fn respond(&self, url: impl Into<ArcStr>, response: MockResponse) {
        if let Net::Mock(mock) = self {
            mock.respond(url, response);
        }
    }

    /// Requests issued for `url` so far, `None` on a real actor.
    pub fn calls(&self, url: &str) -> Option<usize> {
        match self {
            Net::Actual(_) => None,
            Net::Mock(mock) => Some(mock.calls(url)),
        }
    }
}
