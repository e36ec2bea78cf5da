use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tokio::{sync::mpsc, task::JoinHandle};

use super::{data::FetchError, message::Message};
use crate::{ArcStr, BUFFER_SIZE, log::Log, net::Net};

const SCOPE: &str = "net";

/// The core of the networking actor.
///
/// Wraps a pooled [`reqwest::Client`]. Each request runs on its own task so a
/// slow endpoint never holds up requests for other URLs.
#[derive(Debug)]
pub struct Core {
    log: Log,
    client: Client,
}

impl Core {
    /// Builds the HTTP client with the per-request timeout.
    pub fn new(log: Log, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("logidash/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Building HTTP client")?;
        Ok(Self { log, client })
    }

    /// Transforms the core into an actor and returns its handle.
    pub fn spawn(self) -> (Net, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Get { url, tx } => {
                        let client = self.client.clone();
                        let log = self.log.clone();
                        tokio::spawn(async move {
                            let response = get(&client, &url).await;
                            if let Err(e) = &response {
                                log.warn(SCOPE, format!("GET {url} failed: {e}"));
                            }
                            let _ = tx.send(response);
                        });
                    }
                }
            }
        });

        (Net::Actual(tx), handle)
    }
}

async fn get(client: &Client, url: &ArcStr) -> Result<ArcStr, FetchError> {
    let response = client.get(&**url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            status: status.as_u16(),
        });
    }
    let text = response
        .text()
        .await
        .map_err(|e| FetchError::Network(format!("reading response body: {e}")))?;
    Ok(ArcStr::from(text))
}
