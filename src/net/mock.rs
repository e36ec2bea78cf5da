use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use super::data::FetchError;
use crate::ArcStr;

/// A canned answer for one URL.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: ArcStr,
    /// How long the request takes to settle
    pub delay: Duration,
}

impl MockResponse {
    pub fn ok(body: impl Into<ArcStr>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: ArcStr::default(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct State {
    responses: HashMap<ArcStr, MockResponse>,
    calls: HashMap<ArcStr, usize>,
}

/// Networking stand-in for tests. Unknown URLs answer with a network error.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    state: Arc<Mutex<State>>,
}

impl Mock {
    pub fn new(responses: HashMap<ArcStr, MockResponse>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                responses,
                calls: HashMap::new(),
            })),
        }
    }

    /// Replaces the answer for `url`, affecting subsequent requests only.
    pub fn respond(&self, url: impl Into<ArcStr>, response: MockResponse) {
        if let Ok(mut state) = self.state.lock() {
            state.responses.insert(url.into(), response);
        }
    }

    /// Number of GET requests issued for `url` so far.
    pub fn calls(&self, url: &str) -> usize {
        self.state
            .lock()
            .map(|state| state.calls.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub async fn get(&self, url: ArcStr) -> Result<ArcStr, FetchError> {
        let response = {
            let Ok(mut state) = self.state.lock() else {
                return Err(FetchError::Network("mock state poisoned".into()));
            };
            *state.calls.entry(url.clone()).or_default() += 1;
            state.responses.get(&url).cloned()
        };
        let Some(response) = response else {
            return Err(FetchError::Network(format!("no mock response for {url}")));
        };
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        if (200..300).contains(&response.status) {
            Ok(response.body)
        } else {
            Err(FetchError::Http {
                status: response.status,
            })
        }
    }
}
