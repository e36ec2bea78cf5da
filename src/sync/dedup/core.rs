use std::collections::HashMap;

use tokio::{
    sync::{
        mpsc::{self, UnboundedSender},
        oneshot,
    },
    task::JoinHandle,
};

use super::{
    Dedup,
    message::{Message, Settled},
};
use crate::{
    BUFFER_SIZE,
    log::Log,
    sync::{FetchError, Payload, ResourceKey, SharedFetcher},
};

const SCOPE: &str = "sync.dedup";

type Waiters<T> = Vec<oneshot::Sender<Result<T, FetchError>>>;

/// The core of the deduplicator: a registry of in-flight requests and the
/// callers waiting on each.
pub struct Core<T> {
    log: Log,
    in_flight: HashMap<ResourceKey, Waiters<T>>,
}

impl<T: Payload> Core<T> {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            in_flight: HashMap::new(),
        }
    }

    /// Transforms the core into an actor and returns its handle.
    ///
    /// The actor stops once every handle is gone and nothing is in flight.
    pub fn spawn(mut self) -> (Dedup<T>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
        let (settled_tx, mut settled_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut closed = false;
            loop {
                tokio::select! {
                    message = rx.recv(), if !closed => match message {
                        Some(Message::Run { key, fetcher, tx }) => {
                            self.run(key, fetcher, tx, &settled_tx)
                        }
                        Some(Message::InFlight { key, tx }) => {
                            let _ = tx.send(self.in_flight.contains_key(&key));
                        }
                        None => closed = true,
                    },
                    Some(settled) = settled_rx.recv() => self.settle(settled),
                }
                if closed && self.in_flight.is_empty() {
                    break;
                }
            }
        });
        (Dedup { tx }, handle)
    }

    fn run(
        &mut self,
        key: ResourceKey,
        fetcher: SharedFetcher<T>,
        tx: oneshot::Sender<Result<T, FetchError>>,
        settled_tx: &UnboundedSender<Settled<T>>,
    ) {
        if let Some(waiters) = self.in_flight.get_mut(&key) {
            waiters.push(tx);
            return;
        }
        self.log.info(SCOPE, format!("Fetching {key}"));
        self.in_flight.insert(key.clone(), vec![tx]);

        // the closure itself may panic before yielding a future
        let request = tokio::spawn(async move { fetcher.fetch().await });
        let settled_tx = settled_tx.clone();
        tokio::spawn(async move {
            // a panicking fetch still settles its waiters
            let result = request
                .await
                .unwrap_or_else(|e| Err(FetchError::Network(format!("fetch task failed: {e}"))));
            let _ = settled_tx.send(Settled { key, result });
        });
    }

    fn settle(&mut self, Settled { key, result }: Settled<T>) {
        let Some(waiters) = self.in_flight.remove(&key) else {
            return;
        };
        if let Err(e) = &result {
            self.log.warn(SCOPE, format!("Fetching {key} failed: {e}"));
        }
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}
