use std::collections::{HashMap, hash_map::Entry};

use chrono::Utc;
use tokio::{
    sync::{
        mpsc::{self, UnboundedSender},
        oneshot,
    },
    task::JoinHandle,
};

use super::{
    Scheduler,
    data::{Event, Revalidation, Subscription, SubscriptionId, SubscriptionOptions},
    message::Message,
};
use crate::{
    BUFFER_SIZE,
    log::Log,
    sync::{Dedup, EntryPatch, FetchError, Payload, ResourceKey, ScheduledTask, SharedFetcher, Store},
};

const SCOPE: &str = "sync.scheduler";

/// A key with at least one live subscription.
struct Slot<T> {
    fetcher: SharedFetcher<T>,
    /// Aborted when the slot is dropped
    timer: ScheduledTask,
    subscriptions: Vec<(SubscriptionId, SubscriptionOptions)>,
}

/// The core of the scheduler.
///
/// A key is idle, scheduled (has a slot) or fetching (is in `in_flight`).
/// Fetching may outlive the slot: the fetch still commits to the store.
pub struct Core<T> {
    log: Log,
    store: Store<T>,
    dedup: Dedup<T>,
    slots: HashMap<ResourceKey, Slot<T>>,
    /// Keys being fetched and the callers waiting for the outcome
    in_flight: HashMap<ResourceKey, Vec<oneshot::Sender<Revalidation>>>,
    next_subscription: u64,
}

impl<T: Payload> Core<T> {
    pub fn new(log: Log, store: Store<T>, dedup: Dedup<T>) -> Self {
        Self {
            log,
            store,
            dedup,
            slots: HashMap::new(),
            in_flight: HashMap::new(),
            next_subscription: 0,
        }
    }

    /// Transforms the core into an actor and returns its handle.
    ///
    /// The actor stops once every handle and subscription is gone and no
    /// fetch is in flight.
    pub fn spawn(mut self) -> (Scheduler<T>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(BUFFER_SIZE);
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut closed = false;
            loop {
                tokio::select! {
                    message = rx.recv(), if !closed => match message {
                        Some(Message::Register { key, options, fetcher, tx }) => {
                            let subscription = self.register(key, options, fetcher, &events_tx).await;
                            let _ = tx.send(subscription);
                        }
                        Some(Message::Revalidate { key, tx }) => {
                            self.revalidate(&key, Some(tx), &events_tx);
                        }
                        Some(Message::Focus) => self.focus(&events_tx),
                        Some(Message::Keys { tx }) => {
                            let mut keys: Vec<_> = self.slots.keys().cloned().collect();
                            keys.sort();
                            let _ = tx.send(keys);
                        }
                        Some(Message::IsFetching { key, tx }) => {
                            let _ = tx.send(self.in_flight.contains_key(&key));
                        }
                        None => closed = true,
                    },
                    Some(event) = events_rx.recv() => match event {
                        Event::Tick(key) => self.tick(&key, &events_tx),
                        Event::Settled { key, outcome } => self.settle(key, outcome),
                        Event::Unregister { id, ack } => {
                            self.unregister(id);
                            if let Some(ack) = ack {
                                let _ = ack.send(());
                            }
                        }
                    },
                }
                if closed && self.slots.is_empty() && self.in_flight.is_empty() {
                    break;
                }
            }
        });
        (Scheduler { tx }, handle)
    }

    async fn register(
        &mut self,
        key: ResourceKey,
        options: SubscriptionOptions,
        fetcher: SharedFetcher<T>,
        events: &UnboundedSender<Event>,
    ) -> Subscription {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        let slot = match self.slots.entry(key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.log.info(
                    SCOPE,
                    format!("Scheduling {key} every {:?}", options.interval),
                );
                let tick_events = events.clone();
                let tick_key = key.clone();
                let timer = ScheduledTask::every(options.interval, move || {
                    let _ = tick_events.send(Event::Tick(tick_key.clone()));
                });
                entry.insert(Slot {
                    fetcher,
                    timer,
                    subscriptions: Vec::new(),
                })
            }
        };
        slot.subscriptions.push((id, options));

        if options.revalidate_if_empty && !self.in_flight.contains_key(&key) {
            let cached = self.store.get(&key).await;
            if !cached.is_some_and(|entry| entry.has_data()) {
                self.revalidate(&key, None, events);
            }
        }
        Subscription::new(id, key, events.clone())
    }

    fn unregister(&mut self, id: SubscriptionId) {
        let Some(key) = self
            .slots
            .iter()
            .find(|(_, slot)| slot.subscriptions.iter().any(|(sub, _)| *sub == id))
            .map(|(key, _)| key.clone())
        else {
            return;
        };
        let Some(slot) = self.slots.get_mut(&key) else {
            return;
        };
        slot.subscriptions.retain(|(sub, _)| *sub != id);
        if slot.subscriptions.is_empty() {
            // dropping the slot aborts its timer; an in-flight fetch is left alone
            if let Some(slot) = self.slots.remove(&key) {
                self.log.info(
                    SCOPE,
                    format!("Unscheduled {key} after {:?} period", slot.timer.period()),
                );
            }
        }
    }

    fn tick(&mut self, key: &ResourceKey, events: &UnboundedSender<Event>) {
        if self.in_flight.contains_key(key) {
            self.log
                .info(SCOPE, format!("Skipping tick for {key}, still fetching"));
            return;
        }
        self.revalidate(key, None, events);
    }

    fn focus(&mut self, events: &UnboundedSender<Event>) {
        let keys: Vec<_> = self
            .slots
            .iter()
            .filter(|(_, slot)| {
                slot.subscriptions
                    .iter()
                    .any(|(_, options)| options.revalidate_on_focus)
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in keys {
            if !self.in_flight.contains_key(&key) {
                self.revalidate(&key, None, events);
            }
        }
    }

    /// Starts a fetch for `key`, or joins the one in flight.
    fn revalidate(
        &mut self,
        key: &ResourceKey,
        waiter: Option<oneshot::Sender<Revalidation>>,
        events: &UnboundedSender<Event>,
    ) {
        if let Some(waiters) = self.in_flight.get_mut(key) {
            waiters.extend(waiter);
            return;
        }
        let Some(slot) = self.slots.get(key) else {
            if let Some(waiter) = waiter {
                let _ = waiter.send(Revalidation::NotRegistered);
            }
            return;
        };
        let fetcher = slot.fetcher.clone();
        self.in_flight.insert(key.clone(), waiter.into_iter().collect());

        let store = self.store.clone();
        let dedup = self.dedup.clone();
        let events = events.clone();
        let key = key.clone();
        tokio::spawn(async move {
            store.set(&key, EntryPatch::validating()).await;
            let fetch = {
                let key = key.clone();
                tokio::spawn(async move { dedup.run(&key, fetcher).await })
            };
            let result = fetch
                .await
                .unwrap_or_else(|e| Err(FetchError::Network(format!("fetch task failed: {e}"))));
            let outcome = match &result {
                Ok(_) => Revalidation::Updated,
                Err(e) => Revalidation::Failed(e.clone()),
            };
            store.set(&key, EntryPatch::settled(result, Utc::now())).await;
            let _ = events.send(Event::Settled { key, outcome });
        });
    }

    fn settle(&mut self, key: ResourceKey, outcome: Revalidation) {
        if let Revalidation::Failed(e) = &outcome {
            self.log
                .warn(SCOPE, format!("Revalidating {key} failed: {e}"));
        }
        for waiter in self.in_flight.remove(&key).unwrap_or_default() {
            let _ = waiter.send(outcome.clone());
        }
    }
}
