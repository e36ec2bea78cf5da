use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use tokio::time::{Instant, sleep};

use super::*;
use crate::sync::{EntryPatch, FetchError, fetcher};

fn setup() -> (Store<u32>, Scheduler<u32>) {
    let log = Log::mock();
    let store = Store::spawn(log.clone());
    let scheduler = Scheduler::spawn(log.clone(), store.clone(), Dedup::spawn(log));
    (store, scheduler)
}

/// Answers call `n` with `results[n]`, repeating the last one.
fn scripted(
    calls: &Arc<AtomicUsize>,
    delay: Duration,
    results: Vec<Result<u32, FetchError>>,
) -> SharedFetcher<u32> {
    let calls = calls.clone();
    fetcher(move || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        let result = results[n.min(results.len() - 1)].clone();
        async move {
            sleep(delay).await;
            result
        }
    })
}

fn quiet(interval: Duration) -> SubscriptionOptions {
    SubscriptionOptions::every(interval)
        .if_empty(false)
        .on_focus(false)
}

#[tokio::test(start_paused = true)]
async fn test_register_fetches_when_cache_is_empty() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("overview");

    let _sub = scheduler
        .register(
            key.clone(),
            SubscriptionOptions::every(Duration::from_secs(30)),
            scripted(&calls, Duration::from_millis(10), vec![Ok(1)]),
        )
        .await;
    sleep(Duration::from_millis(20)).await;

    let entry = store.get(&key).await.unwrap();
    assert_eq!(entry.data, Some(1));
    assert!(!entry.is_validating);
    assert!(entry.fetched_at.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_register_skips_fetch_when_cached() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("charts");
    store.set(&key, EntryPatch::success(9, Utc::now())).await;

    let _sub = scheduler
        .register(
            key.clone(),
            SubscriptionOptions::every(Duration::from_secs(60)),
            scripted(&calls, Duration::ZERO, vec![Ok(1)]),
        )
        .await;
    sleep(Duration::from_millis(10)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.get(&key).await.unwrap().data, Some(9));
}

#[tokio::test(start_paused = true)]
async fn test_interval_triggers_revalidation() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("activities?limit=20");

    let _sub = scheduler
        .register(
            key.clone(),
            quiet(Duration::from_secs(15)),
            scripted(&calls, Duration::ZERO, vec![Ok(1), Ok(2)]),
        )
        .await;

    sleep(Duration::from_secs(14)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    sleep(Duration::from_secs(2)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    sleep(Duration::from_secs(15)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.get(&key).await.unwrap().data, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_tick_during_fetch_is_noop() {
    let (_, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));

    // ticks at 10, 20, 30, 40, 50ms; the fetch takes 35ms
    let _sub = scheduler
        .register(
            ResourceKey::from("overview"),
            quiet(Duration::from_millis(10)),
            scripted(&calls, Duration::from_millis(35), vec![Ok(1)]),
        )
        .await;

    sleep(Duration::from_millis(42)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    sleep(Duration::from_millis(18)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_marks_validating_before_commit() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("overview");
    let (_, mut updates) = store.listen(&key).await;

    let _sub = scheduler
        .register(
            key.clone(),
            quiet(Duration::from_secs(30)),
            scripted(&calls, Duration::from_millis(10), vec![Ok(5)]),
        )
        .await;
    assert_eq!(scheduler.revalidate(&key).await, Revalidation::Updated);

    let first = updates.recv().await.unwrap().entry;
    assert!(first.is_validating);
    assert_eq!(first.data, None);
    let second = updates.recv().await.unwrap().entry;
    assert!(!second.is_validating);
    assert_eq!(second.data, Some(5));
}

#[tokio::test(start_paused = true)]
async fn test_failure_after_success_keeps_stale_data() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("charts");
    let _sub = scheduler
        .register(
            key.clone(),
            quiet(Duration::from_secs(60)),
            scripted(
                &calls,
                Duration::from_millis(5),
                vec![Ok(7), Err(FetchError::Http { status: 500 })],
            ),
        )
        .await;

    assert_eq!(scheduler.revalidate(&key).await, Revalidation::Updated);
    let before = store.get(&key).await.unwrap();

    let outcome = scheduler.revalidate(&key).await;
    assert_eq!(outcome.error(), Some(&FetchError::Http { status: 500 }));

    let after = store.get(&key).await.unwrap();
    assert_eq!(after.data, Some(7));
    assert_eq!(after.fetched_at, before.fetched_at);
    assert_eq!(after.error, Some(FetchError::Http { status: 500 }));
    assert!(!after.is_validating);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_revalidations_fetch_twice() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("overview");
    let _sub = scheduler
        .register(
            key.clone(),
            quiet(Duration::from_secs(30)),
            scripted(&calls, Duration::from_millis(5), vec![Ok(3)]),
        )
        .await;

    scheduler.revalidate(&key).await;
    let first = store.get(&key).await.unwrap();
    scheduler.revalidate(&key).await;
    let second = store.get(&key).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(first.data, second.data);
    assert_eq!(first.error, second.error);
}

#[tokio::test(start_paused = true)]
async fn test_revalidate_joins_in_flight_fetch() {
    let (_, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("overview");
    let _sub = scheduler
        .register(
            key.clone(),
            quiet(Duration::from_millis(40)),
            scripted(&calls, Duration::from_millis(50), vec![Ok(1)]),
        )
        .await;

    // the tick at 40ms starts a fetch that settles at 90ms
    sleep(Duration::from_millis(45)).await;
    assert!(scheduler.is_fetching(&key).await);
    let start = Instant::now();
    assert_eq!(scheduler.revalidate(&key).await, Revalidation::Updated);

    assert!(start.elapsed() >= Duration::from_millis(45));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_revalidate_unknown_key() {
    let (_, scheduler) = setup();
    assert_eq!(
        scheduler.revalidate(&ResourceKey::from("nope")).await,
        Revalidation::NotRegistered
    );
}

#[tokio::test(start_paused = true)]
async fn test_last_unsubscribe_stops_timer_but_fetch_commits() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("overview");
    let sub = scheduler
        .register(
            key.clone(),
            quiet(Duration::from_millis(100)),
            scripted(&calls, Duration::from_millis(50), vec![Ok(11)]),
        )
        .await;

    // fetch runs from 100ms to 150ms
    sleep(Duration::from_millis(120)).await;
    assert!(scheduler.is_fetching(&key).await);
    sub.unsubscribe().await;
    assert!(scheduler.keys().await.is_empty());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let entry = store.get(&key).await.unwrap();
    assert_eq!(entry.data, Some(11));
    assert!(!entry.is_validating);
}

#[tokio::test(start_paused = true)]
async fn test_timer_survives_while_any_subscription_remains() {
    let (_, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("charts");
    let first = scheduler
        .register(
            key.clone(),
            quiet(Duration::from_millis(100)),
            scripted(&calls, Duration::ZERO, vec![Ok(1)]),
        )
        .await;
    // a different interval is ignored for an already scheduled key
    let second = scheduler
        .register(
            key.clone(),
            quiet(Duration::from_millis(10)),
            scripted(&calls, Duration::ZERO, vec![Ok(2)]),
        )
        .await;
    assert_ne!(first.id(), second.id());

    first.unsubscribe().await;
    sleep(Duration::from_millis(250)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(scheduler.keys().await, vec![key]);

    drop(second);
    sleep(Duration::from_millis(1)).await;
    assert!(scheduler.keys().await.is_empty());
    sleep(Duration::from_millis(500)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_focus_revalidates_focus_enabled_keys_only() {
    let (store, scheduler) = setup();
    let focus_calls = Arc::new(AtomicUsize::new(0));
    let other_calls = Arc::new(AtomicUsize::new(0));
    let focused = ResourceKey::from("overview");
    let unfocused = ResourceKey::from("charts");

    let _a = scheduler
        .register(
            focused.clone(),
            quiet(Duration::from_secs(30)).on_focus(true),
            scripted(&focus_calls, Duration::ZERO, vec![Ok(1)]),
        )
        .await;
    let _b = scheduler
        .register(
            unfocused.clone(),
            quiet(Duration::from_secs(30)),
            scripted(&other_calls, Duration::ZERO, vec![Ok(2)]),
        )
        .await;

    scheduler.focus().await;
    sleep(Duration::from_millis(10)).await;

    assert_eq!(focus_calls.load(Ordering::SeqCst), 1);
    assert_eq!(other_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.get(&focused).await.unwrap().data, Some(1));
    assert_eq!(store.get(&unfocused).await, None);
}

#[tokio::test(start_paused = true)]
async fn test_fetcher_panic_still_settles_and_later_ticks_fetch() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let attempts = calls.clone();
    let flaky = fetcher(move || {
        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("fetcher bug");
        }
        async move { Ok::<u32, FetchError>(1) }
    });
    let key = ResourceKey::from("overview");
    let _sub = scheduler
        .register(key.clone(), quiet(Duration::from_millis(100)), flaky)
        .await;

    let outcome = scheduler.revalidate(&key).await;
    assert!(matches!(
        outcome,
        Revalidation::Failed(FetchError::Network(_))
    ));
    assert!(!scheduler.is_fetching(&key).await);
    let entry = store.get(&key).await.unwrap();
    assert!(!entry.is_validating);
    assert!(matches!(entry.error, Some(FetchError::Network(_))));

    sleep(Duration::from_millis(150)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.get(&key).await.unwrap().data, Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_still_ticks() {
    let (store, scheduler) = setup();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = ResourceKey::from("charts");
    let _sub = scheduler
        .register(
            key.clone(),
            quiet(Duration::ZERO),
            scripted(&calls, Duration::ZERO, vec![Ok(5)]),
        )
        .await;

    sleep(Duration::from_millis(20)).await;
    assert!(calls.load(Ordering::SeqCst) >= 1);
    assert_eq!(store.get(&key).await.unwrap().data, Some(5));
}
