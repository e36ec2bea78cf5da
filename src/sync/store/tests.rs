use chrono::Utc;

use super::*;
use crate::sync::FetchError;

fn key(name: &str) -> ResourceKey {
    ResourceKey::from(name)
}

#[tokio::test]
async fn test_get_unknown_key_is_none() {
    let store = Store::<u32>::spawn(Log::mock());
    assert_eq!(store.get(&key("overview")).await, None);
    assert!(store.keys().await.is_empty());
}

#[tokio::test]
async fn test_set_merges_patches() {
    let store = Store::spawn(Log::mock());
    let overview = key("overview");

    let entry = store.set(&overview, EntryPatch::validating()).await;
    assert!(entry.is_validating);
    assert_eq!(entry.status(), EntryStatus::Loading);

    let at = Utc::now();
    store.set(&overview, EntryPatch::success(1u32, at)).await;
    store
        .set(&overview, EntryPatch::failure(FetchError::Http { status: 500 }))
        .await;

    let entry = store.get(&overview).await.unwrap();
    assert_eq!(entry.data, Some(1));
    assert_eq!(entry.fetched_at, Some(at));
    assert_eq!(entry.error, Some(FetchError::Http { status: 500 }));
    assert_eq!(store.keys().await, vec![overview]);
}

#[tokio::test]
async fn test_listeners_notified_in_order_before_reply() {
    let store = Store::spawn(Log::mock());
    let charts = key("charts");
    let (first, mut first_rx) = store.listen(&charts).await;
    let (_, mut second_rx) = store.listen(&charts).await;
    let (_, mut other_rx) = store.listen(&key("overview")).await;

    store.set(&charts, EntryPatch::success(5u32, Utc::now())).await;

    // both updates are already queued when set returns
    let update = first_rx.try_recv().unwrap();
    assert_eq!(update.key, charts);
    assert_eq!(update.entry.data, Some(5));
    assert_eq!(second_rx.try_recv().unwrap().entry.data, Some(5));
    assert!(other_rx.try_recv().is_err());

    store.unsubscribe(first).await;
    store.set(&charts, EntryPatch::validating()).await;
    assert!(first_rx.try_recv().is_err());
    assert!(second_rx.try_recv().unwrap().entry.is_validating);
}

#[tokio::test]
async fn test_dropped_listener_is_pruned() {
    let store = Store::spawn(Log::mock());
    let activities = key("activities?limit=20");
    let (_, rx) = store.listen(&activities).await;
    drop(rx);

    store.set(&activities, EntryPatch::validating()).await;
    let entry = store
        .set(&activities, EntryPatch::success(vec![1u8], Utc::now()))
        .await;
    assert_eq!(entry.data, Some(vec![1]));
}

#[tokio::test]
async fn test_snapshot_contains_all_entries() {
    let store = Store::spawn(Log::mock());
    store.set(&key("a"), EntryPatch::success(1u32, Utc::now())).await;
    store.set(&key("b"), EntryPatch::validating()).await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[&key("a")].data, Some(1));
    assert!(snapshot[&key("b")].is_validating);
}
