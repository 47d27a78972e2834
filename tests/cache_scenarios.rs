//! Scenario tests for the cache layer through its public API.
//!
//! Time is driven by `ManualClock` so each step happens at an exact offset.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashboard_cache::cache::{CacheController, CacheStatus, CacheUtils, ManualClock};
use dashboard_cache::{FileStore, KeyValueStore, MemoryStore};

const TTL: u64 = 180_000;

fn setup() -> (Arc<MemoryStore>, Arc<ManualClock>, CacheUtils) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(0));
    let utils = CacheUtils::new(store.clone(), clock.clone());
    (store, clock, utils)
}

#[test]
fn test_users_list_expires_after_ttl() {
    let (store, clock, utils) = setup();

    utils.set("users_list", &"A");

    clock.set(120_000);
    assert_eq!(utils.get::<String>("users_list", Some(TTL)), Some("A".to_string()));

    clock.set(240_000);
    assert_eq!(utils.get::<String>("users_list", Some(TTL)), None);

    // Stale, not evicted
    assert!(store.get("users_list").unwrap().is_some());
}

#[tokio::test]
async fn test_second_controller_adopts_persisted_entry() {
    let (_, clock, utils) = setup();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = CacheController::new("stats", utils.clone(), TTL, String::new());
    let c = calls.clone();
    first
        .load_data(
            move || async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>("S".to_string())
            },
            false,
        )
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    clock.set(60_000);
    let second = CacheController::new("stats", utils, TTL, String::new());
    assert!(second.last_load_time().is_none());

    let c = calls.clone();
    let data = second
        .load_data(
            move || async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>("fetched".to_string())
            },
            false,
        )
        .await
        .unwrap();

    assert_eq!(data, "S");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.last_load_time(), Some(60_000));
}

#[tokio::test]
async fn test_instances_on_same_key_can_disagree() {
    let (_, clock, utils) = setup();

    let list_page = CacheController::new("families", utils.clone(), TTL, 0u32);
    let sidebar = CacheController::new("families", utils.clone(), TTL, 0u32);

    list_page
        .load_data(|| async { Ok::<_, anyhow::Error>(10u32) }, false)
        .await
        .unwrap();

    clock.set(1_000);
    sidebar
        .refresh_data(|| async { Ok::<_, anyhow::Error>(11u32) })
        .await
        .unwrap();

    // The list page still serves its recent in-memory copy
    clock.set(2_000);
    let shown = list_page
        .load_data(|| async { Ok::<_, anyhow::Error>(99u32) }, false)
        .await
        .unwrap();

    assert_eq!(shown, 10);
    assert_eq!(utils.get::<u32>("families", Some(TTL)), Some(11));
}

#[test]
fn test_clear_cache_leaves_controller_data() {
    let (_, _, utils) = setup();
    let controller = CacheController::new("news", utils.clone(), TTL, vec!["seed".to_string()]);
    controller.update_data(vec!["story".to_string()]);

    controller.clear_cache();

    assert_eq!(utils.get::<Vec<String>>("news", None), None);
    assert_eq!(controller.data(), vec!["story".to_string()]);
    assert_eq!(controller.status(), CacheStatus::Ready);
}

#[test]
fn test_clear_all_keeps_unsuffixed_value_record() {
    let (store, _, utils) = setup();
    store.set("profile", r#"{"name":"admin"}"#).unwrap();
    store.set("profile_timestamp", "0").unwrap();

    let removed = utils.clear_all();

    assert_eq!(removed, 1);
    assert!(store.get("profile_timestamp").unwrap().is_none());
    assert_eq!(
        store.get("profile").unwrap(),
        Some(r#"{"name":"admin"}"#.to_string())
    );
}

#[test]
fn test_controller_seeds_from_file_store_after_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let clock = Arc::new(ManualClock::new(0));

    {
        let store = Arc::new(FileStore::open(&path).unwrap());
        let utils = CacheUtils::new(store, clock.clone());
        let controller = CacheController::new("complaints", utils, TTL, Vec::<u32>::new());
        controller.update_data(vec![1, 2, 3]);
    }

    clock.set(30_000);
    let store = Arc::new(FileStore::open(&path).unwrap());
    let utils = CacheUtils::new(store, clock);
    let controller = CacheController::new("complaints", utils, TTL, Vec::<u32>::new());

    assert_eq!(controller.data(), vec![1, 2, 3]);
    assert_eq!(controller.status(), CacheStatus::Ready);
}
