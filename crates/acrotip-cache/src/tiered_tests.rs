use super::*;
use crate::clock::ManualClock;
use crate::memory_store::InMemoryStore;
use acrotip_protocols::{StorageArea, StorageMap};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const HOUR: Duration = Duration::from_secs(60 * 60);

struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    fn area(&self) -> StorageArea {
        StorageArea::Local
    }

    async fn get(&self, _keys: &[&str]) -> Result<StorageMap, StorageError> {
        Err(StorageError::Backend("disk on fire".to_string()))
    }

    async fn set(&self, _items: StorageMap) -> Result<(), StorageError> {
        Err(StorageError::Backend("disk on fire".to_string()))
    }

    async fn remove(&self, _keys: &[&str]) -> Result<(), StorageError> {
        Err(StorageError::Backend("disk on fire".to_string()))
    }
}

/// Delegates to an in-memory store, failing reads or writes on demand.
struct FlakyStore {
    inner: InMemoryStore,
    failing_reads: AtomicUsize,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: InMemoryStore::new(StorageArea::Local),
            failing_reads: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    fn area(&self) -> StorageArea {
        StorageArea::Local
    }

    async fn get(&self, keys: &[&str]) -> Result<StorageMap, StorageError> {
        let failing = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StorageError::Backend("read timed out".to_string()));
        }
        self.inner.get(keys).await
    }

    async fn set(&self, items: StorageMap) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("quota exceeded".to_string()));
        }
        self.inner.set(items).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        self.inner.remove(keys).await
    }
}

fn cache_with_clock(memory_tier: bool) -> (TieredCache, Arc<InMemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(InMemoryStore::new(StorageArea::Local));
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let cache = TieredCache::new(store.clone())
        .with_clock(clock.clone())
        .with_memory_tier(memory_tier);
    (cache, store, clock)
}

#[test]
fn test_cache_key_format() {
    assert_eq!(cache_key(CacheCategory::Primary, "MAISA"), "primary:MAISA");
    assert_eq!(cache_key(CacheCategory::Ai, "TEA"), "ai:TEA");
}

#[test]
fn test_default_ttls() {
    let ttl = CacheTtl::default();
    assert_eq!(ttl.for_category(CacheCategory::Primary), 24 * HOUR);
    assert_eq!(ttl.for_category(CacheCategory::Ai), 4 * HOUR);
    assert_eq!(ttl.for_category(CacheCategory::Token), HOUR);
}

#[tokio::test]
async fn test_set_then_get() {
    let (cache, _, _) = cache_with_clock(true);
    cache
        .set("primary:XFN", json!(["cross functional"]), CacheCategory::Primary)
        .await;

    assert_eq!(cache.get("primary:XFN").await, Some(json!(["cross functional"])));
    assert!(cache.get("primary:OKR").await.is_none());
}

#[tokio::test]
async fn test_ai_entry_expires_after_four_hours() {
    let (cache, _, clock) = cache_with_clock(true);
    cache.set("ai:TEA", json!("Tea."), CacheCategory::Ai).await;

    clock.advance(4 * HOUR - Duration::from_millis(1));
    assert!(cache.get("ai:TEA").await.is_some());

    clock.advance(Duration::from_millis(2));
    assert!(cache.get("ai:TEA").await.is_none());
}

#[tokio::test]
async fn test_expired_entry_is_evicted_from_both_tiers() {
    let (cache, _, clock) = cache_with_clock(true);
    cache.set("ai:TEA", json!("Tea."), CacheCategory::Ai).await;
    cache.set("primary:XFN", json!([]), CacheCategory::Primary).await;
    assert_eq!(cache.durable_len().await, 2);

    clock.advance(5 * HOUR);
    assert!(cache.get("ai:TEA").await.is_none());

    assert_eq!(cache.durable_len().await, 1);
    assert_eq!(cache.memory_len(), 1);
}

#[tokio::test]
async fn test_durable_hit_backfills_memory() {
    let (cache, store, clock) = cache_with_clock(true);
    cache.set("primary:XFN", json!(["x"]), CacheCategory::Primary).await;

    let fresh = TieredCache::new(store).with_clock(clock);
    assert_eq!(fresh.memory_len(), 0);
    assert_eq!(fresh.get("primary:XFN").await, Some(json!(["x"])));
    assert_eq!(fresh.memory_len(), 1);
}

#[tokio::test]
async fn test_memory_tier_disabled_behaves_the_same() {
    let (cache, _, clock) = cache_with_clock(false);
    cache.set("ai:TEA", json!("Tea."), CacheCategory::Ai).await;
    assert_eq!(cache.get("ai:TEA").await, Some(json!("Tea.")));
    assert_eq!(cache.memory_len(), 0);

    clock.advance(5 * HOUR);
    assert!(cache.get("ai:TEA").await.is_none());
    assert_eq!(cache.durable_len().await, 0);
}

#[tokio::test]
async fn test_clear_drops_everything() {
    let (cache, store, _) = cache_with_clock(true);
    cache.set("primary:XFN", json!([]), CacheCategory::Primary).await;
    cache.set("ai:TEA", json!("Tea."), CacheCategory::Ai).await;

    cache.clear().await;
    assert!(cache.get("primary:XFN").await.is_none());
    assert!(cache.get("ai:TEA").await.is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_entries_share_one_blob() {
    let (cache, store, _) = cache_with_clock(false);
    cache.set("primary:A", json!(1), CacheCategory::Primary).await;
    cache.set("primary:B", json!(2), CacheCategory::Primary).await;

    assert_eq!(store.len(), 1);
    let blob = store.get(&[CACHE_BLOB_KEY]).await.unwrap();
    assert_eq!(blob[CACHE_BLOB_KEY].as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_storage_failure_reads_as_miss() {
    let cache = TieredCache::new(Arc::new(BrokenStore)).with_memory_tier(false);
    cache.set("primary:XFN", json!([]), CacheCategory::Primary).await;
    assert!(cache.get("primary:XFN").await.is_none());
    cache.clear().await;
}

#[tokio::test]
async fn test_failed_durable_write_leaves_memory_untouched() {
    let store = Arc::new(FlakyStore::new());
    let cache = TieredCache::new(store.clone());
    store.fail_writes(true);

    cache.set("primary:XFN", json!(["x"]), CacheCategory::Primary).await;
    assert_eq!(cache.memory_len(), 0);
    assert_eq!(cache.durable_len().await, 0);
    assert!(cache.get("primary:XFN").await.is_none());

    store.fail_writes(false);
    cache.set("primary:XFN", json!(["x"]), CacheCategory::Primary).await;
    assert_eq!(cache.memory_len(), 1);
    assert_eq!(cache.get("primary:XFN").await, Some(json!(["x"])));
}

#[tokio::test]
async fn test_unreadable_blob_is_not_overwritten() {
    let store = Arc::new(FlakyStore::new());
    let cache = TieredCache::new(store.clone()).with_memory_tier(false);
    cache.set("primary:A", json!(1), CacheCategory::Primary).await;
    cache.set("primary:B", json!(2), CacheCategory::Primary).await;

    store.fail_next_reads(1);
    cache.set("primary:C", json!(3), CacheCategory::Primary).await;

    assert_eq!(cache.durable_len().await, 2);
    assert_eq!(cache.get("primary:A").await, Some(json!(1)));
    assert_eq!(cache.get("primary:B").await, Some(json!(2)));
    assert!(cache.get("primary:C").await.is_none());
}
