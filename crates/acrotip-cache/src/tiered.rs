//! Two-tier TTL cache.
//!
//! Entries live in one namespaced blob under [`CACHE_BLOB_KEY`] in durable
//! storage. An optional in-process tier sits in front of it. Writes go to the
//! durable tier first and only then to memory, so the memory tier never holds
//! something durable storage has not seen. Expired entries are evicted from
//! both tiers when read.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use acrotip_protocols::{get_value, set_value, KeyValueStore, StorageError};

use crate::clock::{Clock, SystemClock};

/// Storage key of the durable cache blob.
pub const CACHE_BLOB_KEY: &str = "acrotip_cache";

#[cfg(test)]
#[path = "tiered_tests.rs"]
mod tests;

/// Lifetime class of a cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    /// Definitions from the primary source.
    Primary,
    /// AI-generated definitions.
    Ai,
    /// Short-lived auth tokens.
    Token,
}

impl CacheCategory {
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheCategory::Primary => "primary",
            CacheCategory::Ai => "ai",
            CacheCategory::Token => "token",
        }
    }
}

/// `category:TERM`.
pub fn cache_key(category: CacheCategory, term: &str) -> String {
    format!("{}:{}", category.prefix(), term)
}

/// Per-category time to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    pub primary: Duration,
    pub ai: Duration,
    pub token: Duration,
}

impl CacheTtl {
    pub fn from_hours(primary: u64, ai: u64, token: u64) -> Self {
        const HOUR: u64 = 60 * 60;
        Self {
            primary: Duration::from_secs(primary * HOUR),
            ai: Duration::from_secs(ai * HOUR),
            token: Duration::from_secs(token * HOUR),
        }
    }

    pub fn for_category(&self, category: CacheCategory) -> Duration {
        match category {
            CacheCategory::Primary => self.primary,
            CacheCategory::Ai => self.ai,
            CacheCategory::Token => self.token,
        }
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self::from_hours(24, 4, 1)
    }
}

/// A cached value and its absolute expiry in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: Value,
    pub expiry: i64,
}

impl CacheEntry {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis > self.expiry
    }
}

type CacheBlob = HashMap<String, CacheEntry>;

/// TTL cache over durable storage with an optional in-process tier.
pub struct TieredCache {
    store: Arc<dyn KeyValueStore>,
    memory: Option<DashMap<String, CacheEntry>>,
    ttl: CacheTtl,
    clock: Arc<dyn Clock>,
}

impl TieredCache {
    /// Create a cache with the memory tier enabled and the system clock.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            memory: Some(DashMap::new()),
            ttl: CacheTtl::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ttl(mut self, ttl: CacheTtl) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Enable or disable the in-process tier.
    pub fn with_memory_tier(mut self, enabled: bool) -> Self {
        self.memory = enabled.then(DashMap::new);
        self
    }

    /// Fetch a live entry, evicting it from both tiers if it has expired.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now_millis();

        if let Some(memory) = &self.memory {
            let hit = memory.get(key).map(|entry| entry.clone());
            match hit {
                Some(entry) if !entry.is_expired(now) => {
                    debug!("Cache hit (memory): {}", key);
                    return Some(entry.value);
                }
                Some(_) => {
                    memory.remove(key);
                }
                None => {}
            }
        }

        let mut blob = self.load_blob().await?;
        let entry = blob.get(key)?.clone();
        if entry.is_expired(now) {
            debug!("Cache entry expired: {}", key);
            blob.remove(key);
            self.store_blob(&blob).await;
            return None;
        }

        debug!("Cache hit (durable): {}", key);
        if let Some(memory) = &self.memory {
            memory.insert(key.to_string(), entry.clone());
        }
        Some(entry.value)
    }

    /// Store a value with the lifetime of its category.
    pub async fn set(&self, key: &str, value: Value, category: CacheCategory) {
        let ttl = self.ttl.for_category(category).as_millis() as i64;
        let entry = CacheEntry {
            value,
            expiry: self.clock.now_millis().saturating_add(ttl),
        };

        // A blob that could not be read is never written back.
        let Some(mut blob) = self.load_blob().await else {
            warn!("Skipping cache write for {}", key);
            return;
        };
        blob.insert(key.to_string(), entry.clone());
        if !self.store_blob(&blob).await {
            return;
        }

        if let Some(memory) = &self.memory {
            memory.insert(key.to_string(), entry);
        }
    }

    /// Drop every entry from both tiers.
    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(&[CACHE_BLOB_KEY]).await {
            warn!("Failed to clear durable cache: {}", e);
        }
        if let Some(memory) = &self.memory {
            memory.clear();
        }
    }

    /// Number of entries currently in the durable blob, expired or not.
    pub async fn durable_len(&self) -> usize {
        self.load_blob().await.map(|blob| blob.len()).unwrap_or(0)
    }

    /// Number of entries in the memory tier.
    pub fn memory_len(&self) -> usize {
        self.memory.as_ref().map(DashMap::len).unwrap_or(0)
    }

    async fn load_blob(&self) -> Option<CacheBlob> {
        let loaded: Result<Option<CacheBlob>, StorageError> =
            get_value(self.store.as_ref(), CACHE_BLOB_KEY).await;
        match loaded {
            Ok(blob) => Some(blob.unwrap_or_default()),
            Err(e) => {
                warn!("Failed to read durable cache: {}", e);
                None
            }
        }
    }

    async fn store_blob(&self, blob: &CacheBlob) -> bool {
        match set_value(self.store.as_ref(), CACHE_BLOB_KEY, blob).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write durable cache: {}", e);
                false
            }
        }
    }
}
