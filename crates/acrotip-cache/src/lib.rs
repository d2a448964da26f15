//! # acrotip cache
//!
//! Namespaced TTL cache with an optional in-process tier in front of a
//! durable [`KeyValueStore`](acrotip_protocols::KeyValueStore), plus an
//! in-memory store implementation used by tests and ephemeral sessions.

mod clock;
mod memory_store;
mod tiered;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory_store::InMemoryStore;
pub use tiered::{cache_key, CacheCategory, CacheEntry, CacheTtl, TieredCache, CACHE_BLOB_KEY};
