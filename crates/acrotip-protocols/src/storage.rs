//! Durable key-value storage protocol.
//!
//! Mirrors the browser extension storage model: independent areas, each an
//! async map of JSON values. Writes are last-writer-wins.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StorageError;

/// A batch of stored values keyed by name.
pub type StorageMap = HashMap<String, Value>;

/// Storage namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Small user preferences shared across sessions (dismissed terms, credential).
    Sync,
    /// Larger machine-local data (cache blob, recent lookups).
    Local,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Sync => "sync",
            StorageArea::Local => "local",
        }
    }
}

/// Core trait for durable key-value stores.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// The area this store serves.
    fn area(&self) -> StorageArea;

    /// Fetch the given keys. Missing keys are absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<StorageMap, StorageError>;

    /// Insert or replace the given entries.
    async fn set(&self, items: StorageMap) -> Result<(), StorageError>;

    /// Remove the given keys.
    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Read and deserialize a single key.
pub async fn get_value<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let mut values = store.get(&[key]).await?;
    match values.remove(key) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

/// Serialize and write a single key.
pub async fn set_value<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let mut items = StorageMap::new();
    items.insert(key.to_string(), serde_json::to_value(value)?);
    store.set(items).await
}
