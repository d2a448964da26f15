//! Process-local key-value store.

use async_trait::async_trait;
use parking_lot::RwLock;

use acrotip_protocols::{KeyValueStore, StorageArea, StorageError, StorageMap};

/// A [`KeyValueStore`] held in process memory.
#[derive(Debug)]
pub struct InMemoryStore {
    area: StorageArea,
    entries: RwLock<StorageMap>,
}

impl InMemoryStore {
    pub fn new(area: StorageArea) -> Self {
        Self {
            area,
            entries: RwLock::new(StorageMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    fn area(&self) -> StorageArea {
        self.area
    }

    async fn get(&self, keys: &[&str]) -> Result<StorageMap, StorageError> {
        let entries = self.entries.read();
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: StorageMap) -> Result<(), StorageError> {
        self.entries.write().extend(items);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
