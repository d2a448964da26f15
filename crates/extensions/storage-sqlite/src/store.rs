//! SQLite key-value store implementation.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::debug;

use acrotip_protocols::error::StorageError;
use acrotip_protocols::storage::{KeyValueStore, StorageArea, StorageMap};

use crate::schema::init_schema;

/// One storage area inside a SQLite database.
///
/// Values are stored as JSON text. Handles for different areas share the
/// same connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Connection,
    area: StorageArea,
}

impl SqliteStore {
    /// Create a new in-memory database serving the local area.
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open or create a file-backed database serving the local area.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(path)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(Self {
            conn,
            area: StorageArea::Local,
        })
    }

    /// A handle on another area of the same database.
    pub fn for_area(&self, area: StorageArea) -> Self {
        Self {
            conn: self.conn.clone(),
            area,
        }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn area(&self) -> StorageArea {
        self.area
    }

    async fn get(&self, keys: &[&str]) -> Result<StorageMap, StorageError> {
        let area = self.area.as_str();
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();

        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM kv WHERE area = ?1 AND key = ?2")?;
                let mut rows = Vec::with_capacity(keys.len());
                for key in keys {
                    let value: Option<String> = stmt
                        .query_row(params![area, key], |row| row.get(0))
                        .optional()?;
                    if let Some(value) = value {
                        rows.push((key, value));
                    }
                }
                Ok(rows)
            })
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let mut map = StorageMap::new();
        for (key, raw) in rows {
            map.insert(key, serde_json::from_str(&raw)?);
        }
        Ok(map)
    }

    async fn set(&self, items: StorageMap) -> Result<(), StorageError> {
        let area = self.area.as_str();
        let now = Utc::now().to_rfc3339();
        let mut encoded = Vec::with_capacity(items.len());
        for (key, value) in items {
            encoded.push((key, serde_json::to_string(&value)?));
        }
        let count = encoded.len();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (key, value) in &encoded {
                    tx.execute(
                        "INSERT INTO kv (area, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                         ON CONFLICT(area, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                        params![area, key, value, now],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        debug!("Stored {} keys in {} area", count, area);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let area = self.area.as_str();
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for key in &keys {
                    tx.execute("DELETE FROM kv WHERE area = ?1 AND key = ?2", params![area, key])?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
