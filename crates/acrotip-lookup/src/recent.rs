//! Most-recent-first lookup history in the local storage area.

use std::sync::Arc;

use tracing::warn;

use acrotip_protocols::{get_value, normalize_term, set_value, KeyValueStore};

pub const RECENT_LOOKUPS_KEY: &str = "recentLookups";

/// Maximum number of remembered terms.
pub const MAX_RECENT: usize = 20;

#[derive(Clone)]
pub struct RecentLookups {
    store: Arc<dyn KeyValueStore>,
}

impl RecentLookups {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Move `term` to the front, dropping any older occurrence and trimming
    /// the list. Storage failures are logged and ignored.
    pub async fn track(&self, term: &str) {
        let term = normalize_term(term);
        if term.is_empty() {
            return;
        }
        let mut recent = self.list().await;
        recent.retain(|t| *t != term);
        recent.insert(0, term);
        recent.truncate(MAX_RECENT);

        if let Err(e) = set_value(self.store.as_ref(), RECENT_LOOKUPS_KEY, &recent).await {
            warn!("Failed to save recent lookups: {}", e);
        }
    }

    pub async fn list(&self) -> Vec<String> {
        match get_value::<Vec<String>>(self.store.as_ref(), RECENT_LOOKUPS_KEY).await {
            Ok(recent) => recent.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to read recent lookups: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acrotip_cache::InMemoryStore;
    use acrotip_protocols::StorageArea;

    fn recent() -> RecentLookups {
        RecentLookups::new(Arc::new(InMemoryStore::new(StorageArea::Local)))
    }

    #[tokio::test]
    async fn test_most_recent_first() {
        let recent = recent();
        recent.track("XFN").await;
        recent.track("OKR").await;
        assert_eq!(recent.list().await, vec!["OKR".to_string(), "XFN".to_string()]);
    }

    #[tokio::test]
    async fn test_repeat_moves_to_front() {
        let recent = recent();
        recent.track("XFN").await;
        recent.track("OKR").await;
        recent.track("xfn").await;
        assert_eq!(recent.list().await, vec!["XFN".to_string(), "OKR".to_string()]);
    }

    #[tokio::test]
    async fn test_capped() {
        let recent = recent();
        for i in 0..25 {
            recent.track(&format!("T{}", i)).await;
        }
        let list = recent.list().await;
        assert_eq!(list.len(), MAX_RECENT);
        assert_eq!(list[0], "T24");
        assert_eq!(list[MAX_RECENT - 1], "T5");
    }

    #[tokio::test]
    async fn test_blank_ignored() {
        let recent = recent();
        recent.track("  ").await;
        assert!(recent.list().await.is_empty());
    }
}
