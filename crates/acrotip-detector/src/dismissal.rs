//! Persisted deny-list of dismissed terms.
//!
//! The set is loaded once and mirrored in process so the scanner can check
//! it synchronously. Updates write through to the sync storage area with a
//! read-modify-write: the single change is applied to the stored list and
//! the result replaces the mirror. When storage fails the mirror stays
//! authoritative for the session.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use acrotip_protocols::{get_value, normalize_term, set_value, KeyValueStore};

/// Storage key of the dismissed term list.
pub const DISMISSED_TERMS_KEY: &str = "dismissedTerms";

pub struct DismissalStore {
    store: Arc<dyn KeyValueStore>,
    mirror: HashSet<String>,
}

impl DismissalStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            mirror: HashSet::new(),
        }
    }

    /// Replace the mirror with the stored list. Keeps the current mirror if
    /// storage cannot be read.
    pub async fn load(&mut self) {
        match self.read_stored().await {
            Some(stored) => self.mirror = stored,
            None => warn!("Using in-memory dismissed terms only"),
        }
    }

    pub fn terms(&self) -> &HashSet<String> {
        &self.mirror
    }

    /// Terms in alphabetical order.
    pub fn sorted_terms(&self) -> Vec<String> {
        self.mirror
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_dismissed(&self, term: &str) -> bool {
        self.mirror.contains(term)
    }

    /// Add a term. Returns `false` if it was already dismissed.
    pub async fn dismiss(&mut self, term: &str) -> bool {
        let term = normalize_term(term);
        if term.is_empty() {
            return false;
        }
        let added = self.mirror.insert(term.clone());
        self.persist(|set| {
            set.insert(term.clone());
        })
        .await;
        info!("Dismissed term {}", term);
        added
    }

    /// Remove a term. Returns `false` if it was not dismissed.
    pub async fn re_enable(&mut self, term: &str) -> bool {
        let term = normalize_term(term);
        let removed = self.mirror.remove(&term);
        self.persist(|set| {
            set.remove(&term);
        })
        .await;
        info!("Re-enabled term {}", term);
        removed
    }

    async fn read_stored(&self) -> Option<HashSet<String>> {
        match get_value::<Vec<String>>(self.store.as_ref(), DISMISSED_TERMS_KEY).await {
            Ok(list) => Some(list.unwrap_or_default().into_iter().collect()),
            Err(e) => {
                warn!("Failed to read dismissed terms: {}", e);
                None
            }
        }
    }

    async fn persist(&mut self, apply: impl FnOnce(&mut HashSet<String>)) {
        // Stored list is authoritative when readable.
        let mut merged = match self.read_stored().await {
            Some(stored) => stored,
            None => self.mirror.clone(),
        };
        apply(&mut merged);
        self.mirror = merged;

        let list = self.sorted_terms();
        if let Err(e) = set_value(self.store.as_ref(), DISMISSED_TERMS_KEY, &list).await {
            warn!("Failed to save dismissed terms: {}", e);
        }
    }
}
