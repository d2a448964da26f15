//! Registry of live acronym candidates.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId, TextLocation};

/// One detected acronym occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcronymCandidate {
    pub term: String,
    pub location: TextLocation,
    pub discovered_at: DateTime<Utc>,
}

impl AcronymCandidate {
    pub fn new(term: impl Into<String>, location: TextLocation) -> Self {
        Self {
            term: term.into(),
            location,
            discovered_at: Utc::now(),
        }
    }
}

/// Candidates ordered by `(text node, start offset)`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<(NodeId, usize), AcronymCandidate>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate. Returns `false` if its position is already taken.
    pub fn insert(&mut self, candidate: AcronymCandidate) -> bool {
        let key = (candidate.location.node, candidate.location.start);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, candidate);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AcronymCandidate> {
        self.entries.values()
    }

    /// Candidates backed by `node`, in offset order.
    pub fn in_node(&self, node: NodeId) -> impl Iterator<Item = &AcronymCandidate> {
        self.entries
            .range((node, 0)..=(node, usize::MAX))
            .map(|(_, c)| c)
    }

    /// Candidate under a caret position, both span ends inclusive.
    pub fn find_at(&self, node: NodeId, offset: usize) -> Option<&AcronymCandidate> {
        self.in_node(node)
            .find(|c| c.location.contains_caret(node, offset))
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.entries.values().any(|c| c.term == term)
    }

    /// Distinct terms in document order of first occurrence.
    pub fn terms(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for candidate in self.entries.values() {
            if !seen.contains(&candidate.term) {
                seen.push(candidate.term.clone());
            }
        }
        seen
    }

    /// Drop every candidate for `term`. Returns the removed candidates.
    pub fn remove_term(&mut self, term: &str) -> Vec<AcronymCandidate> {
        let keys: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, c)| c.term == term)
            .map(|(k, _)| *k)
            .collect();
        keys.into_iter()
            .filter_map(|k| self.entries.remove(&k))
            .collect()
    }

    /// Drop every candidate backed by `node`.
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(n, _), _| *n != node);
        before - self.entries.len()
    }

    /// Drop candidates whose node is no longer attached. Returns the nodes
    /// that went stale.
    pub fn prune_detached(&mut self, doc: &Document) -> Vec<NodeId> {
        let mut stale = Vec::new();
        self.entries.retain(|(node, _), _| {
            let live = doc.is_connected(*node);
            if !live && !stale.contains(node) {
                stale.push(*node);
            }
            live
        });
        stale
    }

    /// Move every candidate from `from` onto `to`, shifting offsets by
    /// `-shift`. Used when a text node is split around a candidate.
    pub fn rebind(&mut self, from: NodeId, start: usize, to: NodeId, shift: usize) -> bool {
        let Some(mut candidate) = self.entries.remove(&(from, start)) else {
            return false;
        };
        candidate.location = TextLocation::new(
            to,
            candidate.location.start - shift,
            candidate.location.end - shift,
        );
        self.insert(candidate)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
