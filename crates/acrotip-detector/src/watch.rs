//! Mutation watch pipeline.
//!
//! Observation and scan execution are separate stages. [`MutationWatch::observe`]
//! queues mutation records and restarts the debounce window; the driver asks
//! for the [`MutationWatch::deadline`] and takes the [`ScanJob`] once it is due.

use std::time::Duration;

use tokio::time::Instant;

use crate::dom::{MutationRecord, NodeId};

/// Where the watch is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No pending records.
    Watching,
    /// Records queued, waiting for the window to close.
    Debouncing,
}

/// Work accumulated over one debounce window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanJob {
    /// Roots of subtrees added to the document.
    pub added: Vec<NodeId>,
    /// Text nodes whose content changed.
    pub changed: Vec<NodeId>,
    /// Nodes removed from the document.
    pub removed: Vec<NodeId>,
}

impl ScanJob {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// Nodes to scan: additions then content changes, without duplicates.
    pub fn scan_roots(&self) -> Vec<NodeId> {
        let mut roots = Vec::with_capacity(self.added.len() + self.changed.len());
        for node in self.added.iter().chain(&self.changed) {
            if !roots.contains(node) {
                roots.push(*node);
            }
        }
        roots
    }
}

#[derive(Debug)]
pub struct MutationWatch {
    debounce: Duration,
    pending: ScanJob,
    deadline: Option<Instant>,
}

impl MutationWatch {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: ScanJob::default(),
            deadline: None,
        }
    }

    pub fn state(&self) -> WatchState {
        if self.deadline.is_some() {
            WatchState::Debouncing
        } else {
            WatchState::Watching
        }
    }

    /// Queue a batch of records. Every non-empty batch restarts the window.
    pub fn observe(&mut self, records: Vec<MutationRecord>, now: Instant) {
        if records.is_empty() {
            return;
        }
        for record in records {
            match record {
                MutationRecord::ChildList { added, removed, .. } => {
                    push_unique(&mut self.pending.added, added);
                    push_unique(&mut self.pending.removed, removed);
                }
                MutationRecord::CharacterData { target } => {
                    push_unique(&mut self.pending.changed, [target]);
                }
            }
        }
        self.deadline = Some(now + self.debounce);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Take the accumulated job if the window has closed.
    pub fn take_job(&mut self, now: Instant) -> Option<ScanJob> {
        if !self.is_due(now) {
            return None;
        }
        self.deadline = None;
        Some(std::mem::take(&mut self.pending))
    }

    /// Drop anything queued.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending = ScanJob::default();
    }
}

fn push_unique(into: &mut Vec<NodeId>, nodes: impl IntoIterator<Item = NodeId>) {
    for node in nodes {
        if !into.contains(&node) {
            into.push(node);
        }
    }
}
