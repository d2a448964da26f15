//! Highlight strategies.
//!
//! A strategy paints the registry onto the document and recovers the term
//! under a caret. It is chosen once per page and the rest of the detector is
//! agnostic to which one is active.

mod marker;
mod range;

pub use marker::MarkerHighlighter;
pub use range::RangeHighlighter;

use crate::dom::{Document, NodeId};
use crate::registry::Registry;

/// Name of the document highlight holding acronym ranges.
pub const HIGHLIGHT_NAME: &str = "acrotip-acronym";

/// Tag of the inline element wrapping an acronym occurrence.
pub const MARKER_TAG: &str = "ACROTIP-MARK";

/// Attribute on the marker element carrying the term.
pub const MARKER_TERM_ATTR: &str = "data-term";

/// A caret position inside a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub node: NodeId,
    pub offset: usize,
}

impl Caret {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Result of a repaint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepaintReport {
    /// Candidates painted.
    pub painted: usize,
    /// Text nodes whose candidates were purged because they are detached.
    pub pruned: Vec<NodeId>,
}

pub trait HighlightStrategy: Send {
    fn name(&self) -> &'static str;

    /// Purge detached candidates and paint the live ones. Idempotent.
    fn repaint(&mut self, doc: &mut Document, registry: &mut Registry) -> RepaintReport;

    /// Remove every registry entry and highlight for `term`. Returns text
    /// nodes whose content changed and may hold other terms.
    fn clear_term(&mut self, doc: &mut Document, registry: &mut Registry, term: &str)
    -> Vec<NodeId>;

    /// Undo highlighting wrapped around a text node whose content changed.
    /// Returns an element to rescan in place of `node`.
    fn release(
        &mut self,
        _doc: &mut Document,
        _registry: &mut Registry,
        _node: NodeId,
    ) -> Option<NodeId> {
        None
    }

    /// Remove all highlighting from the document and forget every candidate.
    fn teardown(&mut self, doc: &mut Document, registry: &mut Registry);

    /// The term under a caret, if any.
    fn term_at(&self, doc: &Document, registry: &Registry, caret: Caret) -> Option<String>;
}
