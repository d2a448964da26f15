//! Marker-element highlighting.
//!
//! Each occurrence is wrapped in an inert inline element carrying the term.
//! The wrapping is done without recording mutations so the page's own
//! mutation watch does not see it.

use std::cmp::Reverse;

use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::error::DomError;
use crate::registry::{AcronymCandidate, Registry};

use super::{Caret, HighlightStrategy, RepaintReport, MARKER_TAG, MARKER_TERM_ATTR};

#[derive(Debug, Default)]
pub struct MarkerHighlighter;

impl MarkerHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn is_wrapped(doc: &Document, candidate: &AcronymCandidate) -> bool {
        let node = candidate.location.node;
        let Some(parent) = doc.parent(node) else {
            return false;
        };
        doc.tag(parent) == Some(MARKER_TAG)
            && doc.attribute(parent, MARKER_TERM_ATTR) == Some(candidate.term.as_str())
            && candidate.location.start == 0
            && doc.text(node).map(str::len).ok() == Some(candidate.location.end)
    }

    fn wrap(
        doc: &mut Document,
        registry: &mut Registry,
        node: NodeId,
        start: usize,
        end: usize,
        term: &str,
    ) -> Result<(), DomError> {
        let len = doc.text(node)?.len();
        if end > len {
            return Err(DomError::InvalidOffset { node, offset: end });
        }
        if end < len {
            doc.split_text(node, end)?;
        }
        let target = if start > 0 {
            doc.split_text(node, start)?
        } else {
            node
        };
        let parent = doc
            .parent(target)
            .ok_or_else(|| DomError::Hierarchy(format!("{} has no parent", target)))?;

        let marker = doc.create_element(MARKER_TAG);
        doc.set_attribute(marker, MARKER_TERM_ATTR, term)?;
        doc.insert_before(parent, marker, Some(target))?;
        doc.append_child(marker, target)?;

        if target != node {
            registry.rebind(node, start, target, start);
        }
        Ok(())
    }

    /// Move the marker's children into its parent and merge the text.
    fn unwrap(doc: &mut Document, marker: NodeId) -> Result<(NodeId, Vec<NodeId>), DomError> {
        let parent = doc
            .parent(marker)
            .ok_or_else(|| DomError::Hierarchy(format!("{} has no parent", marker)))?;
        for child in doc.children(marker).to_vec() {
            doc.insert_before(parent, child, Some(marker))?;
        }
        doc.remove(marker)?;
        let merged = doc.normalize(parent)?;
        Ok((parent, merged))
    }

    fn unwrap_all(
        doc: &mut Document,
        registry: &mut Registry,
        markers: Vec<NodeId>,
    ) -> Vec<NodeId> {
        let mut touched = Vec::new();
        doc.unobserved(|doc| {
            for marker in markers {
                match Self::unwrap(doc, marker) {
                    Ok((parent, merged)) => {
                        for node in merged {
                            registry.remove_node(node);
                        }
                        if !touched.contains(&parent) {
                            touched.push(parent);
                        }
                    }
                    Err(e) => debug!("Failed to unwrap marker {}: {}", marker, e),
                }
            }
        });
        touched
    }
}

impl HighlightStrategy for MarkerHighlighter {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn repaint(&mut self, doc: &mut Document, registry: &mut Registry) -> RepaintReport {
        let pruned = registry.prune_detached(doc);

        let mut pending: Vec<(NodeId, usize, usize, String)> = registry
            .iter()
            .filter(|c| !Self::is_wrapped(doc, c))
            .map(|c| {
                (
                    c.location.node,
                    c.location.start,
                    c.location.end,
                    c.term.clone(),
                )
            })
            .collect();
        // Later spans first so earlier offsets in the same node stay valid.
        pending.sort_by_key(|(node, start, _, _)| (*node, Reverse(*start)));

        doc.unobserved(|doc| {
            for (node, start, end, term) in pending {
                if let Err(e) = Self::wrap(doc, registry, node, start, end, &term) {
                    debug!("Failed to wrap {} in {}: {}", term, node, e);
                }
            }
        });

        RepaintReport {
            painted: registry.len(),
            pruned,
        }
    }

    fn clear_term(
        &mut self,
        doc: &mut Document,
        registry: &mut Registry,
        term: &str,
    ) -> Vec<NodeId> {
        registry.remove_term(term);
        let markers: Vec<NodeId> = doc
            .elements_by_tag(doc.body(), MARKER_TAG)
            .into_iter()
            .filter(|m| doc.attribute(*m, MARKER_TERM_ATTR) == Some(term))
            .collect();
        Self::unwrap_all(doc, registry, markers)
    }

    fn release(
        &mut self,
        doc: &mut Document,
        registry: &mut Registry,
        node: NodeId,
    ) -> Option<NodeId> {
        let marker = doc
            .parent(node)
            .filter(|parent| doc.tag(*parent) == Some(MARKER_TAG))?;
        registry.remove_node(node);
        Self::unwrap_all(doc, registry, vec![marker]).into_iter().next()
    }

    fn teardown(&mut self, doc: &mut Document, registry: &mut Registry) {
        let markers = doc.elements_by_tag(doc.body(), MARKER_TAG);
        Self::unwrap_all(doc, registry, markers);
        registry.clear();
    }

    fn term_at(&self, doc: &Document, registry: &Registry, caret: Caret) -> Option<String> {
        if let Some(candidate) = registry.find_at(caret.node, caret.offset) {
            return Some(candidate.term.clone());
        }
        let parent = doc.parent(caret.node)?;
        if doc.tag(parent)? != MARKER_TAG {
            return None;
        }
        doc.attribute(parent, MARKER_TERM_ATTR).map(str::to_string)
    }
}
