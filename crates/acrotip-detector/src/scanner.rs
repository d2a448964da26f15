//! Page scanner.
//!
//! Walks text nodes under a subtree in document order, classifies every
//! all-caps token and registers the accepted, non-dismissed ones. Each text
//! node is processed at most once until it changes or a full rescan resets
//! the memo.

use std::collections::HashSet;

use tracing::debug;

use crate::classifier::Classifier;
use crate::dom::{Document, NodeId, TextLocation};
use crate::error::DomError;
use crate::highlight::{MARKER_TAG, MARKER_TERM_ATTR};
use crate::registry::{AcronymCandidate, Registry};

/// Elements whose subtrees are never scanned.
pub const SKIP_TAGS: &[&str] = &[
    "SCRIPT", "STYLE", "CODE", "PRE", "INPUT", "TEXTAREA", "SELECT", "BUTTON", "SVG", "CANVAS",
    "IFRAME", "NOSCRIPT", "KBD", "SAMP",
];

/// Outcome of one scan call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Text nodes examined (not skipped by the memo).
    pub visited: usize,
    /// Candidates newly added to the registry.
    pub registered: usize,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.visited += other.visited;
        self.registered += other.registered;
    }
}

pub struct Scanner {
    classifier: Classifier,
    processed: HashSet<NodeId>,
}

impl Scanner {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            processed: HashSet::new(),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn is_processed(&self, node: NodeId) -> bool {
        self.processed.contains(&node)
    }

    /// Forget `node` and every text node under it so it is scanned again.
    /// Their candidates are replaced on that scan.
    pub fn forget(&mut self, doc: &Document, node: NodeId) {
        self.processed.remove(&node);
        for text in doc.text_nodes(node) {
            self.processed.remove(&text);
        }
    }

    /// Reset the processed memo.
    pub fn reset(&mut self) {
        self.processed.clear();
    }

    /// Scan the subtree rooted at `root`.
    pub fn scan(
        &mut self,
        doc: &Document,
        root: NodeId,
        registry: &mut Registry,
        dismissed: &HashSet<String>,
    ) -> ScanReport {
        let mut report = ScanReport::default();
        if !doc.is_connected(root) || in_skipped_region(doc, root) {
            return report;
        }
        self.walk(doc, root, registry, dismissed, &mut report);
        report
    }

    /// Reset the memo and the registry, then scan the whole body.
    pub fn rescan_all(
        &mut self,
        doc: &Document,
        registry: &mut Registry,
        dismissed: &HashSet<String>,
    ) -> ScanReport {
        self.reset();
        registry.clear();
        self.scan(doc, doc.body(), registry, dismissed)
    }

    fn walk(
        &mut self,
        doc: &Document,
        root: NodeId,
        registry: &mut Registry,
        dismissed: &HashSet<String>,
        report: &mut ScanReport,
    ) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if doc.is_text(node) {
                if self.processed.contains(&node) {
                    continue;
                }
                match self.process_text(doc, node, registry, dismissed) {
                    Ok(found) => report.merge(ScanReport {
                        visited: 1,
                        registered: found,
                    }),
                    Err(e) => debug!("Skipping text node {}: {}", node, e),
                }
                self.processed.insert(node);
                continue;
            }

            if is_skipped_element(doc, node) {
                continue;
            }
            stack.extend(doc.children(node).iter().rev());
        }
    }

    fn process_text(
        &self,
        doc: &Document,
        node: NodeId,
        registry: &mut Registry,
        dismissed: &HashSet<String>,
    ) -> Result<usize, DomError> {
        let text = doc.text(node)?;
        // Candidates always reflect the node's current text.
        registry.remove_node(node);

        if let Some(term) = marker_term(doc, node) {
            if dismissed.contains(term) || text.is_empty() {
                return Ok(0);
            }
            let location = TextLocation::new(node, 0, text.len());
            return Ok(usize::from(
                registry.insert(AcronymCandidate::new(term, location)),
            ));
        }

        if text.trim().len() < 2 {
            return Ok(0);
        }
        let uppercase = doc.computed_text_transform(node).as_deref() == Some("uppercase");

        let mut registered = 0;
        for found in self.classifier.find_acronyms(text, uppercase) {
            if dismissed.contains(&found.term) {
                continue;
            }
            let location = TextLocation::new(node, found.start, found.end);
            if registry.insert(AcronymCandidate::new(found.term, location)) {
                registered += 1;
            }
        }
        Ok(registered)
    }
}

/// The `data-term` of the marker element directly wrapping `node`.
fn marker_term(doc: &Document, node: NodeId) -> Option<&str> {
    let parent = doc.parent(node)?;
    if doc.tag(parent)? != MARKER_TAG {
        return None;
    }
    doc.attribute(parent, MARKER_TERM_ATTR)
}

fn is_skipped_element(doc: &Document, node: NodeId) -> bool {
    let Some(tag) = doc.tag(node) else {
        return false;
    };
    if SKIP_TAGS.contains(&tag) {
        return true;
    }
    doc.attribute(node, "contenteditable")
        .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
}

fn in_skipped_region(doc: &Document, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if is_skipped_element(doc, n) {
            return true;
        }
        current = doc.parent(n);
    }
    false
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
