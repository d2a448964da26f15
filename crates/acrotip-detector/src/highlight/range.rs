//! Range-based highlighting: no structural change to the document.

use crate::dom::{Document, NodeId, TextLocation};
use crate::registry::Registry;

use super::{Caret, HighlightStrategy, RepaintReport, HIGHLIGHT_NAME};

/// Writes candidate spans into the document's named highlight registry.
#[derive(Debug, Default)]
pub struct RangeHighlighter;

impl RangeHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn paint(doc: &mut Document, registry: &Registry) -> usize {
        let ranges: Vec<TextLocation> = registry.iter().map(|c| c.location).collect();
        let painted = ranges.len();
        doc.set_highlight(HIGHLIGHT_NAME, ranges);
        painted
    }
}

impl HighlightStrategy for RangeHighlighter {
    fn name(&self) -> &'static str {
        "range"
    }

    fn repaint(&mut self, doc: &mut Document, registry: &mut Registry) -> RepaintReport {
        let pruned = registry.prune_detached(doc);
        let painted = Self::paint(doc, registry);
        RepaintReport { painted, pruned }
    }

    fn clear_term(
        &mut self,
        doc: &mut Document,
        registry: &mut Registry,
        term: &str,
    ) -> Vec<NodeId> {
        registry.remove_term(term);
        Self::paint(doc, registry);
        Vec::new()
    }

    fn teardown(&mut self, doc: &mut Document, registry: &mut Registry) {
        registry.clear();
        doc.remove_highlight(HIGHLIGHT_NAME);
    }

    fn term_at(&self, _doc: &Document, registry: &Registry, caret: Caret) -> Option<String> {
        registry
            .find_at(caret.node, caret.offset)
            .map(|c| c.term.clone())
    }
}
