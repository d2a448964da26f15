//! Scanner, watch and highlight strategies working together.

use std::collections::HashSet;
use std::time::Duration;

use acrotip_detector::{
    Caret, Classifier, Document, HighlightStrategy, MarkerHighlighter, MutationWatch,
    RangeHighlighter, Registry, Scanner, NodeSpec,
};
use tokio::time::Instant;

struct Page {
    doc: Document,
    registry: Registry,
    scanner: Scanner,
    watch: MutationWatch,
    strategy: Box<dyn HighlightStrategy>,
    dismissed: HashSet<String>,
}

impl Page {
    fn new(text: &str, strategy: Box<dyn HighlightStrategy>) -> Self {
        let mut page = Self {
            doc: Document::from_plain_text(text),
            registry: Registry::new(),
            scanner: Scanner::new(Classifier::default()),
            watch: MutationWatch::new(Duration::from_millis(100)),
            strategy,
            dismissed: HashSet::new(),
        };
        let body = page.doc.body();
        page.scanner
            .scan(&page.doc, body, &mut page.registry, &page.dismissed);
        page.strategy.repaint(&mut page.doc, &mut page.registry);
        page
    }

    fn flush(&mut self, now: Instant) {
        let records = self.doc.take_mutations();
        self.watch.observe(records, now);
        let job = self
            .watch
            .take_job(now + Duration::from_millis(100))
            .expect("job due");
        let mut roots = job.scan_roots();
        for node in &job.removed {
            for text in self.doc.text_nodes(*node) {
                self.registry.remove_node(text);
            }
            self.scanner.forget(&self.doc, *node);
        }
        for node in &job.changed {
            self.scanner.forget(&self.doc, *node);
            if let Some(root) = self
                .strategy
                .release(&mut self.doc, &mut self.registry, *node)
            {
                self.scanner.forget(&self.doc, root);
                roots.push(root);
            }
        }
        for root in roots {
            self.scanner
                .scan(&self.doc, root, &mut self.registry, &self.dismissed);
        }
        let report = self.strategy.repaint(&mut self.doc, &mut self.registry);
        for node in report.pruned {
            self.scanner.forget(&self.doc, node);
        }
    }

    fn dismiss(&mut self, term: &str) {
        self.dismissed.insert(term.to_string());
        let touched = self
            .strategy
            .clear_term(&mut self.doc, &mut self.registry, term);
        for node in touched {
            self.scanner.forget(&self.doc, node);
            self.scanner
                .scan(&self.doc, node, &mut self.registry, &self.dismissed);
        }
        self.strategy.repaint(&mut self.doc, &mut self.registry);
    }

    fn live_terms(&self) -> Vec<String> {
        self.registry.terms()
    }

    fn sorted_terms(&self) -> Vec<String> {
        let mut terms = self.registry.terms();
        terms.sort();
        terms
    }

    /// Rewrite the first occurrence of `from` in the text node backing it.
    fn edit_term(&mut self, from: &str, to: &str) {
        let node = self
            .registry
            .iter()
            .find(|c| c.term == from)
            .map(|c| c.location.node)
            .expect("candidate for term");
        let text = self.doc.text(node).unwrap().replacen(from, to, 1);
        self.doc.set_text(node, &text).unwrap();
    }

    fn assert_registry_matches_text(&self) {
        for candidate in self.registry.iter() {
            let text = self.doc.text(candidate.location.node).unwrap();
            assert_eq!(
                &text[candidate.location.start..candidate.location.end],
                candidate.term
            );
        }
    }
}

fn strategies() -> Vec<Box<dyn HighlightStrategy>> {
    vec![
        Box::new(RangeHighlighter::new()),
        Box::new(MarkerHighlighter::new()),
    ]
}

const TEXT: &str = "The XFN team owns the rollout.\n\nOur OKR review covers XFN goals.";

#[test]
fn test_added_content_is_scanned_after_debounce() {
    for strategy in strategies() {
        let mut page = Page::new(TEXT, strategy);
        assert_eq!(page.live_terms(), vec!["XFN".to_string(), "OKR".to_string()]);

        let body = page.doc.body();
        page.doc
            .build_into(
                body,
                &NodeSpec::Element {
                    tag: "p".to_string(),
                    attrs: Default::default(),
                    children: vec![NodeSpec::Text("Check the SLA first.".to_string())],
                },
            )
            .unwrap();
        page.flush(Instant::now());

        assert!(page.live_terms().contains(&"SLA".to_string()));
    }
}

#[test]
fn test_removed_content_is_pruned() {
    for strategy in strategies() {
        let mut page = Page::new(TEXT, strategy);
        let first = page.doc.children(page.doc.body())[0];
        page.doc.remove(first).unwrap();
        page.flush(Instant::now());

        assert!(page
            .registry
            .iter()
            .all(|c| page.doc.is_connected(c.location.node)));
        assert_eq!(page.registry.len(), 2);
    }
}

#[test]
fn test_character_data_change_is_rescanned() {
    for strategy in strategies() {
        let mut page = Page::new("nothing to see here", strategy);
        let node = page.doc.text_nodes(page.doc.body())[0];
        page.doc.set_text(node, "now the CRM is live").unwrap();
        page.flush(Instant::now());

        assert_eq!(page.live_terms(), vec!["CRM".to_string()]);
    }
}

#[test]
fn test_editing_an_acronym_replaces_its_candidate() {
    for strategy in strategies() {
        let mut page = Page::new(TEXT, strategy);
        page.edit_term("XFN", "SRE");
        page.flush(Instant::now());

        assert_eq!(
            page.sorted_terms(),
            vec!["OKR".to_string(), "SRE".to_string(), "XFN".to_string()]
        );
        assert_eq!(page.registry.iter().filter(|c| c.term == "XFN").count(), 1);
        page.assert_registry_matches_text();
        assert!(page.doc.text_content(page.doc.body()).contains("The SRE team"));

        page.edit_term("SRE", "sre");
        page.flush(Instant::now());

        assert_eq!(page.sorted_terms(), vec!["OKR".to_string(), "XFN".to_string()]);
        page.assert_registry_matches_text();
    }
}

#[test]
fn test_deeply_nested_text_is_scanned() {
    let mut doc = Document::new();
    let mut top = doc.create_text("The XFN team");
    for _ in 0..100_000 {
        let div = doc.create_element("div");
        doc.append_child(div, top).unwrap();
        top = div;
    }
    let body = doc.body();
    doc.append_child(body, top).unwrap();

    let mut scanner = Scanner::new(Classifier::default());
    let mut registry = Registry::new();
    let report = scanner.scan(&doc, doc.body(), &mut registry, &HashSet::new());
    assert_eq!(report.visited, 1);
    assert!(registry.contains_term("XFN"));
}

#[test]
fn test_dismissed_term_never_survives_repaint() {
    for strategy in strategies() {
        let mut page = Page::new(TEXT, strategy);
        page.dismiss("XFN");
        assert_eq!(page.live_terms(), vec!["OKR".to_string()]);

        let body = page.doc.body();
        page.doc
            .build_into(body, &NodeSpec::Text("Another XFN mention".to_string()))
            .unwrap();
        page.flush(Instant::now());
        assert!(!page.live_terms().contains(&"XFN".to_string()));

        // Re-enabling rescans everything.
        page.dismissed.clear();
        page.scanner
            .rescan_all(&page.doc, &mut page.registry, &page.dismissed);
        page.strategy.repaint(&mut page.doc, &mut page.registry);
        assert!(page.live_terms().contains(&"XFN".to_string()));
    }
}

#[test]
fn test_repaint_twice_is_stable() {
    for strategy in strategies() {
        let mut page = Page::new(TEXT, strategy);
        let before: Vec<_> = page.registry.iter().cloned().collect();
        let text_before = page.doc.text_content(page.doc.body());
        page.strategy.repaint(&mut page.doc, &mut page.registry);
        let after: Vec<_> = page.registry.iter().cloned().collect();

        assert_eq!(before, after);
        assert_eq!(page.doc.text_content(page.doc.body()), text_before);
    }
}

#[test]
fn test_hover_recovers_term() {
    for strategy in strategies() {
        let page = Page::new(TEXT, strategy);
        let candidate = page.registry.iter().next().unwrap().clone();
        let caret = Caret::new(candidate.location.node, candidate.location.start + 1);
        assert_eq!(
            page.strategy
                .term_at(&page.doc, &page.registry, caret)
                .as_deref(),
            Some("XFN")
        );
    }
}
