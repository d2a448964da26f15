//! Per-page session.
//!
//! Owns everything that touches the document: the registry, the scanner memo,
//! the mutation watch, the active highlight strategy and the tooltip
//! controller. Every method runs to completion on the owning task, so scans
//! and repaints never interleave with each other.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use acrotip_config::{Config, DetectorConfig, HighlightMode, TooltipConfig};
use acrotip_detector::{
    extract_context, page_source, AcronymCandidate, Caret, Classifier, ClassifierTable,
    DismissalStore, Document, DomError, HighlightStrategy, MarkerHighlighter, MutationWatch,
    NodeId, RangeHighlighter, Registry, ScanReport, Scanner,
};
use acrotip_lookup::Preferences;
use acrotip_protocols::{MessageSender, PageContext};
use acrotip_tooltip::{
    place, Anchor, Effect, Phase, Placement, Rect, TooltipController, TooltipEvent,
    TooltipLinks, TooltipTiming, TooltipView,
};

use crate::error::RuntimeResult;
use crate::surface::TooltipSurface;

/// Explicit collaborators of a page session.
pub struct PageDeps {
    pub config: Config,
    pub document: Document,
    pub highlighter: Box<dyn HighlightStrategy>,
    pub dismissals: DismissalStore,
    pub preferences: Preferences,
    pub sender: MessageSender,
    pub surface: Box<dyn TooltipSurface>,
}

/// Highlight strategy for a configured mode.
pub fn highlighter_for(mode: HighlightMode) -> Box<dyn HighlightStrategy> {
    match mode {
        HighlightMode::Range => Box::new(RangeHighlighter::new()),
        HighlightMode::Marker => Box::new(MarkerHighlighter::new()),
    }
}

/// Classifier tuned by the detector section of the config.
pub fn classifier_for(config: &DetectorConfig) -> Classifier {
    let table = ClassifierTable::default()
        .with_bounds(config.min_len, config.max_len)
        .with_extra_stopwords(&config.extra_stopwords)
        .with_allowed_terms(&config.allowed_terms);
    Classifier::new(table)
}

fn tooltip_timing(config: &TooltipConfig) -> TooltipTiming {
    TooltipTiming {
        show_delay: Duration::from_millis(config.show_delay_ms),
        hide_delay: Duration::from_millis(config.hide_delay_ms),
        max_others: config.max_other_definitions,
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub active: bool,
    pub host: String,
    pub highlighter: &'static str,
    /// Distinct live terms in document order.
    pub terms: Vec<String>,
    pub candidates: Vec<AcronymCandidate>,
    pub dismissed: Vec<String>,
    pub phase: Phase,
    pub tooltip: Option<TooltipView>,
}

#[derive(Debug, Clone)]
struct Hover {
    term: String,
    node: NodeId,
}

pub struct PageSession {
    config: Config,
    doc: Document,
    registry: Registry,
    scanner: Scanner,
    watch: MutationWatch,
    highlighter: Box<dyn HighlightStrategy>,
    dismissals: DismissalStore,
    preferences: Preferences,
    sender: MessageSender,
    surface: Box<dyn TooltipSurface>,
    tooltip: TooltipController,
    hovered: Option<Hover>,
    active: bool,
}

impl PageSession {
    pub fn new(deps: PageDeps) -> RuntimeResult<Self> {
        let links = TooltipLinks::new(&deps.config.primary.base_url)?;
        let tooltip = TooltipController::new(tooltip_timing(&deps.config.tooltip), links);
        let scanner = Scanner::new(classifier_for(&deps.config.detector));
        let watch = MutationWatch::new(Duration::from_millis(deps.config.detector.debounce_ms));

        Ok(Self {
            config: deps.config,
            doc: deps.document,
            registry: Registry::new(),
            scanner,
            watch,
            highlighter: deps.highlighter,
            dismissals: deps.dismissals,
            preferences: deps.preferences,
            sender: deps.sender,
            surface: deps.surface,
            tooltip,
            hovered: None,
            active: false,
        })
    }

    /// Load preferences and dismissed terms, then run the initial scan.
    /// Returns `false` when the page's site is disabled.
    pub async fn init(&mut self) -> bool {
        let host = self.doc.hostname().to_string();
        if self.preferences.is_site_disabled(&host).await {
            info!("Acronym detection disabled on {}", host);
            self.active = false;
            return false;
        }
        self.apply_tooltip_delay().await;
        self.dismissals.load().await;
        self.active = true;

        let report = self.full_scan();
        info!(
            "Initial scan on {}: {} text nodes, {} acronyms ({})",
            if host.is_empty() { "page" } else { host.as_str() },
            report.visited,
            report.registered,
            self.highlighter.name()
        );
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tooltip(&self) -> &TooltipController {
        &self.tooltip
    }

    pub fn sender(&self) -> &MessageSender {
        &self.sender
    }

    /// Re-read stored preferences. Deactivates the page if its site has
    /// been disabled since init.
    pub async fn reload_preferences(&mut self) {
        if !self.active {
            return;
        }
        if self.preferences.is_site_disabled(self.doc.hostname()).await {
            info!("Site {} disabled, removing highlights", self.doc.hostname());
            self.deactivate();
            return;
        }
        self.apply_tooltip_delay().await;
    }

    async fn apply_tooltip_delay(&mut self) {
        if let Some(delay) = self.preferences.tooltip_delay().await {
            self.tooltip.set_show_delay(Duration::from_millis(delay));
        }
    }

    /// Apply a host change to the document and queue its mutation records.
    pub fn mutate<F>(&mut self, change: F, now: Instant) -> Result<(), DomError>
    where
        F: FnOnce(&mut Document) -> Result<(), DomError>,
    {
        let outcome = change(&mut self.doc);
        let records = self.doc.take_mutations();
        if self.active && !records.is_empty() {
            self.watch.observe(records, now);
        }
        outcome
    }

    /// When the pending mutation batch becomes due.
    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.watch.deadline()
    }

    /// Run the pending incremental scan if its debounce has elapsed.
    pub fn flush(&mut self, now: Instant) -> Option<ScanReport> {
        let job = self.watch.take_job(now)?;
        let mut roots = job.scan_roots();
        for node in &job.removed {
            for text in self.doc.text_nodes(*node) {
                self.registry.remove_node(text);
            }
            self.scanner.forget(&self.doc, *node);
        }
        for node in &job.changed {
            self.scanner.forget(&self.doc, *node);
            let released = self
                .highlighter
                .release(&mut self.doc, &mut self.registry, *node);
            if let Some(root) = released {
                self.scanner.forget(&self.doc, root);
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
        }

        let mut report = ScanReport::default();
        for root in roots {
            let found = self
                .scanner
                .scan(&self.doc, root, &mut self.registry, self.dismissals.terms());
            report.visited += found.visited;
            report.registered += found.registered;
        }
        self.repaint();

        if self
            .hovered
            .as_ref()
            .is_some_and(|h| !self.doc.is_connected(h.node))
        {
            self.hovered = None;
        }
        debug!(
            "Incremental scan: {} text nodes, {} new acronyms",
            report.visited, report.registered
        );
        Some(report)
    }

    fn full_scan(&mut self) -> ScanReport {
        let report =
            self.scanner
                .rescan_all(&self.doc, &mut self.registry, self.dismissals.terms());
        self.repaint();
        report
    }

    fn repaint(&mut self) {
        let report = self.highlighter.repaint(&mut self.doc, &mut self.registry);
        for node in report.pruned {
            self.scanner.forget(&self.doc, node);
        }
    }

    /// The pointer rests on `caret`; `rect` is the hovered word's box.
    pub fn pointer_over(&mut self, caret: Caret, rect: Rect) -> Vec<Effect> {
        if !self.active {
            return Vec::new();
        }
        let Some(term) = self.highlighter.term_at(&self.doc, &self.registry, caret) else {
            return self.pointer_out();
        };
        if self.hovered.as_ref().is_some_and(|h| h.term == term) {
            return Vec::new();
        }
        self.hovered = Some(Hover {
            term: term.clone(),
            node: caret.node,
        });
        self.tooltip
            .handle(TooltipEvent::AnchorEnter(Anchor::new(term, rect)))
    }

    pub fn pointer_out(&mut self) -> Vec<Effect> {
        if self.hovered.take().is_none() {
            return Vec::new();
        }
        self.tooltip.handle(TooltipEvent::AnchorLeave)
    }

    /// Forward a tooltip event to the controller.
    pub fn tooltip_event(&mut self, event: TooltipEvent) -> Vec<Effect> {
        if !self.active {
            return Vec::new();
        }
        self.tooltip.handle(event)
    }

    /// Page context for an AI lookup of `term`, taken from the hovered
    /// occurrence when there is one.
    pub fn lookup_context(&self, term: &str) -> PageContext {
        let node = self
            .hovered
            .as_ref()
            .filter(|h| h.term == term)
            .map(|h| h.node)
            .or_else(|| {
                self.registry
                    .iter()
                    .find(|c| c.term == term)
                    .map(|c| c.location.node)
            });
        match node {
            Some(node) => extract_context(&self.doc, node, self.config.detector.context_max_chars),
            None => PageContext::new(String::new(), page_source(&self.doc)),
        }
    }

    pub fn show(&mut self, view: &TooltipView) {
        self.surface.render(view);
    }

    /// Place the rendered tooltip against the anchor box.
    pub fn position(&mut self, anchor: Rect) -> Placement {
        let placement = place(anchor, self.surface.measure(), self.surface.viewport());
        self.surface.place(placement);
        placement
    }

    pub fn hide_tooltip(&mut self) {
        self.surface.hide();
    }

    /// Dismiss `term` everywhere on the page. Other terms sharing a text
    /// node are rescanned in place; the rest of the page is left alone.
    pub async fn dismiss(&mut self, term: &str) -> bool {
        let added = self.dismissals.dismiss(term).await;
        if self.hovered.as_ref().is_some_and(|h| h.term == term) {
            self.hovered = None;
        }
        if self.tooltip.current_term() == Some(term) {
            let effects = self.tooltip.handle(TooltipEvent::Close);
            if effects.contains(&Effect::Hide) {
                self.surface.hide();
            }
        }
        if !self.active {
            return added;
        }

        let touched = self
            .highlighter
            .clear_term(&mut self.doc, &mut self.registry, term);
        for node in touched {
            self.scanner.forget(&self.doc, node);
            self.scanner
                .scan(&self.doc, node, &mut self.registry, self.dismissals.terms());
        }
        self.repaint();
        added
    }

    /// Allow `term` again and rescan the whole page.
    pub async fn re_enable(&mut self, term: &str) -> Option<ScanReport> {
        if !self.dismissals.re_enable(term).await || !self.active {
            return None;
        }
        Some(self.full_scan())
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            active: self.active,
            host: self.doc.hostname().to_string(),
            highlighter: self.highlighter.name(),
            terms: self.registry.terms(),
            candidates: self.registry.iter().cloned().collect(),
            dismissed: self.dismissals.sorted_terms(),
            phase: self.tooltip.phase(),
            tooltip: self.tooltip.view().cloned(),
        }
    }

    /// Strip every highlight and close the tooltip.
    pub fn deactivate(&mut self) {
        self.tooltip.handle(TooltipEvent::Close);
        self.surface.hide();
        self.watch.cancel();
        self.highlighter.teardown(&mut self.doc, &mut self.registry);
        self.scanner.reset();
        self.hovered = None;
        self.active = false;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
