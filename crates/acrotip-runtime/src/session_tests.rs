use super::*;
use std::sync::Arc;

use acrotip_cache::InMemoryStore;
use acrotip_detector::NodeSpec;
use acrotip_protocols::{KeyValueStore, MessageBus, StorageArea};

use crate::surface::HeadlessSurface;

const TEXT: &str = "The XFN team owns the rollout.\n\nOur OKR review covers XFN goals.";

struct Fixture {
    session: PageSession,
    surface: HeadlessSurface,
    sync: Arc<dyn KeyValueStore>,
}

fn fixture_with(doc: Document, mode: HighlightMode, sync: Arc<dyn KeyValueStore>) -> Fixture {
    let mut config = Config::default();
    config.detector.highlight = mode;
    let (sender, _receiver) = MessageBus::channel(4);
    let surface = HeadlessSurface::default();
    let session = PageSession::new(PageDeps {
        highlighter: highlighter_for(config.detector.highlight),
        config,
        document: doc,
        dismissals: DismissalStore::new(sync.clone()),
        preferences: Preferences::new(sync.clone()),
        sender,
        surface: Box::new(surface.clone()),
    })
    .unwrap();
    Fixture {
        session,
        surface,
        sync,
    }
}

fn fixture(mode: HighlightMode) -> Fixture {
    fixture_with(
        Document::from_plain_text(TEXT),
        mode,
        Arc::new(InMemoryStore::new(StorageArea::Sync)),
    )
}

fn caret_for(session: &PageSession, term: &str) -> Caret {
    let candidate = session
        .registry()
        .iter()
        .find(|c| c.term == term)
        .unwrap();
    Caret::new(candidate.location.node, candidate.location.start + 1)
}

fn anchor_rect() -> Rect {
    Rect::new(100.0, 300.0, 30.0, 16.0)
}

#[tokio::test]
async fn test_init_scans_and_paints() {
    for mode in [HighlightMode::Range, HighlightMode::Marker] {
        let mut f = fixture(mode);
        assert!(f.session.init().await);

        let snapshot = f.session.snapshot();
        assert!(snapshot.active);
        assert_eq!(snapshot.terms, vec!["XFN".to_string(), "OKR".to_string()]);
        assert_eq!(snapshot.candidates.len(), 3);
        assert_eq!(snapshot.phase, Phase::Idle);
    }
}

#[tokio::test]
async fn test_disabled_site_stays_inactive() {
    let sync: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new(StorageArea::Sync));
    Preferences::new(sync.clone())
        .set_site_enabled("intranet.example.com", false)
        .await
        .unwrap();
    let doc = Document::from_json(
        r#"{"url": "https://intranet.example.com/notes", "body": [{"tag": "p", "children": ["The XFN team"]}]}"#,
    )
    .unwrap();

    let mut f = fixture_with(doc, HighlightMode::Range, sync);
    assert!(!f.session.init().await);
    assert!(!f.session.is_active());
    assert!(f.session.registry().is_empty());

    let caret = Caret::new(f.session.document().text_nodes(f.session.document().body())[0], 5);
    assert!(f.session.pointer_over(caret, anchor_rect()).is_empty());
}

#[tokio::test]
async fn test_dismissed_terms_are_skipped_on_init() {
    let sync: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new(StorageArea::Sync));
    DismissalStore::new(sync.clone()).dismiss("OKR").await;

    let mut f = fixture_with(Document::from_plain_text(TEXT), HighlightMode::Range, sync);
    f.session.init().await;
    assert_eq!(f.session.snapshot().terms, vec!["XFN".to_string()]);
    assert_eq!(f.session.snapshot().dismissed, vec!["OKR".to_string()]);
}

#[tokio::test]
async fn test_mutations_wait_for_debounce() {
    let mut f = fixture(HighlightMode::Range);
    f.session.init().await;

    let now = Instant::now();
    let body = f.session.document().body();
    f.session
        .mutate(
            |doc| {
                doc.build_into(
                    body,
                    &NodeSpec::Element {
                        tag: "p".to_string(),
                        attrs: Default::default(),
                        children: vec![NodeSpec::Text("Check the SLA first.".to_string())],
                    },
                )
                .map(|_| ())
            },
            now,
        )
        .unwrap();

    let deadline = f.session.debounce_deadline().unwrap();
    assert!(deadline > now);
    assert!(f.session.flush(now).is_none());
    assert!(!f.session.registry().contains_term("SLA"));

    let report = f.session.flush(deadline).unwrap();
    assert_eq!(report.registered, 1);
    assert!(f.session.registry().contains_term("SLA"));
    assert!(f.session.debounce_deadline().is_none());
}

#[tokio::test]
async fn test_edited_acronym_is_replaced_after_flush() {
    for mode in [HighlightMode::Range, HighlightMode::Marker] {
        let mut f = fixture(mode);
        f.session.init().await;

        let node = caret_for(&f.session, "XFN").node;
        let edited = f
            .session
            .document()
            .text(node)
            .unwrap()
            .replacen("XFN", "SRE", 1);
        let now = Instant::now();
        f.session
            .mutate(move |doc| doc.set_text(node, &edited), now)
            .unwrap();
        let deadline = f.session.debounce_deadline().unwrap();
        f.session.flush(deadline).unwrap();

        let snapshot = f.session.snapshot();
        let mut terms = snapshot.terms.clone();
        terms.sort();
        assert_eq!(terms, vec!["OKR".to_string(), "SRE".to_string(), "XFN".to_string()]);
        assert_eq!(snapshot.candidates.len(), 3);
        for candidate in &snapshot.candidates {
            let text = f.session.document().text(candidate.location.node).unwrap();
            assert_eq!(
                &text[candidate.location.start..candidate.location.end],
                candidate.term
            );
        }

        let caret = caret_for(&f.session, "SRE");
        assert!(!f.session.pointer_over(caret, anchor_rect()).is_empty());
    }
}

#[tokio::test]
async fn test_failed_mutation_is_reported() {
    let mut f = fixture(HighlightMode::Range);
    f.session.init().await;
    let result = f
        .session
        .mutate(|doc| doc.set_text(NodeId::from_raw(999), "gone"), Instant::now());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_pointer_over_acronym_starts_show_timer() {
    let mut f = fixture(HighlightMode::Range);
    f.session.init().await;

    let caret = caret_for(&f.session, "OKR");
    let effects = f.session.pointer_over(caret, anchor_rect());
    assert!(matches!(
        effects.as_slice(),
        [Effect::StartTimer {
            kind: acrotip_tooltip::TimerKind::Show,
            ..
        }]
    ));
    assert_eq!(f.session.tooltip().pending_term(), Some("OKR"));

    // Moving within the same word does not restart the timer.
    let again = Caret::new(caret.node, caret.offset + 1);
    assert!(f.session.pointer_over(again, anchor_rect()).is_empty());
}

#[tokio::test]
async fn test_pointer_over_plain_text_is_a_leave() {
    let mut f = fixture(HighlightMode::Range);
    f.session.init().await;

    let caret = caret_for(&f.session, "XFN");
    f.session.pointer_over(caret, anchor_rect());
    let plain = Caret::new(caret.node, 0);
    f.session.pointer_over(plain, anchor_rect());
    assert_eq!(f.session.tooltip().pending_term(), None);
    assert!(f.session.pointer_out().is_empty());
}

#[tokio::test]
async fn test_lookup_context_uses_hovered_paragraph() {
    let mut f = fixture(HighlightMode::Range);
    f.session.init().await;

    let caret = caret_for(&f.session, "OKR");
    f.session.pointer_over(caret, anchor_rect());
    let context = f.session.lookup_context("OKR");
    assert!(context.surrounding_text.contains("Our OKR review"));
    assert_eq!(context.page_source, page_source(f.session.document()));

    let missing = f.session.lookup_context("ZZZ");
    assert!(missing.surrounding_text.is_empty());
}

#[tokio::test]
async fn test_position_uses_surface_measurements() {
    let mut f = fixture(HighlightMode::Range);
    f.session.init().await;

    f.session.show(&TooltipView::NotFound {
        term: "XFN".to_string(),
        link: "https://wiki.example.com/word/?word=XFN".to_string(),
    });
    let placement = f.session.position(anchor_rect());
    let log = f.surface.log();
    assert!(log.visible);
    assert_eq!(log.placement, Some(placement));

    f.session.hide_tooltip();
    assert!(!f.surface.log().visible);
}

#[tokio::test]
async fn test_dismiss_and_re_enable() {
    for mode in [HighlightMode::Range, HighlightMode::Marker] {
        let mut f = fixture(mode);
        f.session.init().await;

        assert!(f.session.dismiss("XFN").await);
        assert_eq!(f.session.snapshot().terms, vec!["OKR".to_string()]);
        let mut stored = DismissalStore::new(f.sync.clone());
        stored.load().await;
        assert_eq!(stored.sorted_terms(), vec!["XFN".to_string()]);

        let report = f.session.re_enable("XFN").await.unwrap();
        assert_eq!(report.registered, 3);
        assert_eq!(
            f.session.snapshot().terms,
            vec!["XFN".to_string(), "OKR".to_string()]
        );
        assert!(f.session.re_enable("XFN").await.is_none());
    }
}

#[tokio::test]
async fn test_preference_reload_applies_delay_and_disable() {
    let sync: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new(StorageArea::Sync));
    let doc = Document::from_json(
        r#"{"url": "https://docs.example.com/a", "body": [{"tag": "p", "children": ["The XFN team"]}]}"#,
    )
    .unwrap();
    let mut f = fixture_with(doc, HighlightMode::Marker, sync.clone());
    f.session.init().await;
    assert!(f.session.is_active());

    let preferences = Preferences::new(sync);
    preferences.set_tooltip_delay(50).await.unwrap();
    f.session.reload_preferences().await;
    assert_eq!(
        f.session.tooltip().timing().show_delay,
        Duration::from_millis(50)
    );

    preferences
        .set_site_enabled("docs.example.com", false)
        .await
        .unwrap();
    f.session.reload_preferences().await;
    assert!(!f.session.is_active());
    assert!(f.session.registry().is_empty());
    let body = f.session.document().body();
    assert!(
        f.session
            .document()
            .elements_by_tag(body, acrotip_detector::MARKER_TAG)
            .is_empty()
    );
}

#[test]
fn test_classifier_for_applies_config() {
    let mut config = DetectorConfig::default();
    config.extra_stopwords = vec!["XFN".to_string()];
    config.allowed_terms = vec!["AND".to_string()];
    let classifier = classifier_for(&config);
    assert!(classifier.is_stopword("XFN"));
    assert!(!classifier.is_stopword("AND"));
}

#[test]
fn test_highlighter_for_mode() {
    assert_ne!(
        highlighter_for(HighlightMode::Range).name(),
        highlighter_for(HighlightMode::Marker).name()
    );
}
