use super::*;

fn paragraph(doc: &mut Document, text: &str) -> (NodeId, NodeId) {
    let p = doc.create_element("p");
    let t = doc.create_text(text);
    doc.append_child(doc.body(), p).unwrap();
    doc.append_child(p, t).unwrap();
    (p, t)
}

#[test]
fn test_new_document_has_body() {
    let doc = Document::new();
    assert_eq!(doc.tag(doc.body()), Some("BODY"));
    assert!(doc.is_connected(doc.body()));
    assert_eq!(doc.hostname(), "");
}

#[test]
fn test_append_records_mutation_and_connects() {
    let mut doc = Document::new();
    let (p, t) = paragraph(&mut doc, "The XFN team");

    assert!(doc.is_connected(t));
    assert_eq!(doc.parent(t), Some(p));
    assert_eq!(doc.text_content(doc.body()), "The XFN team");

    let records = doc.take_mutations();
    assert_eq!(records.len(), 2);
    assert!(matches!(
        &records[0],
        MutationRecord::ChildList { added, .. } if added == &vec![p]
    ));
    assert!(!doc.has_pending_mutations());
}

#[test]
fn test_removed_node_is_detached_but_readable() {
    let mut doc = Document::new();
    let (p, t) = paragraph(&mut doc, "OKR review");
    doc.take_mutations();

    doc.remove(p).unwrap();
    assert!(!doc.is_connected(t));
    assert_eq!(doc.text(t).unwrap(), "OKR review");
    assert_eq!(
        doc.take_mutations(),
        vec![MutationRecord::ChildList {
            target: doc.body(),
            added: vec![],
            removed: vec![p],
        }]
    );
}

#[test]
fn test_insert_into_own_subtree_rejected() {
    let mut doc = Document::new();
    let (p, _) = paragraph(&mut doc, "x");
    let span = doc.create_element("span");
    doc.append_child(p, span).unwrap();

    let err = doc.append_child(span, p).unwrap_err();
    assert!(matches!(err, DomError::Hierarchy(_)));
}

#[test]
fn test_append_to_text_node_rejected() {
    let mut doc = Document::new();
    let (_, t) = paragraph(&mut doc, "x");
    let other = doc.create_text("y");
    assert!(matches!(doc.append_child(t, other), Err(DomError::NotAnElement(_))));
}

#[test]
fn test_set_text_records_character_data() {
    let mut doc = Document::new();
    let (_, t) = paragraph(&mut doc, "before");
    doc.take_mutations();

    doc.set_text(t, "after SLA").unwrap();
    assert_eq!(doc.text(t).unwrap(), "after SLA");
    assert_eq!(
        doc.take_mutations(),
        vec![MutationRecord::CharacterData { target: t }]
    );
}

#[test]
fn test_split_and_normalize() {
    let mut doc = Document::new();
    let (p, t) = paragraph(&mut doc, "Ask the XFN lead");

    let tail = doc.split_text(t, 8).unwrap();
    assert_eq!(doc.text(t).unwrap(), "Ask the ");
    assert_eq!(doc.text(tail).unwrap(), "XFN lead");
    assert_eq!(doc.children(p), &[t, tail]);

    let dropped = doc.normalize(p).unwrap();
    assert_eq!(dropped, vec![tail]);
    assert_eq!(doc.children(p), &[t]);
    assert_eq!(doc.text(t).unwrap(), "Ask the XFN lead");
}

#[test]
fn test_split_rejects_non_char_boundary() {
    let mut doc = Document::new();
    let (_, t) = paragraph(&mut doc, "café");
    let err = doc.split_text(t, 4).unwrap_err();
    assert!(matches!(err, DomError::InvalidOffset { offset: 4, .. }));
}

#[test]
fn test_unobserved_suppresses_records() {
    let mut doc = Document::new();
    doc.unobserved(|doc| {
        paragraph(doc, "quiet");
    });
    assert!(!doc.has_pending_mutations());

    paragraph(&mut doc, "loud");
    assert!(doc.has_pending_mutations());
}

#[test]
fn test_computed_text_transform_inherits() {
    let mut doc = Document::new();
    let header = doc.create_element("header");
    doc.set_attribute(header, "style", "color: red; Text-Transform: UPPERCASE")
        .unwrap();
    doc.append_child(doc.body(), header).unwrap();
    let t = doc.create_text("Nav");
    doc.append_child(header, t).unwrap();

    assert_eq!(doc.computed_text_transform(t).as_deref(), Some("uppercase"));
    assert_eq!(doc.computed_text_transform(doc.body()), None);
}

#[test]
fn test_from_json_spec() {
    let json = r#"{
        "title": "Team notes",
        "url": "https://intranet.example.com/notes",
        "body": [
            {"tag": "div", "children": [
                {"tag": "p", "children": ["Ship the MVP"]},
                {"tag": "code", "children": ["HTTP_OK"]}
            ]},
            "trailing"
        ]
    }"#;
    let doc = Document::from_json(json).unwrap();
    assert_eq!(doc.title(), "Team notes");
    assert_eq!(doc.hostname(), "intranet.example.com");
    assert_eq!(doc.text_content(doc.body()), "Ship the MVPHTTP_OKtrailing");
    assert_eq!(doc.text_nodes(doc.body()).len(), 3);
    assert!(!doc.has_pending_mutations());
}

#[test]
fn test_from_json_bad_url() {
    let json = r#"{"url": "not a url", "body": []}"#;
    assert!(matches!(Document::from_json(json), Err(DomError::Parse(_))));
}

#[test]
fn test_from_plain_text_paragraphs() {
    let doc = Document::from_plain_text("First PR.\n\n\n\nSecond one.\n");
    let paragraphs = doc.children(doc.body());
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(doc.tag(paragraphs[0]), Some("P"));
    assert_eq!(doc.text_content(paragraphs[1]), "Second one.");
}

#[test]
fn test_named_highlights() {
    let mut doc = Document::new();
    let (_, t) = paragraph(&mut doc, "The XFN team");
    doc.set_highlight("acrotip-acronym", vec![TextLocation::new(t, 4, 7)]);
    assert_eq!(doc.highlight("acrotip-acronym").len(), 1);
    doc.remove_highlight("acrotip-acronym");
    assert!(doc.highlight("acrotip-acronym").is_empty());
}

#[test]
fn test_text_location_caret_is_inclusive() {
    let loc = TextLocation::new(NodeId::from_raw(2), 4, 7);
    assert!(loc.contains_caret(NodeId::from_raw(2), 4));
    assert!(loc.contains_caret(NodeId::from_raw(2), 7));
    assert!(!loc.contains_caret(NodeId::from_raw(2), 8));
    assert!(!loc.contains_caret(NodeId::from_raw(3), 5));
}
