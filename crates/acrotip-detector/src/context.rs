//! Page context for AI lookups.

use acrotip_protocols::PageContext;

use crate::dom::{Document, NodeId};

/// Default cap on surrounding text, in characters.
pub const MAX_CONTEXT_CHARS: usize = 500;

const CONTAINER_TAGS: &[&str] = &[
    "P", "DIV", "ARTICLE", "SECTION", "LI", "TD", "BLOCKQUOTE", "SPAN",
];
const MAX_DEPTH: usize = 5;
const MIN_CONTAINER_CHARS: usize = 30;

/// Surrounding text and page label for the acronym in `node`.
pub fn extract_context(doc: &Document, node: NodeId, max_chars: usize) -> PageContext {
    PageContext::new(surrounding_text(doc, node, max_chars), page_source(doc))
}

/// Text of the nearest container with enough content, whitespace-normalized
/// and truncated to `max_chars` with `...` appended when cut.
pub fn surrounding_text(doc: &Document, node: NodeId, max_chars: usize) -> String {
    let mut container = doc.parent(node);
    let mut depth = 0;
    while let Some(el) = container {
        if depth >= MAX_DEPTH {
            break;
        }
        if doc.tag(el).is_some_and(|t| CONTAINER_TAGS.contains(&t)) {
            let text = doc.text_content(el);
            if text.chars().count() > MIN_CONTAINER_CHARS {
                return truncate(&text, max_chars);
            }
        }
        container = doc.parent(el);
        depth += 1;
    }

    match doc.parent(node) {
        Some(parent) => truncate(&doc.text_content(parent), max_chars),
        None => String::new(),
    }
}

/// Human-readable label for the page.
pub fn page_source(doc: &Document) -> String {
    let host = doc.hostname();
    let title = doc.title().trim();

    if host == "docs.google.com" {
        let name = title.strip_suffix(" - Google Docs").unwrap_or(title);
        return format!("Google Doc: {}", name.trim());
    }
    let is_wiki = doc
        .location()
        .is_some_and(|u| u.path().contains("/wiki/") || host.starts_with("wiki."));
    if is_wiki {
        return format!("Wiki: {}", title);
    }
    if title.is_empty() {
        format!("Page: {}", host)
    } else {
        format!("Page: {}", title)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match cleaned.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &cleaned[..cut]),
        None => cleaned,
    }
}
