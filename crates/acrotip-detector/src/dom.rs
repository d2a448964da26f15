//! Arena document model.
//!
//! A small mirror of the parts of a browser DOM the detector touches:
//! elements with attributes, text nodes, attachment state, mutation records
//! and a registry of named highlights. Removed nodes stay in the arena,
//! detached, so stale references can be detected instead of dangling.
//!
//! Text offsets are byte offsets into the node's text.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DomError;

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A span of text inside one text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextLocation {
    pub node: NodeId,
    pub start: usize,
    pub end: usize,
}

impl TextLocation {
    pub fn new(node: NodeId, start: usize, end: usize) -> Self {
        Self { node, start, end }
    }

    /// Whether a caret offset in `node` falls on this span. Both ends count.
    pub fn contains_caret(&self, node: NodeId, offset: usize) -> bool {
        self.node == node && offset >= self.start && offset <= self.end
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A change observed on the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    CharacterData {
        target: NodeId,
    },
}

/// Declarative node tree used to build documents from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

/// A whole page: location, title and body content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub body: Vec<NodeSpec>,
}

/// The document arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    title: String,
    location: Option<Url>,
    recording: bool,
    mutations: Vec<MutationRecord>,
    highlights: BTreeMap<String, Vec<TextLocation>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with a `BODY` root.
    pub fn new() -> Self {
        let body = Node {
            data: NodeData::Element {
                tag: "BODY".to_string(),
                attrs: BTreeMap::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            title: String::new(),
            location: None,
            recording: true,
            mutations: Vec::new(),
            highlights: BTreeMap::new(),
        }
    }

    /// Build a document from a [`DocumentSpec`].
    pub fn from_spec(spec: &DocumentSpec) -> Result<Self, DomError> {
        let mut doc = Self::new();
        doc.title = spec.title.clone();
        if let Some(url) = &spec.url {
            let parsed = Url::parse(url).map_err(|e| DomError::Parse(format!("{}: {}", url, e)))?;
            doc.location = Some(parsed);
        }
        let body = doc.body;
        for child in &spec.body {
            doc.build_into(body, child)?;
        }
        doc.take_mutations();
        Ok(doc)
    }

    /// Parse a JSON [`DocumentSpec`].
    pub fn from_json(json: &str) -> Result<Self, DomError> {
        let spec: DocumentSpec = serde_json::from_str(json)?;
        Self::from_spec(&spec)
    }

    /// One `P` element per blank-line separated paragraph.
    pub fn from_plain_text(text: &str) -> Self {
        let mut doc = Self::new();
        let body = doc.body;
        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            let p = doc.create_element("p");
            let t = doc.create_text(paragraph);
            doc.attach(body, p, None);
            doc.attach(p, t, None);
        }
        doc.take_mutations();
        doc
    }

    /// Build `spec` under `parent`, returning the new node.
    pub fn build_into(&mut self, parent: NodeId, spec: &NodeSpec) -> Result<NodeId, DomError> {
        let id = self.build_detached(spec)?;
        self.append_child(parent, id)?;
        Ok(id)
    }

    fn build_detached(&mut self, spec: &NodeSpec) -> Result<NodeId, DomError> {
        match spec {
            NodeSpec::Text(text) => Ok(self.create_text(text)),
            NodeSpec::Element {
                tag,
                attrs,
                children,
            } => {
                let id = self.create_element(tag);
                for (name, value) in attrs {
                    self.set_attribute(id, name, value)?;
                }
                for child in children {
                    let child_id = self.build_detached(child)?;
                    self.attach(id, child_id, None);
                }
                Ok(id)
            }
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }

    pub fn set_location(&mut self, url: Url) {
        self.location = Some(url);
    }

    /// Host name of the page, empty when the location is unknown.
    pub fn hostname(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|u| u.host_str())
            .unwrap_or("")
    }

    // ── Node creation ─────────────────────────────────────────────────────

    /// Create a detached element. Tag names are stored uppercase.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_uppercase(),
            attrs: BTreeMap::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // ── Inspection ────────────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0).map(|n| &n.data), Some(NodeData::Text(_)))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id.0).map(|n| &n.data),
            Some(NodeData::Element { .. })
        )
    }

    /// Uppercase tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// Text of a text node.
    pub fn text(&self, id: NodeId) -> Result<&str, DomError> {
        match &self.node(id)?.data {
            NodeData::Text(text) => Ok(text),
            NodeData::Element { .. } => Err(DomError::NotText(id)),
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element { attrs, .. } => {
                attrs.insert(name.to_ascii_lowercase(), value.to_string());
                Ok(())
            }
            NodeData::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the node is reachable from the body.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.body {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_nodes(id)
            .into_iter()
            .filter_map(|node| self.text(node).ok())
            .collect()
    }

    /// Value of a declaration in the element's inline `style` attribute.
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        style.split(';').find_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            (name.trim().eq_ignore_ascii_case(property)).then(|| value.trim().to_ascii_lowercase())
        })
    }

    /// Inherited `text-transform` of a node (text nodes use their parent).
    pub fn computed_text_transform(&self, id: NodeId) -> Option<String> {
        let mut current = if self.is_text(id) { self.parent(id) } else { Some(id) };
        while let Some(el) = current {
            if let Some(value) = self.style_property(el, "text-transform") {
                if value != "inherit" {
                    return Some(value);
                }
            }
            current = self.parent(el);
        }
        None
    }

    /// Closest inclusive ancestor element (text nodes start at their parent).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        if self.is_element(id) {
            Some(id)
        } else {
            self.parent(id)
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Append `child` to `parent`, moving it if already attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or at the end.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.node(child)?;
        if !self.is_element(parent) {
            return Err(DomError::NotAnElement(parent));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Hierarchy(format!(
                "cannot insert {} into its own subtree",
                child
            )));
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::Hierarchy(format!(
                    "{} is not a child of {}",
                    reference, parent
                )));
            }
        }

        if self.parent(child).is_some() {
            self.remove(child)?;
        }
        self.attach(parent, child, reference);
        self.record(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let siblings = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detach a node from its parent. The node and its subtree stay valid.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        let parent = self
            .node(id)?
            .parent
            .ok_or_else(|| DomError::Hierarchy(format!("{} has no parent", id)))?;
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
        self.record(MutationRecord::ChildList {
            target: parent,
            added: Vec::new(),
            removed: vec![id],
        });
        Ok(())
    }

    /// Replace the text of a text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(current) => {
                *current = text.to_string();
            }
            NodeData::Element { .. } => return Err(DomError::NotText(id)),
        }
        self.record(MutationRecord::CharacterData { target: id });
        Ok(())
    }

    /// Split a text node at `offset`. The original keeps the head, a new
    /// sibling inserted right after it receives the tail.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let text = self.text(id)?;
        if offset > text.len() || !text.is_char_boundary(offset) {
            return Err(DomError::InvalidOffset { node: id, offset });
        }
        let head = text[..offset].to_string();
        let tail = text[offset..].to_string();

        let new_node = self.create_text(&tail);
        self.set_text(id, &head)?;
        if let Some(parent) = self.parent(id) {
            let index = self.children(parent).iter().position(|c| *c == id);
            let reference = index.and_then(|i| self.children(parent).get(i + 1).copied());
            self.attach(parent, new_node, reference);
            self.record(MutationRecord::ChildList {
                target: parent,
                added: vec![new_node],
                removed: Vec::new(),
            });
        }
        Ok(new_node)
    }

    /// Merge adjacent text children and drop empty ones. Returns the nodes
    /// that were merged away.
    pub fn normalize(&mut self, parent: NodeId) -> Result<Vec<NodeId>, DomError> {
        if !self.is_element(parent) {
            return Err(DomError::NotAnElement(parent));
        }
        let mut dropped = Vec::new();
        let children = self.children(parent).to_vec();
        let mut previous_text: Option<NodeId> = None;

        for child in children {
            if !self.is_text(child) {
                previous_text = None;
                continue;
            }
            let text = self.text(child)?.to_string();
            match previous_text {
                Some(prev) => {
                    let merged = format!("{}{}", self.text(prev)?, text);
                    self.set_text(prev, &merged)?;
                    self.remove(child)?;
                    dropped.push(child);
                }
                None if text.is_empty() => {
                    self.remove(child)?;
                    dropped.push(child);
                }
                None => previous_text = Some(child),
            }
        }
        Ok(dropped)
    }

    // ── Mutation observation ──────────────────────────────────────────────

    fn record(&mut self, record: MutationRecord) {
        if self.recording {
            self.mutations.push(record);
        }
    }

    /// Drain the pending mutation records.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    pub fn has_pending_mutations(&self) -> bool {
        !self.mutations.is_empty()
    }

    /// Run `f` without recording any mutation it makes.
    pub fn unobserved<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.recording, false);
        let result = f(self);
        self.recording = previous;
        result
    }

    // ── Named highlights ──────────────────────────────────────────────────

    /// Replace the ranges of a named highlight.
    pub fn set_highlight(&mut self, name: &str, ranges: Vec<TextLocation>) {
        self.highlights.insert(name.to_string(), ranges);
    }

    pub fn highlight(&self, name: &str) -> &[TextLocation] {
        self.highlights
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn remove_highlight(&mut self, name: &str) {
        self.highlights.remove(name);
    }

    /// `root` and all of its descendants in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.contains_node(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Text nodes under `root` in document order.
    pub fn text_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.is_text(*id))
            .collect()
    }

    /// Elements under `root` with the given tag, in document order.
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.tag(*id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }
}
