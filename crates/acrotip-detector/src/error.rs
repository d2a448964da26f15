//! Document model errors.

use thiserror::Error;

use crate::dom::NodeId;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} is not a text node")]
    NotText(NodeId),

    #[error("Invalid offset {offset} in node {node}")]
    InvalidOffset { node: NodeId, offset: usize },

    #[error("Hierarchy error: {0}")]
    Hierarchy(String),

    #[error("Invalid document: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for DomError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
