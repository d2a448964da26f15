//! Error types for the page runtime.

use thiserror::Error;

use acrotip_detector::DomError;
use acrotip_tooltip::LinkError;

/// Errors raised while building or driving a page session.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The configured wiki base URL cannot be used for tooltip links.
    #[error("Invalid link base: {0}")]
    Link(#[from] LinkError),

    /// A host mutation failed against the document.
    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    /// The content script event loop has stopped.
    #[error("Content script stopped")]
    Stopped,
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
