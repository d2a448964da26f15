//! Cross-component messaging errors.

use thiserror::Error;

/// A broken request/response channel between the page runtime and the
/// background service. Surfaces as a generic "extension error".
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Message channel closed")]
    ChannelClosed,

    #[error("No response received")]
    NoResponse,

    #[error("Handler failed: {0}")]
    Handler(String),
}
