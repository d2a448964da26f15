//! Primary definition source errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Source returned status {status}")]
    Status { status: u16 },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Timeout after {0} ms")]
    Timeout(u64),

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),
}
