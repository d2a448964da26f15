//! AI completion provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    /// The user-supplied key was refused (401/403).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The service answered without any completion text.
    #[error("Empty completion")]
    EmptyCompletion,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Whether the stored AI key itself is the problem.
    pub fn is_credential_rejected(&self) -> bool {
        matches!(self, ProviderError::AuthenticationFailed(_))
    }
}
