//! Primary definition source protocol.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::lookup::Definition;

/// A wiki-style definition service queried before the AI tier.
///
/// The service answers in one of two shapes. The detailed query returns
/// individual definitions with vote counts; the simple query returns bare
/// definition strings. Callers prefer the detailed query and only fall back
/// to the simple one when the detailed query errors. An empty detailed answer
/// is a legitimate "no entry".
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Returns the source ID.
    fn id(&self) -> &str;

    /// Detailed query: definitions with vote counts.
    async fn detailed(&self, term: &str) -> Result<Vec<Definition>, SourceError>;

    /// Simple query: unordered definition strings, no votes.
    async fn simple(&self, term: &str) -> Result<Vec<String>, SourceError>;
}
