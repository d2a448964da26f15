//! Lookup data model shared by the runtime, the orchestrator and the UI.

use serde::{Deserialize, Serialize};

/// Normalize a term to the form used for dismissal, caching and comparison.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_uppercase()
}

/// A single definition returned by the primary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Definition text.
    pub text: String,

    /// Up-votes, zero when the source does not report votes.
    #[serde(default)]
    pub upvote_count: u32,

    /// Down-votes, zero when the source does not report votes.
    #[serde(default)]
    pub downvote_count: u32,
}

impl Definition {
    /// A definition without vote information.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            upvote_count: 0,
            downvote_count: 0,
        }
    }

    /// A definition with vote counts.
    pub fn voted(text: impl Into<String>, upvote_count: u32, downvote_count: u32) -> Self {
        Self {
            text: text.into(),
            upvote_count,
            downvote_count,
        }
    }
}

/// Which tier produced a lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    Primary,
    Ai,
    None,
}

impl LookupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupSource::Primary => "primary",
            LookupSource::Ai => "ai",
            LookupSource::None => "none",
        }
    }
}

/// Outcome of resolving one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub term: String,
    pub source: LookupSource,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_definition: Option<String>,
}

impl LookupResult {
    pub fn primary(term: impl Into<String>, definitions: Vec<Definition>) -> Self {
        Self {
            term: term.into(),
            source: LookupSource::Primary,
            definitions,
            ai_definition: None,
        }
    }

    pub fn ai(term: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            source: LookupSource::Ai,
            definitions: Vec::new(),
            ai_definition: Some(text.into()),
        }
    }

    pub fn none(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            source: LookupSource::None,
            definitions: Vec::new(),
            ai_definition: None,
        }
    }

    /// True when neither tier produced anything displayable.
    pub fn is_empty(&self) -> bool {
        match self.source {
            LookupSource::Primary => self.definitions.is_empty(),
            LookupSource::Ai => self
                .ai_definition
                .as_deref()
                .is_none_or(|text| text.trim().is_empty()),
            LookupSource::None => true,
        }
    }

    /// The definition shown first in the tooltip.
    pub fn top_definition(&self) -> Option<&str> {
        match self.source {
            LookupSource::Primary => self.definitions.first().map(|d| d.text.as_str()),
            LookupSource::Ai => self.ai_definition.as_deref(),
            LookupSource::None => None,
        }
    }
}

/// Page context used to enrich AI prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// Whitespace-normalized text around the acronym.
    #[serde(default)]
    pub surrounding_text: String,

    /// Human-readable label for the page the acronym appears on.
    #[serde(default)]
    pub page_source: String,
}

impl PageContext {
    pub fn new(surrounding_text: impl Into<String>, page_source: impl Into<String>) -> Self {
        Self {
            surrounding_text: surrounding_text.into(),
            page_source: page_source.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.surrounding_text.is_empty() && self.page_source.is_empty()
    }
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
