//! # acrotip detector
//!
//! Finds acronyms in a live document and keeps their highlight state
//! consistent as the page changes.
//!
//! - [`dom`]: arena document model with mutation records and named highlights
//! - [`classifier`]: ordered predicate chain deciding what counts as an acronym
//! - [`scanner`], [`registry`], [`watch`]: traversal, live candidates, debounced
//!   incremental rescans
//! - [`highlight`]: range and marker painting strategies
//! - [`dismissal`]: persisted deny-list
//! - [`context`]: surrounding text and page label for AI lookups

pub mod classifier;
pub mod context;
pub mod dismissal;
pub mod dom;
pub mod error;
pub mod highlight;
pub mod registry;
pub mod scanner;
pub mod watch;

pub use classifier::{Classifier, ClassifierTable, TokenMatch};
pub use context::{extract_context, page_source, surrounding_text, MAX_CONTEXT_CHARS};
pub use dismissal::{DismissalStore, DISMISSED_TERMS_KEY};
pub use dom::{Document, DocumentSpec, MutationRecord, NodeId, NodeSpec, TextLocation};
pub use error::DomError;
pub use highlight::{
    Caret, HighlightStrategy, MarkerHighlighter, RangeHighlighter, RepaintReport, HIGHLIGHT_NAME,
    MARKER_TAG, MARKER_TERM_ATTR,
};
pub use registry::{AcronymCandidate, Registry};
pub use scanner::{ScanReport, Scanner, SKIP_TAGS};
pub use watch::{MutationWatch, ScanJob, WatchState};
