//! # acrotip lookup
//!
//! Resolves a term to definitions. The primary (wiki) tier is consulted
//! first, the AI tier only when the primary tier has nothing. Both tiers are
//! cached, concurrent lookups for the same term share one resolution, and
//! expected failures collapse into an empty result rather than an error.
//!
//! The [`BackgroundService`] exposes the orchestrator, the recent-lookups
//! list and the cache over the message bus.

pub mod orchestrator;
pub mod preferences;
pub mod prompt;
pub mod recent;
pub mod service;

pub use orchestrator::{LookupOrchestrator, LookupSettings};
pub use preferences::Preferences;
pub use recent::{RecentLookups, MAX_RECENT};
pub use service::BackgroundService;
