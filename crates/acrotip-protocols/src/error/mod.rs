//! Error types for the acrotip protocol layer.
//!
//! Lookup tiers and storage never let these escape their own boundary for
//! expected failures; they are logged and collapsed into empty results.
//! Only [`MessagingError`] is meant to reach the user interface.

mod messaging;
mod provider;
mod source;
mod storage;

pub use messaging::*;
pub use provider::*;
pub use source::*;
pub use storage::*;
