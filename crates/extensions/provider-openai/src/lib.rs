//! OpenAI-compatible completion provider for acrotip.

mod api;
mod provider;

pub use provider::OpenAiProvider;
