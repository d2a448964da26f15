//! Wiki-style primary definition source for acrotip.
//!
//! Talks to a community glossary service that exposes a JSON definitions
//! endpoint and an HTML word page with embedded definition records.

mod api;
mod parser;
mod source;

pub use parser::parse_word_page;
pub use source::WikiSource;
