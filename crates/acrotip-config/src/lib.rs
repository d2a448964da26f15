//! # acrotip config
//!
//! TOML configuration for the acronym engine: detector tuning, tooltip
//! timing, cache lifetimes, the primary definition source, the AI fallback,
//! durable storage and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
