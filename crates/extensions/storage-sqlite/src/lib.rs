//! SQLite key-value store for acrotip.
//!
//! Backs both storage areas with one table keyed by `(area, key)`.

mod schema;
mod store;

pub use store::SqliteStore;
