//! Fact Store Module
//!
//! One consistent graph model spanning all fact sources: typed entities,
//! typed directed relations, and the frozen read-only snapshot every query
//! component operates on.
//!
//! Key components:
//! - `FactStore` - Append-only entity/edge store, single-writer per build
//! - `Snapshot` - Immutable adjacency view with names resolved at build
//! - Types for entities, relations, lookups, and relation kind tags

mod types;
mod store;
mod snapshot;

pub use types::*;
pub use store::FactStore;
pub use snapshot::{Adjacency, Snapshot};
