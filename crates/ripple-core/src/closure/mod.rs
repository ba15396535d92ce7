//! Traversal Engine Module
//!
//! Answers: "what is reachable from/to entity X, at what distance, via
//! which relation kinds". Bounded BFS per source entity, parallel across
//! sources, producing a transitive-closure table of minimal depths with
//! relation kinds aggregated across depth-tied paths.

mod types;
mod engine;

pub use types::*;
pub use engine::ClosureEngine;
