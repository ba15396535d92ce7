//! Path Finder Module
//!
//! Single bounded breadth-first search with cycle suppression, returning
//! a shortest directed path between two nodes plus a small bounded set of
//! depth-tied alternatives.

mod types;
mod finder;

pub use types::*;
pub use finder::PathFinder;
