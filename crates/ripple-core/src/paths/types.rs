//! Path finding types

use serde::{Deserialize, Serialize};

use crate::model::EntityId;

/// One hop on a directed path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub from: EntityId,
    pub to: EntityId,
    pub relation_kind: String,
    pub context: String,
}

/// Path search options
#[derive(Debug, Clone)]
pub struct PathOptions {
    /// Maximum path length in hops
    pub max_depth: u32,
    /// Cap on depth-tied alternative paths returned
    pub max_paths: usize,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_paths: 5,
        }
    }
}

/// Result of a shortest-path search
///
/// Empty `paths` means the target is unreachable within `max_depth`;
/// that is a valid empty result, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResult {
    pub from: EntityId,
    pub to: EntityId,
    /// Shortest paths by hop count, at most `max_paths` depth-tied
    /// alternatives, deterministic by edge insertion order
    pub paths: Vec<Vec<PathStep>>,
    /// Search hit max_depth before exhausting the frontier
    pub truncated: bool,
}

impl PathResult {
    pub fn found(&self) -> bool {
        !self.paths.is_empty()
    }

    /// Hop count of the shortest path, if any
    pub fn depth(&self) -> Option<u32> {
        self.paths.first().map(|p| p.len() as u32)
    }
}
