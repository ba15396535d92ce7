//! Transitive closure types

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::model::EntityId;

/// Traversal direction over the fact graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow edges source -> target (descendants, "what does X affect")
    Downstream,
    /// Follow edges target -> source (ancestors, "what affects X")
    Upstream,
}

/// One reachability fact: target reachable from source at minimal depth
///
/// `relation_kinds` aggregates only across paths tied at that minimum,
/// bounding output size while retaining "how" information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureEntry {
    pub source: EntityId,
    pub target: EntityId,
    /// True shortest-path hop count
    pub depth: u32,
    pub relation_kinds: BTreeSet<String>,
}

/// Closure computation options
#[derive(Debug, Clone)]
pub struct ClosureOptions {
    /// Maximum traversal depth; bounds runtime on dense graphs
    pub max_depth: u32,
    /// Partition source entities across rayon workers
    pub parallel: bool,
}

impl Default for ClosureOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            parallel: true,
        }
    }
}

/// Closure build statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureStats {
    pub sources: usize,
    pub entries: usize,
    pub truncated_sources: usize,
    pub duration_ms: u64,
}

/// Per-direction transitive closure table
#[derive(Debug)]
pub struct ClosureTable {
    pub direction: Direction,
    /// Depth-ordered entries per source entity; sources with no
    /// reachable targets are absent
    per_source: FxHashMap<EntityId, Vec<ClosureEntry>>,
    /// Sources whose frontier was still live at max_depth
    truncated: FxHashSet<EntityId>,
    pub stats: ClosureStats,
}

impl ClosureTable {
    pub(crate) fn new(
        direction: Direction,
        per_source: FxHashMap<EntityId, Vec<ClosureEntry>>,
        truncated: FxHashSet<EntityId>,
        stats: ClosureStats,
    ) -> Self {
        Self {
            direction,
            per_source,
            truncated,
            stats,
        }
    }

    /// Depth-ordered reachability entries for one source entity
    pub fn query(&self, source: EntityId) -> &[ClosureEntry] {
        self.per_source.get(&source).map_or(&[], Vec::as_slice)
    }

    /// Whether traversal from this source hit max_depth before the
    /// frontier was exhausted; such results are partial, never treated
    /// as complete
    pub fn truncated(&self, source: EntityId) -> bool {
        self.truncated.contains(&source)
    }

    /// Recorded depth for a (source, target) pair, if reachable
    pub fn depth(&self, source: EntityId, target: EntityId) -> Option<u32> {
        self.query(source)
            .iter()
            .find(|e| e.target == target)
            .map(|e| e.depth)
    }
}
