//! Traversal engine - Bounded multi-hop reachability
//!
//! Multi-source breadth-first expansion, run independently per direction
//! and per source entity. A per-source visited-at-depth map prunes any
//! target already recorded at an equal-or-lower depth, which guarantees
//! termination on cyclic graphs and minimal-depth correctness; self-loops
//! and cycles are never special-cased elsewhere.

use std::collections::BTreeSet;
use std::time::Instant;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::info;

use super::types::*;
use crate::model::{Adjacency, EntityId, Snapshot};

/// Bounded transitive closure engine over an immutable snapshot
pub struct ClosureEngine<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> ClosureEngine<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Compute the closure for every entity in the snapshot.
    ///
    /// Each source's BFS is independent of the others, so sources are
    /// partitioned across rayon workers with per-worker output buffers
    /// merged at the end.
    pub fn compute(&self, direction: Direction, options: &ClosureOptions) -> ClosureTable {
        let start = Instant::now();
        let ids: Vec<EntityId> = self.snapshot.entities().iter().map(|e| e.id).collect();

        let per_source: Vec<(EntityId, Vec<ClosureEntry>, bool)> = if options.parallel {
            ids.par_iter()
                .map(|&id| self.bfs_from(id, direction, options.max_depth))
                .collect()
        } else {
            ids.iter()
                .map(|&id| self.bfs_from(id, direction, options.max_depth))
                .collect()
        };

        let mut table: FxHashMap<EntityId, Vec<ClosureEntry>> = FxHashMap::default();
        let mut truncated: FxHashSet<EntityId> = FxHashSet::default();
        let mut entries = 0usize;
        for (source, rows, was_truncated) in per_source {
            if was_truncated {
                truncated.insert(source);
            }
            if !rows.is_empty() {
                entries += rows.len();
                table.insert(source, rows);
            }
        }

        let stats = ClosureStats {
            sources: table.len(),
            entries,
            truncated_sources: truncated.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            direction = ?direction,
            sources = stats.sources,
            entries = stats.entries,
            truncated = stats.truncated_sources,
            duration_ms = stats.duration_ms,
            "closure computed"
        );

        ClosureTable::new(direction, table, truncated, stats)
    }

    fn neighbors(&self, id: EntityId, direction: Direction) -> &[Adjacency] {
        match direction {
            Direction::Downstream => self.snapshot.out_edges(id),
            Direction::Upstream => self.snapshot.in_edges(id),
        }
    }

    /// Level-synchronous BFS from one source.
    ///
    /// Relation kind sets propagate along the shortest-path DAG: a level
    /// is fully settled before the next expands, so unions across
    /// depth-tied paths are complete by construction.
    fn bfs_from(
        &self,
        source: EntityId,
        direction: Direction,
        max_depth: u32,
    ) -> (EntityId, Vec<ClosureEntry>, bool) {
        // entity id -> (min depth, union of relation kinds on tied paths)
        let mut reached: FxHashMap<EntityId, (u32, BTreeSet<String>)> = FxHashMap::default();
        reached.insert(source, (0, BTreeSet::new()));

        let mut frontier = vec![source];
        let mut depth = 0u32;

        while !frontier.is_empty() && depth < max_depth {
            depth += 1;
            let mut next: Vec<EntityId> = Vec::new();
            for &node in &frontier {
                let node_kinds = reached[&node].1.clone();
                for adj in self.neighbors(node, direction) {
                    let kind = self.snapshot.edge(adj.edge).kind.clone();
                    match reached.get_mut(&adj.other) {
                        Some((d, _)) if *d < depth => {}
                        Some((_, kinds)) => {
                            kinds.extend(node_kinds.iter().cloned());
                            kinds.insert(kind);
                        }
                        None => {
                            let mut kinds = node_kinds.clone();
                            kinds.insert(kind);
                            reached.insert(adj.other, (depth, kinds));
                            next.push(adj.other);
                        }
                    }
                }
            }
            frontier = next;
        }

        // frontier still live at max_depth with unvisited neighbors -> partial
        let truncated = frontier.iter().any(|&node| {
            self.neighbors(node, direction)
                .iter()
                .any(|adj| !reached.contains_key(&adj.other))
        });

        let mut rows: Vec<ClosureEntry> = reached
            .into_iter()
            .filter(|(_, (d, _))| *d > 0)
            .map(|(target, (depth, relation_kinds))| ClosureEntry {
                source,
                target,
                depth,
                relation_kinds,
            })
            .collect();
        rows.sort_by_key(|e| (e.depth, e.target));

        (source, rows, truncated)
    }
}
