//! Path finder - Bounded shortest-path BFS
//!
//! Plain BFS from the source; the current partial path suppresses
//! revisiting any node already on it, which keeps the search cycle-safe
//! without a global visited set (tied alternatives may share interior
//! nodes). The search stops at the depth of first discovery, which BFS
//! guarantees is a shortest path by hop count.

use std::collections::VecDeque;

use super::types::*;
use crate::model::{EntityId, Snapshot};

/// Shortest-path finder over an immutable snapshot
pub struct PathFinder<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> PathFinder<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Find the shortest directed path(s) from `from` to `to`.
    ///
    /// Returns up to `options.max_paths` depth-tied alternatives, never an
    /// exhaustive enumeration. Ties are broken by edge discovery order
    /// from the fact store.
    pub fn find(&self, from: EntityId, to: EntityId, options: &PathOptions) -> PathResult {
        let mut paths: Vec<Vec<PathStep>> = Vec::new();
        let mut found_depth: Option<u32> = None;
        let mut truncated = false;

        let mut queue: VecDeque<(EntityId, Vec<PathStep>)> = VecDeque::new();
        queue.push_back((from, Vec::new()));

        while let Some((node, path)) = queue.pop_front() {
            let depth = path.len() as u32;
            if let Some(found) = found_depth {
                // deeper levels cannot tie the shortest path
                if depth + 1 > found {
                    break;
                }
            }
            if depth >= options.max_depth {
                if !self.snapshot.out_edges(node).is_empty() {
                    truncated = true;
                }
                continue;
            }

            for adj in self.snapshot.out_edges(node) {
                let next = adj.other;
                // cycle suppression: never revisit a node on the current path
                if next == from || path.iter().any(|step| step.to == next) {
                    continue;
                }
                let edge = self.snapshot.edge(adj.edge);
                let mut next_path = path.clone();
                next_path.push(PathStep {
                    from: node,
                    to: next,
                    relation_kind: edge.kind.clone(),
                    context: edge.context.clone(),
                });

                if next == to {
                    found_depth.get_or_insert(depth + 1);
                    if paths.len() < options.max_paths {
                        paths.push(next_path);
                    }
                    continue;
                }
                queue.push_back((next, next_path));
            }
        }

        PathResult {
            from,
            to,
            paths,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{relation, FactStore, Origin, TargetRef};

    fn linked(edges: &[(u32, u32)], nodes: u32) -> Snapshot {
        let mut store = FactStore::new();
        let ids: Vec<EntityId> = (0..nodes)
            .map(|i| {
                store.add_entity(
                    "method",
                    &format!("T{i}.Run"),
                    None,
                    Origin::CodeAnalysis,
                    None,
                )
            })
            .collect();
        for &(src, dst) in edges {
            store.add_edge(
                ids[src as usize],
                "method",
                TargetRef::Id(ids[dst as usize]),
                relation::CALLS,
                "",
                Origin::CodeAnalysis,
            );
        }
        store.snapshot()
    }

    fn id(snapshot: &Snapshot, i: u32) -> EntityId {
        snapshot.lookup("method", &format!("T{i}.Run")).candidates()[0]
    }

    #[test]
    fn test_chain_path_in_order() {
        // A -> B -> C -> D with no shortcut
        let snapshot = linked(&[(0, 1), (1, 2), (2, 3)], 4);
        let finder = PathFinder::new(&snapshot);
        let result = finder.find(id(&snapshot, 0), id(&snapshot, 3), &PathOptions::default());

        assert!(result.found());
        assert_eq!(result.depth(), Some(3));
        let hops: Vec<(EntityId, EntityId)> =
            result.paths[0].iter().map(|s| (s.from, s.to)).collect();
        assert_eq!(
            hops,
            vec![
                (id(&snapshot, 0), id(&snapshot, 1)),
                (id(&snapshot, 1), id(&snapshot, 2)),
                (id(&snapshot, 2), id(&snapshot, 3)),
            ]
        );
    }

    #[test]
    fn test_unreachable_is_empty_not_error() {
        let snapshot = linked(&[(0, 1)], 3);
        let finder = PathFinder::new(&snapshot);
        let result = finder.find(id(&snapshot, 2), id(&snapshot, 0), &PathOptions::default());
        assert!(!result.found());
        assert_eq!(result.depth(), None);
    }

    #[test]
    fn test_cycle_does_not_hang() {
        let snapshot = linked(&[(0, 1), (1, 0), (1, 2)], 3);
        let finder = PathFinder::new(&snapshot);
        let result = finder.find(id(&snapshot, 0), id(&snapshot, 2), &PathOptions::default());
        assert_eq!(result.depth(), Some(2));
    }

    #[test]
    fn test_tied_alternatives_bounded() {
        // diamond fan: 0 -> {1..8} -> 9, eight tied two-hop paths
        let edges: Vec<(u32, u32)> = (1..=8).flat_map(|m| [(0, m), (m, 9)]).collect();
        let snapshot = linked(&edges, 10);
        let finder = PathFinder::new(&snapshot);
        let result = finder.find(id(&snapshot, 0), id(&snapshot, 9), &PathOptions::default());

        assert_eq!(result.paths.len(), 5);
        assert!(result.paths.iter().all(|p| p.len() == 2));
        // deterministic tie-break: first alternative follows the first edge inserted
        assert_eq!(result.paths[0][0].to, id(&snapshot, 1));
    }

    #[test]
    fn test_shorter_path_wins() {
        let snapshot = linked(&[(0, 1), (1, 2), (0, 2)], 3);
        let finder = PathFinder::new(&snapshot);
        let result = finder.find(id(&snapshot, 0), id(&snapshot, 2), &PathOptions::default());
        assert_eq!(result.depth(), Some(1));
        assert_eq!(result.paths.len(), 1);
    }

    #[test]
    fn test_max_depth_truncation_flagged() {
        let snapshot = linked(&[(0, 1), (1, 2), (2, 3)], 4);
        let finder = PathFinder::new(&snapshot);
        let result = finder.find(
            id(&snapshot, 0),
            id(&snapshot, 3),
            &PathOptions {
                max_depth: 2,
                max_paths: 5,
            },
        );
        assert!(!result.found());
        assert!(result.truncated);
    }
}
