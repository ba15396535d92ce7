//! Immutable graph snapshot
//!
//! Built once after ingestion completes; every query component takes a
//! `&Snapshot` instead of reaching for implicit global state. Target names
//! left unresolved during ingestion are resolved here; ambiguous names fan
//! out to every candidate, names with no match contribute no adjacency but
//! stay visible through [`Snapshot::edges`].

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use super::store::FactStore;
use super::types::*;

/// One resolved adjacency hop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacency {
    /// The entity on the other end of the edge
    pub other: EntityId,
    /// Index into [`Snapshot::edges`] for relation kind and context
    pub edge: u32,
}

/// Read-only view of the fact graph with precomputed adjacency
#[derive(Debug)]
pub struct Snapshot {
    entities: Vec<Entity>,
    edges: Vec<Relation>,
    forward: Vec<Vec<Adjacency>>,
    reverse: Vec<Vec<Adjacency>>,
    name_index: FxHashMap<(String, String), SmallVec<[EntityId; 2]>>,
    by_name: FxHashMap<String, SmallVec<[EntityId; 2]>>,
}

impl Snapshot {
    /// Freeze a fully ingested store into a queryable snapshot
    pub fn build(store: FactStore) -> Self {
        let mut name_index: FxHashMap<(String, String), SmallVec<[EntityId; 2]>> =
            FxHashMap::default();
        let mut by_name: FxHashMap<String, SmallVec<[EntityId; 2]>> = FxHashMap::default();
        for entity in store.entities() {
            if entity.name.is_empty() {
                continue;
            }
            if !entity.kind.is_empty() {
                name_index
                    .entry((entity.kind.clone(), entity.name.clone()))
                    .or_default()
                    .push(entity.id);
            }
            by_name
                .entry(entity.name.clone())
                .or_default()
                .push(entity.id);
        }

        let n = store.entity_count();
        let mut forward: Vec<Vec<Adjacency>> = vec![Vec::new(); n];
        let mut reverse: Vec<Vec<Adjacency>> = vec![Vec::new(); n];
        let mut unresolved = 0usize;

        for (idx, edge) in store.edges().iter().enumerate() {
            let targets: SmallVec<[EntityId; 2]> = match &edge.target {
                TargetRef::Id(id) if id.index() < n => SmallVec::from_slice(&[*id]),
                TargetRef::Id(_) => SmallVec::new(),
                TargetRef::Name(name) => {
                    let hits = if edge.target_kind.is_empty() {
                        by_name.get(name)
                    } else {
                        name_index.get(&(edge.target_kind.clone(), name.clone()))
                    };
                    hits.cloned().unwrap_or_default()
                }
            };
            if targets.is_empty() {
                unresolved += 1;
            }
            for target in targets {
                let adj = Adjacency {
                    other: target,
                    edge: idx as u32,
                };
                forward[edge.source.index()].push(adj);
                reverse[target.index()].push(Adjacency {
                    other: edge.source,
                    edge: idx as u32,
                });
            }
        }

        debug!(
            entities = n,
            edges = store.edge_count(),
            unresolved, "snapshot built"
        );

        let (entities, edges) = store.into_parts();
        Self {
            entities,
            edges,
            forward,
            reverse,
            name_index,
            by_name,
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn edges(&self) -> &[Relation] {
        &self.edges
    }

    pub fn edge(&self, idx: u32) -> &Relation {
        &self.edges[idx as usize]
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Outgoing resolved edges of an entity
    pub fn out_edges(&self, id: EntityId) -> &[Adjacency] {
        self.forward.get(id.index()).map_or(&[], Vec::as_slice)
    }

    /// Incoming resolved edges of an entity
    pub fn in_edges(&self, id: EntityId) -> &[Adjacency] {
        self.reverse.get(id.index()).map_or(&[], Vec::as_slice)
    }

    pub fn lookup(&self, kind: &str, name: &str) -> Lookup {
        match self.name_index.get(&(kind.to_string(), name.to_string())) {
            None => Lookup::None,
            Some(ids) if ids.len() == 1 => Lookup::One(ids[0]),
            Some(ids) => Lookup::Many(ids.to_vec()),
        }
    }

    pub fn lookup_name(&self, name: &str) -> Lookup {
        match self.by_name.get(name) {
            None => Lookup::None,
            Some(ids) if ids.len() == 1 => Lookup::One(ids[0]),
            Some(ids) => Lookup::Many(ids.to_vec()),
        }
    }
}
