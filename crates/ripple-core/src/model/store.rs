//! Append-only fact store
//!
//! Single-writer during ingestion; frozen into a [`Snapshot`](super::Snapshot)
//! before any query runs. No domain validation happens here: malformed input
//! is stored with empty fields and the `malformed` flag, never rejected.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::warn;

use super::types::*;

/// Append-only store of entities and relations for one build
#[derive(Debug, Default)]
pub struct FactStore {
    entities: Vec<Entity>,
    edges: Vec<Relation>,
    /// (kind, name) -> entity ids
    name_index: FxHashMap<(String, String), SmallVec<[EntityId; 2]>>,
    /// name -> entity ids across all kinds
    by_name: FxHashMap<String, SmallVec<[EntityId; 2]>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, idempotent per (kind, name) within a build.
    ///
    /// The first writer wins on identity; later writers only fill in
    /// attributes that are still unset (parent, location). Empty kind or
    /// name marks the entity malformed but never fails.
    pub fn add_entity(
        &mut self,
        kind: &str,
        name: &str,
        parent: Option<String>,
        origin: Origin,
        location: Option<SourceLocation>,
    ) -> EntityId {
        let malformed = kind.is_empty() || name.is_empty();
        if malformed {
            warn!(kind, name, "malformed entity fact, storing flagged");
        }

        if !malformed {
            if let Some(ids) = self.name_index.get(&(kind.to_string(), name.to_string())) {
                let id = ids[0];
                let existing = &mut self.entities[id.index()];
                if existing.parent.is_none() {
                    existing.parent = parent;
                }
                if existing.location.is_none() {
                    existing.location = location;
                }
                return id;
            }
        }

        let id = EntityId::new(self.entities.len() as u32);
        self.entities.push(Entity {
            id,
            kind: kind.to_string(),
            name: name.to_string(),
            parent,
            origin,
            location,
            malformed,
        });

        if !name.is_empty() {
            if !kind.is_empty() {
                self.name_index
                    .entry((kind.to_string(), name.to_string()))
                    .or_default()
                    .push(id);
            }
            self.by_name.entry(name.to_string()).or_default().push(id);
        }

        id
    }

    /// Record an edge. Always stored, even with an unresolved target name.
    pub fn add_edge(
        &mut self,
        source: EntityId,
        target_kind: &str,
        target: TargetRef,
        relation_kind: &str,
        context: &str,
        origin: Origin,
    ) {
        self.edges.push(Relation {
            source,
            target_kind: target_kind.to_string(),
            target,
            kind: relation_kind.to_string(),
            context: context.to_string(),
            origin,
        });
    }

    /// Look up entities by (kind, name)
    pub fn lookup(&self, kind: &str, name: &str) -> Lookup {
        match self.name_index.get(&(kind.to_string(), name.to_string())) {
            None => Lookup::None,
            Some(ids) if ids.len() == 1 => Lookup::One(ids[0]),
            Some(ids) => Lookup::Many(ids.to_vec()),
        }
    }

    /// Name-only lookup across all kinds
    pub fn lookup_name(&self, name: &str) -> Lookup {
        match self.by_name.get(name) {
            None => Lookup::None,
            Some(ids) if ids.len() == 1 => Lookup::One(ids[0]),
            Some(ids) => Lookup::Many(ids.to_vec()),
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

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Consume the store, handing its data to the snapshot builder
    pub(crate) fn into_parts(self) -> (Vec<Entity>, Vec<Relation>) {
        (self.entities, self.edges)
    }

    /// Freeze this store into an immutable queryable snapshot
    pub fn snapshot(self) -> super::Snapshot {
        super::Snapshot::build(self)
    }
}
