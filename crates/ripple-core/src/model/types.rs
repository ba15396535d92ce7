//! Fact store types
//!
//! Core data structures for the entity/relation fact graph.

use serde::{Deserialize, Serialize};

/// Unique entity identifier, stable within one build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which frontend produced a fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    CodeAnalysis,
    Document,
    EventWiring,
}

/// Advisory source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

/// A typed, named node in the fact graph
///
/// Entities are immutable after creation within a build; they are created
/// during ingestion and discarded on the next full rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Kind tag: "method", "type", "item", "event", ...
    pub kind: String,
    /// Name, not required unique across kinds
    pub name: String,
    /// Weak, non-owning parent/extends reference (owning type, base name)
    pub parent: Option<String>,
    pub origin: Origin,
    pub location: Option<SourceLocation>,
    /// Set when required fields were missing in the source fact.
    /// Malformed entities stay queryable but are skipped by the
    /// conflict and coverage analyzers.
    pub malformed: bool,
}

/// Edge target: a concrete entity id or a not-yet-resolved name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetRef {
    Id(EntityId),
    Name(String),
}

/// A typed, directed edge from an entity to a (possibly unresolved) target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub source: EntityId,
    pub target_kind: String,
    pub target: TargetRef,
    /// Relation kind tag, see [`crate::model::relation`]
    pub kind: String,
    pub context: String,
    pub origin: Origin,
}

/// Lookup result for a (kind, name) or name-only query
///
/// Ambiguous matches are returned as the full candidate set, never
/// silently resolved to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lookup {
    None,
    One(EntityId),
    Many(Vec<EntityId>),
}

impl Lookup {
    /// All candidate ids, empty for `None`
    pub fn candidates(&self) -> Vec<EntityId> {
        match self {
            Lookup::None => Vec::new(),
            Lookup::One(id) => vec![*id],
            Lookup::Many(ids) => ids.clone(),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Lookup::Many(_))
    }
}

/// Lightweight entity reference used in query results and errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub kind: String,
    pub name: String,
}

impl EntityRef {
    pub fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind.clone(),
            name: entity.name.clone(),
        }
    }
}

/// Relation kind tags used by the ingestion layer
pub mod relation {
    pub const CALLS: &str = "calls";
    pub const EXTENDS: &str = "extends";
    pub const OVERRIDES: &str = "overrides";
    pub const OVERLOADS: &str = "overloads";
    pub const REFERENCES: &str = "references";
    pub const PROPERTY: &str = "property";
    pub const SUBSCRIBES: &str = "subscribes";
    pub const FIRES: &str = "fires";
    pub const PATCHES: &str = "patches";
}
