//! Query surface types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::closure::Direction;
use crate::model::EntityRef;

/// One ranked impact finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactEntry {
    pub kind: String,
    pub name: String,
    pub depth: u32,
    pub relation_kinds: BTreeSet<String>,
}

/// Result of an impact query
///
/// `origin: None` means the queried name matched nothing; a valid empty
/// result, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactResult {
    pub origin: Option<EntityRef>,
    pub direction: Direction,
    /// Ranked by depth, then name
    pub entries: Vec<ImpactEntry>,
    /// Traversal hit max depth before the frontier was exhausted
    pub truncated: bool,
}
