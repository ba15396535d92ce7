//! Query-surface errors
//!
//! Absent names are valid empty results, truncation is a result flag, and
//! malformed facts are stored flagged; only ambiguity is an error, because
//! it needs a caller decision and must never be resolved by guessing.

use crate::model::EntityRef;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("ambiguous name '{name}': {} candidates, disambiguate by kind", candidates.len())]
    Ambiguous {
        name: String,
        candidates: Vec<EntityRef>,
    },
}
