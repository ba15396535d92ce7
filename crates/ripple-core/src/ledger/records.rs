//! Append-only mutation ledger
//!
//! Records every actor's attempted change to a shared target, from all
//! mutating frontends. Selector canonicalization happens at record time;
//! malformed records are kept for inspection but never abort ingestion.

use tracing::warn;

use super::canonical::canonicalize;
use super::types::*;

/// Append-only ledger of mutation records for one build
#[derive(Debug, Default)]
pub struct MutationLedger {
    records: Vec<MutationRecord>,
}

impl MutationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mutation. Never fails; missing actor or selector marks
    /// the record malformed.
    pub fn record(
        &mut self,
        actor: &str,
        target_kind: &str,
        selector: &str,
        operation: OperationKind,
        payload: &str,
        priority: Option<i32>,
    ) {
        let malformed = actor.is_empty() || selector.trim().is_empty();
        if malformed {
            warn!(actor, selector, "malformed mutation fact, storing flagged");
        }
        let key = canonicalize(target_kind, selector);
        self.records.push(MutationRecord {
            actor: actor.to_string(),
            target_kind: target_kind.to_string(),
            selector: selector.to_string(),
            operation,
            payload: payload.to_string(),
            priority,
            key,
            malformed,
        });
    }

    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
