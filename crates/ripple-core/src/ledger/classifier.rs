//! Conflict classifier
//!
//! Groups ledger records by canonical target key and classifies each
//! group. Pure function over the ledger snapshot: no shared state, safe
//! to recompute after upstream facts are corrected. Grouping and member
//! ordering use sorted containers, so the outcome is independent of the
//! order `record()` was called in.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use super::records::MutationLedger;
use super::types::*;

/// Classify all well-formed ledger records into conflict groups.
///
/// Conflict: some operation kind on the key is used by >= 2 distinct actors.
/// Caution: >= 2 distinct actors, but no operation kind shared between two.
/// Complementary groups are not reported; use [`classify_all`] to see them.
pub fn classify(ledger: &MutationLedger) -> ConflictReport {
    let mut groups_out = Vec::new();
    let mut fragile_out = Vec::new();

    for group in classify_all(ledger) {
        if group.key.fragile {
            // fragile selectors may match unpredictably many targets;
            // always surfaced, as a separate signal category
            fragile_out.push(group);
        } else if group.classification != Classification::Complementary {
            groups_out.push(group);
        }
    }

    let malformed_records = ledger.records().iter().filter(|r| r.malformed).count();

    ConflictReport {
        groups: groups_out,
        fragile: fragile_out,
        malformed_records,
    }
}

/// Group and classify every well-formed record, Complementary included
pub fn classify_all(ledger: &MutationLedger) -> Vec<ConflictGroup> {
    let mut by_key: BTreeMap<CanonicalKey, Vec<MutationRecord>> = BTreeMap::new();
    for record in ledger.records() {
        if record.malformed {
            continue;
        }
        by_key.entry(record.key.clone()).or_default().push(record.clone());
    }

    by_key
        .into_iter()
        .map(|(key, mut records)| {
            records.sort_by(|a, b| {
                (&a.actor, a.operation, &a.selector, &a.payload)
                    .cmp(&(&b.actor, b.operation, &b.selector, &b.payload))
            });

            let actors: Vec<String> = {
                let mut seen = FxHashSet::default();
                let mut out: Vec<String> = records
                    .iter()
                    .filter(|r| seen.insert(r.actor.clone()))
                    .map(|r| r.actor.clone())
                    .collect();
                out.sort();
                out
            };

            let classification = classify_group(&actors, &records);

            ConflictGroup {
                key,
                classification,
                actors,
                records,
            }
        })
        .collect()
}

fn classify_group(actors: &[String], records: &[MutationRecord]) -> Classification {
    if actors.len() < 2 {
        return Classification::Complementary;
    }
    // Conflict as soon as any single operation kind is used by two
    // distinct actors; extra actors with other operations never weaken
    // that collision to Caution
    let mut actors_by_op: FxHashMap<OperationKind, FxHashSet<&str>> = FxHashMap::default();
    for record in records {
        actors_by_op
            .entry(record.operation)
            .or_default()
            .insert(record.actor.as_str());
    }
    if actors_by_op.values().any(|actors| actors.len() >= 2) {
        Classification::Conflict
    } else {
        Classification::Caution
    }
}
