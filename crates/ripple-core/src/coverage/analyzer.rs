//! Coverage analyzer - Untreated structural siblings of treated entities
//!
//! Walks override/inheritance and overload-sibling edges from each treated
//! method to enumerate candidates, drops candidates that are treated,
//! provably delegate to a treated entity, or are dead code, and grades the
//! remainder by who calls them. Precision over recall: the goal is
//! actionable findings, not exhaustive theoretical coverage.

use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::types::*;
use crate::ledger::MutationLedger;
use crate::model::{relation, Entity, EntityId, Snapshot};

/// Coverage gap analyzer over an immutable snapshot
pub struct CoverageAnalyzer<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> CoverageAnalyzer<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Derive the relevant-type allowlist from the types touched by the
    /// ledger's actors: owning types of patched methods plus types named
    /// by exact canonical keys.
    pub fn relevant_types(snapshot: &Snapshot, ledger: &MutationLedger) -> FxHashSet<String> {
        let mut types = FxHashSet::default();
        for record in ledger.records() {
            if record.malformed || record.key.fragile {
                continue;
            }
            match record.key.kind.as_str() {
                "method" => {
                    if let Some((owner, _)) = record.key.name.rsplit_once('.') {
                        types.insert(owner.to_string());
                    }
                }
                "type" => {
                    types.insert(record.key.name.clone());
                }
                kind => {
                    // document keys count when they resolve to a typed entity
                    for id in snapshot.lookup(kind, &record.key.name).candidates() {
                        if let Some(entity) = snapshot.entity(id) {
                            if entity.kind == "type" {
                                types.insert(entity.name.clone());
                            }
                        }
                    }
                }
            }
        }
        types
    }

    /// Find untreated structural siblings of the treated set
    pub fn analyze(
        &self,
        treated: &FxHashSet<EntityId>,
        allowlist: &FxHashSet<String>,
    ) -> CoverageResult {
        let start = Instant::now();
        let mut gaps: Vec<CoverageGap> = Vec::new();
        let mut candidates_considered = 0usize;

        for &treated_id in treated {
            let Some(entity) = self.snapshot.entity(treated_id) else {
                continue;
            };
            if entity.malformed || entity.kind != "method" {
                continue;
            }

            let candidates = self.sibling_candidates(treated_id);
            candidates_considered += candidates.len();

            let mut reported: FxHashSet<EntityId> = FxHashSet::default();
            for (candidate_id, reason) in candidates {
                if treated.contains(&candidate_id) || !reported.insert(candidate_id) {
                    continue;
                }
                let Some(candidate) = self.snapshot.entity(candidate_id) else {
                    continue;
                };
                if candidate.malformed {
                    continue;
                }
                if self.delegates_to_treated(candidate_id, treated) {
                    continue;
                }

                let call_sites = self.incoming_call_sites(candidate_id);
                let (severity, call_sites) = if call_sites.is_empty() {
                    // no direct callers: only reportable when a treated
                    // base is still called, i.e. dynamic dispatch can
                    // land here
                    if self.dispatches_via_treated_base(candidate_id, treated) {
                        (Severity::Low, call_sites)
                    } else {
                        continue; // dead code is not a reportable gap
                    }
                } else {
                    let relevant: Vec<CallSiteRef> = call_sites
                        .iter()
                        .filter(|site| {
                            site.caller_type
                                .as_deref()
                                .is_some_and(|t| allowlist.contains(t))
                        })
                        .cloned()
                        .collect();
                    if relevant.is_empty() {
                        (Severity::Medium, call_sites)
                    } else {
                        // only the relevant call sites are reported;
                        // non-relevant callers did not drive the grade
                        (Severity::High, relevant)
                    }
                };

                gaps.push(CoverageGap {
                    treated: treated_id,
                    candidate: candidate_id,
                    reason,
                    call_sites,
                    severity,
                });
            }
        }

        gaps.sort_by(|a, b| {
            (a.severity, a.candidate, a.treated).cmp(&(b.severity, b.candidate, b.treated))
        });
        debug!(
            treated = treated.len(),
            gaps = gaps.len(),
            candidates_considered,
            "coverage analyzed"
        );

        CoverageResult {
            gaps,
            treated: treated.len(),
            candidates_considered,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Structural siblings of one treated method: override relatives in
    /// both directions, co-overriders of the same base, and overload
    /// siblings.
    fn sibling_candidates(&self, treated_id: EntityId) -> Vec<(EntityId, GapReason)> {
        let mut out: Vec<(EntityId, GapReason)> = Vec::new();

        for adj in self.snapshot.out_edges(treated_id) {
            match self.snapshot.edge(adj.edge).kind.as_str() {
                relation::OVERRIDES => {
                    // the base itself, plus everything else overriding it
                    out.push((adj.other, GapReason::MissingOverride));
                    for sibling in self.snapshot.in_edges(adj.other) {
                        if self.snapshot.edge(sibling.edge).kind == relation::OVERRIDES
                            && sibling.other != treated_id
                        {
                            out.push((sibling.other, GapReason::MissingOverride));
                        }
                    }
                }
                relation::OVERLOADS => out.push((adj.other, GapReason::MissingOverload)),
                _ => {}
            }
        }
        for adj in self.snapshot.in_edges(treated_id) {
            match self.snapshot.edge(adj.edge).kind.as_str() {
                relation::OVERRIDES => out.push((adj.other, GapReason::MissingOverride)),
                relation::OVERLOADS => out.push((adj.other, GapReason::MissingOverload)),
                _ => {}
            }
        }

        out
    }

    /// A direct call edge from the candidate to any treated entity is
    /// taken as proof of delegation
    fn delegates_to_treated(&self, candidate: EntityId, treated: &FxHashSet<EntityId>) -> bool {
        self.snapshot.out_edges(candidate).iter().any(|adj| {
            self.snapshot.edge(adj.edge).kind == relation::CALLS && treated.contains(&adj.other)
        })
    }

    fn incoming_call_sites(&self, candidate: EntityId) -> Vec<CallSiteRef> {
        self.snapshot
            .in_edges(candidate)
            .iter()
            .filter(|adj| self.snapshot.edge(adj.edge).kind == relation::CALLS)
            .map(|adj| {
                let caller_type = self
                    .snapshot
                    .entity(adj.other)
                    .and_then(owning_type);
                CallSiteRef {
                    caller: adj.other,
                    caller_type,
                    context: self.snapshot.edge(adj.edge).context.clone(),
                }
            })
            .collect()
    }

    /// Candidate overrides a treated base that real callers still reach
    fn dispatches_via_treated_base(
        &self,
        candidate: EntityId,
        treated: &FxHashSet<EntityId>,
    ) -> bool {
        self.snapshot.out_edges(candidate).iter().any(|adj| {
            self.snapshot.edge(adj.edge).kind == relation::OVERRIDES
                && treated.contains(&adj.other)
                && self
                    .snapshot
                    .in_edges(adj.other)
                    .iter()
                    .any(|call| self.snapshot.edge(call.edge).kind == relation::CALLS)
        })
    }
}

/// Owning type of a method entity: the parent reference when present,
/// the qualified-name prefix otherwise
fn owning_type(entity: &Entity) -> Option<String> {
    entity
        .parent
        .clone()
        .or_else(|| entity.name.rsplit_once('.').map(|(owner, _)| owner.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FactStore, Origin, TargetRef};

    struct Fixture {
        snapshot: Snapshot,
        base_m: EntityId,
        derived_m: EntityId,
        caller: EntityId,
    }

    /// Base.M treated, Derived.M overrides it, Caller.Run calls Derived.M
    fn override_fixture(caller_type: &str, delegate: bool) -> Fixture {
        let mut store = FactStore::new();
        let base_m = store.add_entity(
            "method",
            "Base.M",
            Some("Base".to_string()),
            Origin::CodeAnalysis,
            None,
        );
        let derived_m = store.add_entity(
            "method",
            "Derived.M",
            Some("Derived".to_string()),
            Origin::CodeAnalysis,
            None,
        );
        let caller = store.add_entity(
            "method",
            &format!("{caller_type}.Run"),
            Some(caller_type.to_string()),
            Origin::CodeAnalysis,
            None,
        );
        store.add_edge(
            derived_m,
            "method",
            TargetRef::Id(base_m),
            relation::OVERRIDES,
            "",
            Origin::CodeAnalysis,
        );
        store.add_edge(
            caller,
            "method",
            TargetRef::Id(derived_m),
            relation::CALLS,
            "game.cs:10",
            Origin::CodeAnalysis,
        );
        if delegate {
            store.add_edge(
                derived_m,
                "method",
                TargetRef::Id(base_m),
                relation::CALLS,
                "",
                Origin::CodeAnalysis,
            );
        }
        Fixture {
            snapshot: store.snapshot(),
            base_m,
            derived_m,
            caller,
        }
    }

    #[test]
    fn test_scenario_c_relevant_caller_is_high() {
        let fixture = override_fixture("Derived", false);
        let analyzer = CoverageAnalyzer::new(&fixture.snapshot);
        let treated: FxHashSet<EntityId> = [fixture.base_m].into_iter().collect();
        let allowlist: FxHashSet<String> = ["Derived".to_string()].into_iter().collect();

        let result = analyzer.analyze(&treated, &allowlist);
        assert_eq!(result.gaps.len(), 1);
        let gap = &result.gaps[0];
        assert_eq!(gap.candidate, fixture.derived_m);
        assert_eq!(gap.reason, GapReason::MissingOverride);
        assert_eq!(gap.severity, Severity::High);
        assert_eq!(gap.call_sites[0].caller, fixture.caller);
    }

    #[test]
    fn test_high_gap_reports_only_relevant_call_sites() {
        let mut fixture_store = FactStore::new();
        let base_m = fixture_store.add_entity(
            "method",
            "Base.M",
            Some("Base".to_string()),
            Origin::CodeAnalysis,
            None,
        );
        let derived_m = fixture_store.add_entity(
            "method",
            "Derived.M",
            Some("Derived".to_string()),
            Origin::CodeAnalysis,
            None,
        );
        let relevant = fixture_store.add_entity(
            "method",
            "Derived.Run",
            Some("Derived".to_string()),
            Origin::CodeAnalysis,
            None,
        );
        let unrelated = fixture_store.add_entity(
            "method",
            "Unrelated.Run",
            Some("Unrelated".to_string()),
            Origin::CodeAnalysis,
            None,
        );
        fixture_store.add_edge(
            derived_m,
            "method",
            TargetRef::Id(base_m),
            relation::OVERRIDES,
            "",
            Origin::CodeAnalysis,
        );
        for caller in [relevant, unrelated] {
            fixture_store.add_edge(
                caller,
                "method",
                TargetRef::Id(derived_m),
                relation::CALLS,
                "",
                Origin::CodeAnalysis,
            );
        }
        let snapshot = fixture_store.snapshot();

        let analyzer = CoverageAnalyzer::new(&snapshot);
        let treated: FxHashSet<EntityId> = [base_m].into_iter().collect();
        let allowlist: FxHashSet<String> = ["Derived".to_string()].into_iter().collect();

        let result = analyzer.analyze(&treated, &allowlist);
        assert_eq!(result.gaps.len(), 1);
        let gap = &result.gaps[0];
        assert_eq!(gap.severity, Severity::High);
        // the non-relevant caller did not drive the grade and is not reported
        assert_eq!(gap.call_sites.len(), 1);
        assert_eq!(gap.call_sites[0].caller, relevant);
    }

    #[test]
    fn test_non_relevant_caller_is_medium() {
        let fixture = override_fixture("Unrelated", false);
        let analyzer = CoverageAnalyzer::new(&fixture.snapshot);
        let treated: FxHashSet<EntityId> = [fixture.base_m].into_iter().collect();
        let allowlist: FxHashSet<String> = ["Derived".to_string()].into_iter().collect();

        let result = analyzer.analyze(&treated, &allowlist);
        assert_eq!(result.gaps.len(), 1);
        assert_eq!(result.gaps[0].severity, Severity::Medium);
    }

    #[test]
    fn test_delegating_candidate_excluded() {
        let fixture = override_fixture("Derived", true);
        let analyzer = CoverageAnalyzer::new(&fixture.snapshot);
        let treated: FxHashSet<EntityId> = [fixture.base_m].into_iter().collect();
        let allowlist: FxHashSet<String> = ["Derived".to_string()].into_iter().collect();

        let result = analyzer.analyze(&treated, &allowlist);
        assert!(result.gaps.is_empty());
    }

    #[test]
    fn test_uncalled_candidate_with_called_treated_base_is_low() {
        let mut store = FactStore::new();
        let base_m = store.add_entity("method", "Base.M", Some("Base".into()), Origin::CodeAnalysis, None);
        let derived_m = store.add_entity("method", "Derived.M", Some("Derived".into()), Origin::CodeAnalysis, None);
        let caller = store.add_entity("method", "Game.Tick", Some("Game".into()), Origin::CodeAnalysis, None);
        store.add_edge(derived_m, "method", TargetRef::Id(base_m), relation::OVERRIDES, "", Origin::CodeAnalysis);
        // only the base is called; the override is reachable through dispatch alone
        store.add_edge(caller, "method", TargetRef::Id(base_m), relation::CALLS, "", Origin::CodeAnalysis);
        let snapshot = store.snapshot();

        let analyzer = CoverageAnalyzer::new(&snapshot);
        let treated: FxHashSet<EntityId> = [base_m].into_iter().collect();
        let result = analyzer.analyze(&treated, &FxHashSet::default());

        assert_eq!(result.gaps.len(), 1);
        assert_eq!(result.gaps[0].severity, Severity::Low);
        assert!(result.gaps[0].call_sites.is_empty());
    }

    #[test]
    fn test_dead_code_not_reported() {
        let mut store = FactStore::new();
        let base_m = store.add_entity("method", "Base.M", Some("Base".into()), Origin::CodeAnalysis, None);
        let derived_m = store.add_entity("method", "Derived.M", Some("Derived".into()), Origin::CodeAnalysis, None);
        store.add_edge(derived_m, "method", TargetRef::Id(base_m), relation::OVERRIDES, "", Origin::CodeAnalysis);
        let snapshot = store.snapshot();

        let analyzer = CoverageAnalyzer::new(&snapshot);
        let treated: FxHashSet<EntityId> = [base_m].into_iter().collect();
        let result = analyzer.analyze(&treated, &FxHashSet::default());
        assert!(result.gaps.is_empty());
    }

    #[test]
    fn test_overload_sibling_reported() {
        let mut store = FactStore::new();
        let m1 = store.add_entity("method", "Gun.Fire", Some("Gun".into()), Origin::CodeAnalysis, None);
        let m2 = store.add_entity("method", "Gun.Fire#2", Some("Gun".into()), Origin::CodeAnalysis, None);
        let caller = store.add_entity("method", "Game.Tick", Some("Game".into()), Origin::CodeAnalysis, None);
        store.add_edge(m1, "method", TargetRef::Id(m2), relation::OVERLOADS, "", Origin::CodeAnalysis);
        store.add_edge(m2, "method", TargetRef::Id(m1), relation::OVERLOADS, "", Origin::CodeAnalysis);
        store.add_edge(caller, "method", TargetRef::Id(m2), relation::CALLS, "", Origin::CodeAnalysis);
        let snapshot = store.snapshot();

        let analyzer = CoverageAnalyzer::new(&snapshot);
        let treated: FxHashSet<EntityId> = [m1].into_iter().collect();
        let result = analyzer.analyze(&treated, &FxHashSet::default());

        assert_eq!(result.gaps.len(), 1);
        assert_eq!(result.gaps[0].reason, GapReason::MissingOverload);
        assert_eq!(result.gaps[0].severity, Severity::Medium);
    }

    #[test]
    fn test_relevant_types_from_ledger() {
        let snapshot = FactStore::new().snapshot();
        let mut ledger = MutationLedger::new();
        ledger.record("ModA", "method", "EntityPlayer.OnUpdate", crate::ledger::OperationKind::BeforeHook, "", Some(400));
        ledger.record("ModB", "type", "EntityZombie", crate::ledger::OperationKind::CodeRewrite, "", None);
        ledger.record("ModC", "item", "/items/item[contains(@name,'gun')]", crate::ledger::OperationKind::Set, "", None);

        let types = CoverageAnalyzer::relevant_types(&snapshot, &ledger);
        assert!(types.contains("EntityPlayer"));
        assert!(types.contains("EntityZombie"));
        // fragile keys contribute nothing
        assert_eq!(types.len(), 2);
    }
}
