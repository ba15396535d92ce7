//! Query engine - the surface exposed to the CLI/report layer
//!
//! Holds the frozen snapshot, the mutation ledger, and both closure
//! directions. Every operation is `&self` over immutable state, so
//! independent read-only queries are safe to run concurrently. All
//! identifier inputs accept name-only lookups; ambiguity is surfaced as
//! the full candidate set, never guessed away.

use rustc_hash::FxHashSet;

use super::types::*;
use crate::closure::{ClosureEngine, ClosureOptions, ClosureTable, Direction};
use crate::coverage::{CoverageAnalyzer, CoverageResult};
use crate::error::QueryError;
use crate::ledger::{classify, ConflictReport, MutationLedger};
use crate::model::{EntityId, EntityRef, Lookup, Snapshot};
use crate::paths::{PathFinder, PathOptions, PathResult};

/// Read-only query engine over one build's snapshot
pub struct QueryEngine {
    snapshot: Snapshot,
    ledger: MutationLedger,
    downstream: ClosureTable,
    upstream: ClosureTable,
}

impl QueryEngine {
    pub fn new(snapshot: Snapshot, ledger: MutationLedger) -> Self {
        Self::with_options(snapshot, ledger, &ClosureOptions::default())
    }

    pub fn with_options(
        snapshot: Snapshot,
        ledger: MutationLedger,
        options: &ClosureOptions,
    ) -> Self {
        let engine = ClosureEngine::new(&snapshot);
        let downstream = engine.compute(Direction::Downstream, options);
        let upstream = engine.compute(Direction::Upstream, options);
        Self {
            snapshot,
            ledger,
            downstream,
            upstream,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Transitive impact of a named entity in one direction
    pub fn impact(
        &self,
        kind: Option<&str>,
        name: &str,
        direction: Direction,
    ) -> Result<ImpactResult, QueryError> {
        let Some(origin) = self.resolve(kind, name)? else {
            return Ok(ImpactResult {
                origin: None,
                direction,
                entries: Vec::new(),
                truncated: false,
            });
        };

        let table = match direction {
            Direction::Downstream => &self.downstream,
            Direction::Upstream => &self.upstream,
        };

        let mut entries: Vec<ImpactEntry> = table
            .query(origin)
            .iter()
            .filter_map(|entry| {
                let target = self.snapshot.entity(entry.target)?;
                Some(ImpactEntry {
                    kind: target.kind.clone(),
                    name: target.name.clone(),
                    depth: entry.depth,
                    relation_kinds: entry.relation_kinds.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| (a.depth, &a.name).cmp(&(b.depth, &b.name)));

        let origin_entity = self.snapshot.entity(origin).map(EntityRef::of);
        Ok(ImpactResult {
            origin: origin_entity,
            direction,
            entries,
            truncated: table.truncated(origin),
        })
    }

    /// Shortest directed path between two named entities
    pub fn path(&self, from: &str, to: &str) -> Result<Option<PathResult>, QueryError> {
        let (Some(from_id), Some(to_id)) = (self.resolve(None, from)?, self.resolve(None, to)?)
        else {
            return Ok(None);
        };
        let finder = PathFinder::new(&self.snapshot);
        Ok(Some(finder.find(from_id, to_id, &PathOptions::default())))
    }

    /// Conflict groups over the mutation ledger
    pub fn conflicts(&self) -> ConflictReport {
        classify(&self.ledger)
    }

    /// Coverage gaps for a treated set given by method names.
    ///
    /// Names matching nothing are skipped (valid empty treatment), and
    /// the relevant-type allowlist is derived from the ledger.
    pub fn coverage(&self, treated_names: &[&str]) -> Result<CoverageResult, QueryError> {
        let mut treated: FxHashSet<EntityId> = FxHashSet::default();
        for name in treated_names {
            if let Some(id) = self.resolve(Some("method"), name)? {
                treated.insert(id);
            }
        }
        let allowlist = CoverageAnalyzer::relevant_types(&self.snapshot, &self.ledger);
        let analyzer = CoverageAnalyzer::new(&self.snapshot);
        Ok(analyzer.analyze(&treated, &allowlist))
    }

    /// Resolve a name to at most one entity. `None` kind searches across
    /// all kinds. Absent names resolve to `Ok(None)`; multiple matches
    /// are an explicit error carrying every candidate.
    fn resolve(&self, kind: Option<&str>, name: &str) -> Result<Option<EntityId>, QueryError> {
        let lookup = match kind {
            Some(kind) => self.snapshot.lookup(kind, name),
            None => self.snapshot.lookup_name(name),
        };
        match lookup {
            Lookup::None => Ok(None),
            Lookup::One(id) => Ok(Some(id)),
            Lookup::Many(ids) => Err(QueryError::Ambiguous {
                name: name.to_string(),
                candidates: ids
                    .iter()
                    .filter_map(|&id| self.snapshot.entity(id).map(EntityRef::of))
                    .collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{CodeFact, DocFact, Ingestor};
    use crate::ledger::{Classification, OperationKind};

    fn call(caller: &str, callee: &str) -> CodeFact {
        CodeFact::Call {
            caller: caller.to_string(),
            callee: callee.to_string(),
            location: None,
        }
    }

    fn sample_engine() -> QueryEngine {
        let mut ingestor = Ingestor::new();
        ingestor.ingest_code(call("A.Run", "B.Run"));
        ingestor.ingest_code(call("B.Run", "C.Run"));
        ingestor.ingest_code(call("C.Run", "D.Run"));
        ingestor.ingest_doc(DocFact::Definition {
            kind: "item".to_string(),
            name: "gunPistol".to_string(),
            extends: None,
            location: None,
        });
        ingestor.ingest_doc(DocFact::Mutation {
            actor: "ModA".to_string(),
            target_kind: "item".to_string(),
            selector: "/items/item[@name='gunPistol']".to_string(),
            operation: OperationKind::Set,
            payload: "12".to_string(),
        });
        ingestor.ingest_doc(DocFact::Mutation {
            actor: "ModB".to_string(),
            target_kind: "item".to_string(),
            selector: "/items/item[@name='gunPistol']".to_string(),
            operation: OperationKind::Set,
            payload: "15".to_string(),
        });
        let (store, ledger) = ingestor.finish();
        QueryEngine::new(store.snapshot(), ledger)
    }

    #[test]
    fn test_impact_ranked_by_depth() {
        let engine = sample_engine();
        let result = engine.impact(None, "A.Run", Direction::Downstream).unwrap();
        assert_eq!(result.origin.as_ref().unwrap().name, "A.Run");
        let ranked: Vec<(u32, &str)> = result
            .entries
            .iter()
            .map(|e| (e.depth, e.name.as_str()))
            .collect();
        assert_eq!(ranked, vec![(1, "B.Run"), (2, "C.Run"), (3, "D.Run")]);
        assert!(!result.truncated);
    }

    #[test]
    fn test_impact_of_absent_name_is_empty() {
        let engine = sample_engine();
        let result = engine.impact(None, "Nope.Run", Direction::Upstream).unwrap();
        assert!(result.origin.is_none());
        assert!(result.entries.is_empty());
    }

    #[test]
    fn test_path_length_matches_closure_depth() {
        let engine = sample_engine();
        let path = engine.path("A.Run", "D.Run").unwrap().unwrap();
        assert_eq!(path.depth(), Some(3));
        let impact = engine.impact(None, "A.Run", Direction::Downstream).unwrap();
        let closure_depth = impact
            .entries
            .iter()
            .find(|e| e.name == "D.Run")
            .map(|e| e.depth);
        assert_eq!(path.depth(), closure_depth);
    }

    #[test]
    fn test_conflicts_through_engine() {
        let engine = sample_engine();
        let report = engine.conflicts();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].classification, Classification::Conflict);
    }

    #[test]
    fn test_ambiguous_name_surfaces_candidates() {
        let mut ingestor = Ingestor::new();
        ingestor.ingest_doc(DocFact::Definition {
            kind: "item".to_string(),
            name: "ammo".to_string(),
            extends: None,
            location: None,
        });
        ingestor.ingest_doc(DocFact::Definition {
            kind: "block".to_string(),
            name: "ammo".to_string(),
            extends: None,
            location: None,
        });
        let (store, ledger) = ingestor.finish();
        let engine = QueryEngine::new(store.snapshot(), ledger);

        let err = engine
            .impact(None, "ammo", Direction::Downstream)
            .unwrap_err();
        let QueryError::Ambiguous { name, candidates } = err;
        assert_eq!(name, "ammo");
        assert_eq!(candidates.len(), 2);
        // disambiguating by kind succeeds
        assert!(engine.impact(Some("item"), "ammo", Direction::Downstream).is_ok());
    }

    #[test]
    fn test_coverage_end_to_end() {
        // Base.M is patched (treated), Derived.M overrides it without
        // delegating, and a Derived-typed caller reaches Derived.M
        let mut ingestor = Ingestor::new();
        ingestor.ingest_code(CodeFact::Type {
            name: "Base".to_string(),
            base: None,
            location: None,
        });
        ingestor.ingest_code(CodeFact::Type {
            name: "Derived".to_string(),
            base: Some("Base".to_string()),
            location: None,
        });
        ingestor.ingest_code(CodeFact::Method {
            owner: "Base".to_string(),
            name: "M".to_string(),
            signature: "M()".to_string(),
            is_override: false,
            is_virtual: true,
            is_abstract: false,
            location: None,
        });
        ingestor.ingest_code(CodeFact::Method {
            owner: "Derived".to_string(),
            name: "M".to_string(),
            signature: "M()".to_string(),
            is_override: true,
            is_virtual: false,
            is_abstract: false,
            location: None,
        });
        ingestor.ingest_code(call("Derived.Tick", "Derived.M"));
        ingestor.ingest_code(CodeFact::PatchTarget {
            actor: "ModA".to_string(),
            target_type: "Base".to_string(),
            target_method: "M".to_string(),
            operation: OperationKind::BeforeHook,
            priority: 400,
        });
        // a second exact mutation keying on the Derived type puts it in
        // the relevant-type allowlist
        ingestor.ingest_doc(DocFact::Mutation {
            actor: "ModA".to_string(),
            target_kind: "type".to_string(),
            selector: "Derived".to_string(),
            operation: OperationKind::CodeRewrite,
            payload: String::new(),
        });
        let (store, ledger) = ingestor.finish();
        let engine = QueryEngine::new(store.snapshot(), ledger);

        let result = engine.coverage(&["Base.M"]).unwrap();
        assert_eq!(result.gaps.len(), 1);
        let gap = &result.gaps[0];
        assert_eq!(gap.severity, crate::coverage::Severity::High);
        let candidate = engine.snapshot().entity(gap.candidate).unwrap();
        assert_eq!(candidate.name, "Derived.M");
    }

    #[test]
    fn test_rebuild_from_identical_facts_is_idempotent() {
        let a = sample_engine();
        let b = sample_engine();

        let impact_a = a.impact(None, "A.Run", Direction::Downstream).unwrap();
        let impact_b = b.impact(None, "A.Run", Direction::Downstream).unwrap();
        assert_eq!(impact_a.entries, impact_b.entries);

        let conflicts_a = a.conflicts();
        let conflicts_b = b.conflicts();
        assert_eq!(conflicts_a.groups.len(), conflicts_b.groups.len());
        for (ga, gb) in conflicts_a.groups.iter().zip(&conflicts_b.groups) {
            assert_eq!(ga.key, gb.key);
            assert_eq!(ga.classification, gb.classification);
            assert_eq!(ga.records, gb.records);
        }
    }
}
