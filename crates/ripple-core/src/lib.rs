//! ripple-core: Entity relationship and impact analysis engine
//!
//! This crate provides the analysis core for Ripple:
//! - Model: Typed entity/relation fact store and the frozen graph snapshot
//! - Closure: Bounded multi-hop reachability with minimal-depth tracking
//! - Paths: Shortest directed path search with cycle suppression
//! - Ledger: Mutation records, selector canonicalization, conflict classification
//! - Coverage: Untreated structural-sibling detection with severity grading
//! - Ingest: Typed fact intake from the code, document, and event frontends
//! - Query: The read-only impact/path/conflict/coverage surface
//!
//! Ingestion is single-writer and sequential; everything after
//! `FactStore::snapshot()` operates on immutable state and is safe to
//! call concurrently.

pub mod model;
pub mod closure;
pub mod paths;
pub mod ledger;
pub mod coverage;
pub mod ingest;
pub mod query;
pub mod error;

// Re-exports for convenience
pub use model::{
    Entity, EntityId, EntityRef, FactStore, Lookup, Origin, Relation, Snapshot, SourceLocation,
    TargetRef,
};
pub use closure::{
    ClosureEngine, ClosureEntry, ClosureOptions, ClosureStats, ClosureTable, Direction,
};
pub use paths::{PathFinder, PathOptions, PathResult, PathStep};
pub use ledger::{
    canonicalize, classify, classify_all, CanonicalKey, Classification, ConflictGroup,
    ConflictReport, MutationLedger, MutationRecord, OperationKind,
};
pub use coverage::{
    CallSiteRef, CoverageAnalyzer, CoverageGap, CoverageResult, GapReason, Severity,
};
pub use ingest::{CodeFact, DocFact, EventFact, Ingestor};
pub use query::{ImpactEntry, ImpactResult, QueryEngine};
pub use error::QueryError;
