//! Coverage analysis types

use serde::{Deserialize, Serialize};

use crate::model::EntityId;

/// Why a candidate counts as a structural sibling of a treated entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapReason {
    MissingOverride,
    MissingOverload,
}

/// Gap severity, graded by who calls the untreated candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// At least one caller's type is in the relevant-type allowlist
    High,
    /// Called, but only from non-relevant types
    Medium,
    /// Never called directly; reachable only through dynamic dispatch
    /// via an already-treated base
    Low,
}

/// A real call site into an untreated candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteRef {
    pub caller: EntityId,
    /// Owning type of the caller, when known
    pub caller_type: Option<String>,
    pub context: String,
}

/// A structurally related sibling of a treated entity that received no
/// corresponding treatment and is reachable from real call sites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageGap {
    pub treated: EntityId,
    pub candidate: EntityId,
    pub reason: GapReason,
    /// Call sites backing the grade: for [`Severity::High`] only callers
    /// whose type is in the relevant-type allowlist, otherwise every
    /// direct caller
    pub call_sites: Vec<CallSiteRef>,
    pub severity: Severity,
}

/// Result of a coverage analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageResult {
    /// Gaps sorted by severity, High first
    pub gaps: Vec<CoverageGap>,
    pub treated: usize,
    pub candidates_considered: usize,
    pub duration_ms: u64,
}
