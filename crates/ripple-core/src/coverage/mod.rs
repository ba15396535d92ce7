//! Coverage Analyzer Module
//!
//! Answers: "which structurally related variants of a treated target
//! remain untreated, and does anyone actually call them?" Gaps are graded
//! High / Medium / Low against a relevant-type allowlist derived from the
//! mutation ledger.

mod types;
mod analyzer;

pub use types::*;
pub use analyzer::CoverageAnalyzer;
