//! Mutation Ledger & Conflict Classifier Module
//!
//! Answers: "which actors modify the same target, and incompatibly?"
//!
//! Key components:
//! - `MutationLedger` - Append-only (actor, selector, operation, payload) records
//! - `canonicalize` - Selector normalization to canonical target keys
//! - `classify` - Conflict / Caution / Complementary grouping, plus the
//!   separate fragile-selector signal

mod types;
mod canonical;
mod records;
mod classifier;

pub use types::*;
pub use canonical::canonicalize;
pub use records::MutationLedger;
pub use classifier::{classify, classify_all};
