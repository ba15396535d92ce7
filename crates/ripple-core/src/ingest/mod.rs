//! Ingestion Module
//!
//! Interface boundary to the external extractors. Typed fact shapes for
//! the code-analysis, structured-document, and event-wiring frontends,
//! plus the single-writer `Ingestor` that folds them into the fact store
//! and mutation ledger and derives structural edges at the end.

mod facts;
mod ingestor;

pub use facts::{CodeFact, DocFact, EventFact};
pub use ingestor::Ingestor;
