//! Query Module
//!
//! The read-only surface the CLI/report layer talks to: impact, path,
//! conflict, and coverage queries over one immutable build snapshot.

mod types;
mod engine;

pub use types::*;
pub use engine::QueryEngine;
