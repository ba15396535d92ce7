//! Extracted fact shapes consumed from the frontends
//!
//! These are the interface boundary to the external extractors: the
//! code-analysis frontend, the structured-document frontend, and the
//! event-wiring frontend. Nothing here is validated; missing fields are
//! passed through and flagged downstream.

use serde::{Deserialize, Serialize};

use crate::ledger::OperationKind;
use crate::model::SourceLocation;

/// Facts from the code-analysis frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "kebab-case")]
pub enum CodeFact {
    Method {
        /// Owning type name
        owner: String,
        /// Member name, unqualified
        name: String,
        signature: String,
        is_override: bool,
        is_virtual: bool,
        is_abstract: bool,
        location: Option<SourceLocation>,
    },
    Type {
        name: String,
        base: Option<String>,
        location: Option<SourceLocation>,
    },
    Call {
        /// Qualified caller, "Type.Method"
        caller: String,
        /// Qualified callee; may not resolve to a known method
        callee: String,
        location: Option<SourceLocation>,
    },
    PatchTarget {
        actor: String,
        target_type: String,
        target_method: String,
        operation: OperationKind,
        priority: i32,
    },
}

/// Facts from the structured-document frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "kebab-case")]
pub enum DocFact {
    Definition {
        kind: String,
        name: String,
        extends: Option<String>,
        location: Option<SourceLocation>,
    },
    Property {
        definition_kind: String,
        definition: String,
        name: String,
        value: String,
        nested_class: Option<String>,
    },
    Reference {
        definition_kind: String,
        definition: String,
        target_kind: String,
        target: String,
        context: String,
    },
    Mutation {
        actor: String,
        target_kind: String,
        /// Raw target selector string, canonicalized by the ledger
        selector: String,
        operation: OperationKind,
        payload: String,
    },
}

/// Facts from the event-wiring frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "kebab-case")]
pub enum EventFact {
    Subscription {
        subscriber_type: String,
        subscriber_method: String,
        event_owner: String,
        event_name: String,
    },
    Fire {
        source_type: String,
        source_method: String,
        event_owner: String,
        event_name: String,
        conditional: bool,
    },
}
