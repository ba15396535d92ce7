//! Mutation ledger types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operation kind of a mutation, across both fact families:
/// code patch hooks and structured-document patch operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    // code patch hooks
    BeforeHook,
    AfterHook,
    CodeRewrite,
    FinalHook,
    // document patch operations
    Set,
    Append,
    InsertBefore,
    InsertAfter,
    Remove,
    RemoveAttribute,
    SetAttribute,
    ListAdd,
    ListRemove,
}

impl OperationKind {
    /// Wire name, matching the serde kebab-case form
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::BeforeHook => "before-hook",
            OperationKind::AfterHook => "after-hook",
            OperationKind::CodeRewrite => "code-rewrite",
            OperationKind::FinalHook => "final-hook",
            OperationKind::Set => "set",
            OperationKind::Append => "append",
            OperationKind::InsertBefore => "insert-before",
            OperationKind::InsertAfter => "insert-after",
            OperationKind::Remove => "remove",
            OperationKind::RemoveAttribute => "remove-attribute",
            OperationKind::SetAttribute => "set-attribute",
            OperationKind::ListAdd => "list-add",
            OperationKind::ListRemove => "list-remove",
        }
    }

    pub fn is_code_hook(self) -> bool {
        matches!(
            self,
            OperationKind::BeforeHook
                | OperationKind::AfterHook
                | OperationKind::CodeRewrite
                | OperationKind::FinalHook
        )
    }
}

/// Canonicalized mutation target used to group potential conflicts
///
/// Selectors carrying an exact-identity predicate reduce to
/// (kind, exact-name); selectors lacking one are kept as
/// normalized-but-unresolved strings and flagged fragile, meaning they
/// may match unpredictably many targets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalKey {
    pub kind: String,
    pub name: String,
    pub fragile: bool,
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fragile {
            write!(f, "{}:{} (fragile)", self.kind, self.name)
        } else {
            write!(f, "{}:{}", self.kind, self.name)
        }
    }
}

/// One actor's attempted change to a shared target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub actor: String,
    pub target_kind: String,
    /// Raw target selector as written by the actor
    pub selector: String,
    pub operation: OperationKind,
    pub payload: String,
    /// Advisory ordering hint from the code-patch frontend
    pub priority: Option<i32>,
    pub key: CanonicalKey,
    /// Missing actor or selector; kept for inspection, excluded from
    /// classification
    pub malformed: bool,
}

/// Conflict classification of a canonical-key group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Some operation kind used by two or more distinct actors
    Conflict,
    /// Two or more distinct actors, but no operation kind shared by two
    Caution,
    /// Single actor, or no overlap worth reporting
    Complementary,
}

/// All mutation records sharing a canonical target key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictGroup {
    pub key: CanonicalKey,
    pub classification: Classification,
    /// Distinct actors, sorted
    pub actors: Vec<String>,
    pub records: Vec<MutationRecord>,
}

impl ConflictGroup {
    /// The record expected to take effect given a caller-supplied total
    /// order over actors (load order; a later actor wins).
    ///
    /// The classifier never invents an ordering: actors absent from
    /// `actor_order` are ignored, and `None` means no member actor was
    /// ordered at all.
    pub fn winner<'a>(&'a self, actor_order: &[&str]) -> Option<&'a MutationRecord> {
        self.records
            .iter()
            .filter(|r| !r.malformed)
            .filter_map(|r| {
                actor_order
                    .iter()
                    .position(|a| *a == r.actor)
                    .map(|pos| (pos, r))
            })
            .max_by_key(|(pos, _)| *pos)
            .map(|(_, r)| r)
    }
}

/// Classifier output: exact-key groups and the separate fragile signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Conflict and Caution groups over exact canonical keys
    pub groups: Vec<ConflictGroup>,
    /// Groups keyed by fragile selectors, reported as their own signal
    /// category regardless of classification
    pub fragile: Vec<ConflictGroup>,
    /// Records excluded from classification for missing fields
    pub malformed_records: usize,
}
