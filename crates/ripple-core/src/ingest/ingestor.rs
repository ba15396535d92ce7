//! Fact ingestor
//!
//! Single-writer, sequential: consumes frontend facts, populates the fact
//! store and mutation ledger, and derives the structural edges (extends,
//! overrides, overload siblings) at `finish()`. No malformed fact aborts
//! ingestion; it degrades by flagging.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, info};

use super::facts::*;
use crate::ledger::MutationLedger;
use crate::model::{relation, EntityId, FactStore, Lookup, Origin, TargetRef};

/// One method identity within an overload group
#[derive(Debug)]
struct MethodSlot {
    signature: String,
    id: EntityId,
    is_override: bool,
}

/// Accumulates facts from all frontends into one consistent graph model
#[derive(Debug, Default)]
pub struct Ingestor {
    store: FactStore,
    ledger: MutationLedger,
    /// (owner, member) -> known overload slots, in arrival order
    methods: FxHashMap<(String, String), SmallVec<[MethodSlot; 2]>>,
}

impl Ingestor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest_code(&mut self, fact: CodeFact) {
        match fact {
            CodeFact::Method {
                owner,
                name,
                signature,
                is_override,
                location,
                ..
            } => {
                self.add_method(&owner, &name, &signature, is_override, location);
            }
            CodeFact::Type {
                name,
                base,
                location,
            } => {
                self.store
                    .add_entity("type", &name, base, Origin::CodeAnalysis, location);
            }
            CodeFact::Call {
                caller,
                callee,
                location,
            } => {
                // both ends of a call edge are known methods; materialize
                // the callee so chains traverse even when its own method
                // fact arrives later or not at all
                let caller_id = self.store.add_entity(
                    "method",
                    &caller,
                    owner_prefix(&caller),
                    Origin::CodeAnalysis,
                    None,
                );
                let callee_id = self.store.add_entity(
                    "method",
                    &callee,
                    owner_prefix(&callee),
                    Origin::CodeAnalysis,
                    None,
                );
                let context = location
                    .map(|loc| format!("{}:{}", loc.file, loc.line))
                    .unwrap_or_default();
                self.store.add_edge(
                    caller_id,
                    "method",
                    TargetRef::Id(callee_id),
                    relation::CALLS,
                    &context,
                    Origin::CodeAnalysis,
                );
            }
            CodeFact::PatchTarget {
                actor,
                target_type,
                target_method,
                operation,
                priority,
            } => {
                let selector = qualify(&target_type, &target_method);
                self.ledger.record(
                    &actor,
                    "method",
                    &selector,
                    operation,
                    "",
                    Some(priority),
                );
                let actor_id =
                    self.store
                        .add_entity("actor", &actor, None, Origin::CodeAnalysis, None);
                self.store.add_edge(
                    actor_id,
                    "method",
                    TargetRef::Name(selector),
                    relation::PATCHES,
                    operation.as_str(),
                    Origin::CodeAnalysis,
                );
            }
        }
    }

    pub fn ingest_doc(&mut self, fact: DocFact) {
        match fact {
            DocFact::Definition {
                kind,
                name,
                extends,
                location,
            } => {
                self.store
                    .add_entity(&kind, &name, extends, Origin::Document, location);
            }
            DocFact::Property {
                definition_kind,
                definition,
                name,
                value,
                nested_class,
            } => {
                let def_id = self.store.add_entity(
                    &definition_kind,
                    &definition,
                    None,
                    Origin::Document,
                    None,
                );
                let context = match nested_class {
                    Some(class) => format!("{class}:{value}"),
                    None => value,
                };
                self.store.add_edge(
                    def_id,
                    "property",
                    TargetRef::Name(name),
                    relation::PROPERTY,
                    &context,
                    Origin::Document,
                );
            }
            DocFact::Reference {
                definition_kind,
                definition,
                target_kind,
                target,
                context,
            } => {
                let def_id = self.store.add_entity(
                    &definition_kind,
                    &definition,
                    None,
                    Origin::Document,
                    None,
                );
                self.store.add_edge(
                    def_id,
                    &target_kind,
                    TargetRef::Name(target),
                    relation::REFERENCES,
                    &context,
                    Origin::Document,
                );
            }
            DocFact::Mutation {
                actor,
                target_kind,
                selector,
                operation,
                payload,
            } => {
                self.ledger
                    .record(&actor, &target_kind, &selector, operation, &payload, None);
            }
        }
    }

    pub fn ingest_event(&mut self, fact: EventFact) {
        match fact {
            EventFact::Subscription {
                subscriber_type,
                subscriber_method,
                event_owner,
                event_name,
            } => {
                let subscriber = qualify(&subscriber_type, &subscriber_method);
                let event = qualify(&event_owner, &event_name);
                let sub_id = self.store.add_entity(
                    "method",
                    &subscriber,
                    some_nonempty(&subscriber_type),
                    Origin::EventWiring,
                    None,
                );
                self.store.add_entity(
                    "event",
                    &event,
                    some_nonempty(&event_owner),
                    Origin::EventWiring,
                    None,
                );
                self.store.add_edge(
                    sub_id,
                    "event",
                    TargetRef::Name(event),
                    relation::SUBSCRIBES,
                    "",
                    Origin::EventWiring,
                );
            }
            EventFact::Fire {
                source_type,
                source_method,
                event_owner,
                event_name,
                conditional,
            } => {
                let source = qualify(&source_type, &source_method);
                let event = qualify(&event_owner, &event_name);
                let source_id = self.store.add_entity(
                    "method",
                    &source,
                    some_nonempty(&source_type),
                    Origin::EventWiring,
                    None,
                );
                self.store.add_entity(
                    "event",
                    &event,
                    some_nonempty(&event_owner),
                    Origin::EventWiring,
                    None,
                );
                let context = if conditional { "conditional" } else { "" };
                self.store.add_edge(
                    source_id,
                    "event",
                    TargetRef::Name(event),
                    relation::FIRES,
                    context,
                    Origin::EventWiring,
                );
            }
        }
    }

    /// Finish ingestion: derive structural edges and hand over the
    /// frozen store and ledger
    pub fn finish(mut self) -> (FactStore, MutationLedger) {
        self.derive_extends_edges();
        self.derive_overload_edges();
        self.derive_override_edges();
        info!(
            entities = self.store.entity_count(),
            edges = self.store.edge_count(),
            mutations = self.ledger.len(),
            "ingestion finished"
        );
        (self.store, self.ledger)
    }

    /// Register a method, keeping overloads as distinct entities.
    ///
    /// The first signature seen for (owner, member) claims the bare
    /// "Owner.Member" name; later distinct signatures get
    /// "Owner.Signature" so both stay individually addressable.
    fn add_method(
        &mut self,
        owner: &str,
        member: &str,
        signature: &str,
        is_override: bool,
        location: Option<crate::model::SourceLocation>,
    ) -> EntityId {
        if !owner.is_empty() {
            self.store
                .add_entity("type", owner, None, Origin::CodeAnalysis, None);
        }

        let key = (owner.to_string(), member.to_string());
        let slots = self.methods.entry(key).or_default();
        if let Some(slot) = slots.iter_mut().find(|s| s.signature == signature) {
            slot.is_override |= is_override;
            return slot.id;
        }
        // a signature-less fact for a known member names the same bare
        // entity as the first slot; fold into it instead of pushing a
        // second slot that would self-link as an overload
        if signature.is_empty() {
            if let Some(slot) = slots.first_mut() {
                slot.is_override |= is_override;
                return slot.id;
            }
        }

        let name = if slots.is_empty() || signature.is_empty() {
            qualify(owner, member)
        } else {
            qualify(owner, signature)
        };
        let id = self.store.add_entity(
            "method",
            &name,
            some_nonempty(owner),
            Origin::CodeAnalysis,
            location,
        );
        slots.push(MethodSlot {
            signature: signature.to_string(),
            id,
            is_override,
        });
        id
    }

    /// Type and document entities with a parent reference get an
    /// extends edge; methods and events keep parent as the owning type
    fn derive_extends_edges(&mut self) {
        let pending: Vec<(EntityId, String, String, Origin)> = self
            .store
            .entities()
            .iter()
            .filter(|e| !e.malformed)
            .filter(|e| !matches!(e.kind.as_str(), "method" | "event" | "actor"))
            .filter_map(|e| {
                e.parent
                    .clone()
                    .map(|p| (e.id, e.kind.clone(), p, e.origin))
            })
            .collect();
        for (id, kind, parent, origin) in pending {
            self.store.add_edge(
                id,
                &kind,
                TargetRef::Name(parent),
                relation::EXTENDS,
                "",
                origin,
            );
        }
    }

    fn derive_overload_edges(&mut self) {
        let mut pairs: Vec<(EntityId, EntityId)> = Vec::new();
        for slots in self.methods.values() {
            if slots.len() < 2 {
                continue;
            }
            for a in 0..slots.len() {
                for b in (a + 1)..slots.len() {
                    pairs.push((slots[a].id, slots[b].id));
                }
            }
        }
        debug!(overload_pairs = pairs.len(), "derived overload siblings");
        for (a, b) in pairs {
            self.store.add_edge(
                a,
                "method",
                TargetRef::Id(b),
                relation::OVERLOADS,
                "",
                Origin::CodeAnalysis,
            );
            self.store.add_edge(
                b,
                "method",
                TargetRef::Id(a),
                relation::OVERLOADS,
                "",
                Origin::CodeAnalysis,
            );
        }
    }

    /// An override-flagged method points at the nearest same-named
    /// member found on its owning type's base chain
    fn derive_override_edges(&mut self) {
        let mut edges: Vec<(EntityId, EntityId)> = Vec::new();
        for ((owner, member), slots) in &self.methods {
            for slot in slots.iter().filter(|s| s.is_override) {
                if let Some(base_id) = self.find_base_member(owner, member) {
                    edges.push((slot.id, base_id));
                }
            }
        }
        debug!(override_edges = edges.len(), "derived override edges");
        for (from, to) in edges {
            self.store.add_edge(
                from,
                "method",
                TargetRef::Id(to),
                relation::OVERRIDES,
                "",
                Origin::CodeAnalysis,
            );
        }
    }

    /// Walk the base-type chain looking for the overridden member.
    /// Bounded hop count guards against inheritance cycles in bad input.
    fn find_base_member(&self, owner: &str, member: &str) -> Option<EntityId> {
        let mut current = owner.to_string();
        for _ in 0..10 {
            let base = match self.store.lookup("type", &current) {
                Lookup::One(id) => self.store.entity(id)?.parent.clone()?,
                _ => return None,
            };
            if let Some(slots) = self.methods.get(&(base.clone(), member.to_string())) {
                if let Some(slot) = slots.first() {
                    return Some(slot.id);
                }
            }
            current = base;
        }
        None
    }
}

/// "Owner.Member", degrading gracefully when either side is missing
fn qualify(owner: &str, member: &str) -> String {
    if owner.is_empty() {
        member.to_string()
    } else if member.is_empty() {
        owner.to_string()
    } else {
        format!("{owner}.{member}")
    }
}

fn owner_prefix(qualified: &str) -> Option<String> {
    qualified
        .rsplit_once('.')
        .map(|(owner, _)| owner.to_string())
}

fn some_nonempty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
