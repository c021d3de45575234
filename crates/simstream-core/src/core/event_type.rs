// crates/simstream-core/src/core/event_type.rs
// ============================================================================
// Module: Simstream Event Type Model
// Description: Event type definitions, consumption clauses, and state
//              update actions (`spec.md` §3).
// Purpose: Describe what an event type produces, consumes, and mutates,
//          independent of how the Orchestrator sequences those effects.
// Dependencies: serde, serde_json
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::predicate::Predicate;

// ============================================================================
// SECTION: Consumption
// ============================================================================

/// A single `consumes_entities` clause: selects existing entities an event
/// requires in order to be feasible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumption {
    /// The entity type to select from.
    pub entity_type: String,
    /// The context binding name for matched entities
    /// (`consumed_entities[alias]`, `entity_<alias>`).
    pub alias: String,
    /// Predicates a candidate entity must satisfy (conjunction).
    #[serde(default)]
    pub selection_filter: Vec<Predicate>,
    /// Minimum number of matches required for feasibility. Must be `>= 1`;
    /// `0` is rejected at config validation (`ConfigInvalid`).
    pub min_required: usize,
}

// ============================================================================
// SECTION: State Update Actions
// ============================================================================

/// A value source for a state update action: either a literal or a
/// dotted-path projection off the just-generated payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A projection off the event's generated payload.
    FromPayloadField {
        /// Dotted path into the generated payload.
        from_payload_field: String,
    },
    /// A literal value, used as-is.
    Literal(JsonValue),
}

/// A single `updates_entity_state` action against a bound entity alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Entity alias to update, resolved first in context, then in
    /// `consumed_entities` (`spec.md` §4.F rule 4c).
    pub entity_alias: String,
    /// Attributes to overwrite, applied before `increment_attributes`.
    #[serde(default)]
    pub set_attributes: indexmap::IndexMap<String, FieldValue>,
    /// Attributes to increment numerically, applied after `set_attributes`.
    #[serde(default)]
    pub increment_attributes: indexmap::IndexMap<String, FieldValue>,
}

// ============================================================================
// SECTION: Event Type Definition
// ============================================================================

/// An event type definition (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTypeDef {
    /// The schema generating this event type's payload.
    pub payload_schema: String,
    /// Entity type to unconditionally create from the payload, if set.
    #[serde(default)]
    pub produces_entity: Option<String>,
    /// Entity type to probabilistically create-or-update, if set.
    #[serde(default)]
    pub produces_or_updates_entity: Option<String>,
    /// Probability of choosing "update" over "create" when
    /// `produces_or_updates_entity` is set. Defaults to `0.5`.
    #[serde(default)]
    pub update_existing_probability: Option<f64>,
    /// Entities this event type requires to exist in order to fire.
    #[serde(default)]
    pub consumes_entities: Vec<Consumption>,
    /// State mutations applied after production, in declared order.
    #[serde(default)]
    pub updates_entity_state: Vec<StateUpdate>,
    /// Relative weight used by replenishment and scenario-free selection.
    pub frequency_weight: f64,
}

impl EventTypeDef {
    /// The effective update-vs-create probability, defaulting to `0.5` per
    /// `spec.md` §4.F rule 4b.
    #[must_use]
    pub fn update_existing_probability(&self) -> f64 {
        self.update_existing_probability.unwrap_or(0.5)
    }
}
