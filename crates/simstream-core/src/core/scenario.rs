// crates/simstream-core/src/core/scenario.rs
// ============================================================================
// Module: Simstream Scenario Model
// Description: Scenario definitions, steps, requirements, and live scenario
//              instances (`spec.md` §3, §4.F).
// Purpose: Describe a predetermined multi-step event sequence bound to a
//          shared entity context, independent of how the Orchestrator
//          initiates and advances instances.
// Dependencies: indexmap, serde, serde_json
// ============================================================================

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::identifiers::EntityId;
use crate::core::identifiers::ScenarioName;
use crate::core::predicate::Predicate;

// ============================================================================
// SECTION: Scenario Definition
// ============================================================================

/// A requirement that an initial entity of a given type, matching a filter,
/// be bound to `alias` before a scenario can be initiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// The entity type a candidate must belong to.
    pub entity_type: String,
    /// The context binding name for the matched entity.
    pub alias: String,
    /// Predicates a candidate entity must satisfy (conjunction).
    #[serde(default)]
    pub selection_filter: Vec<Predicate>,
}

/// A single step in a scenario: the event type to schedule, with payload
/// overrides applied on top of normal generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// The event type this step schedules.
    pub event_type: String,
    /// Literal overrides merged into the generated payload (`spec.md`
    /// §4.C); keys absent from the payload schema are silently ignored
    /// per §9's open-question resolution.
    #[serde(default)]
    pub payload_overrides: IndexMap<String, JsonValue>,
}

/// A scenario definition (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDef {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Relative weight used when selecting which scenario to initiate.
    pub initiation_weight: f64,
    /// Entities that must already exist, by alias, before initiation.
    #[serde(default)]
    pub requires_initial_entities: Vec<Requirement>,
    /// The ordered steps this scenario executes once initiated.
    pub steps: Vec<Step>,
}

// ============================================================================
// SECTION: Scenario Instance
// ============================================================================

/// A live, in-progress scenario instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInstance {
    /// Identifies this instance among any others running the same scenario
    /// definition concurrently; assigned by the Orchestrator at initiation.
    pub id: u64,
    /// The scenario definition this instance runs.
    pub name: ScenarioName,
    /// Entity bindings captured at initiation, by alias.
    pub entity_aliases: IndexMap<String, EntityId>,
    /// Index of the next step to schedule.
    pub current_step: usize,
    /// Whether every step has been scheduled.
    pub completed: bool,
}

impl ScenarioInstance {
    /// Creates a new instance bound to `entity_aliases`, with no steps yet
    /// scheduled.
    #[must_use]
    pub fn new(id: u64, name: ScenarioName, entity_aliases: IndexMap<String, EntityId>) -> Self {
        Self {
            id,
            name,
            entity_aliases,
            current_step: 0,
            completed: false,
        }
    }

    /// Advances to the next step, marking the instance `completed` once
    /// every step of `total_steps` has been scheduled.
    pub fn advance(&mut self, total_steps: usize) {
        self.current_step += 1;
        if self.current_step >= total_steps {
            self.completed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;

    #[test]
    fn advance_marks_completed_after_final_step() {
        let mut instance = ScenarioInstance::new(0, ScenarioName::new("checkout"), IndexMap::new());
        assert!(!instance.completed);
        instance.advance(2);
        assert_eq!(instance.current_step, 1);
        assert!(!instance.completed);
        instance.advance(2);
        assert_eq!(instance.current_step, 2);
        assert!(instance.completed);
    }
}
