// crates/simstream-core/src/core/entity.rs
// ============================================================================
// Module: Simstream Entity Model
// Description: Entity instances and entity type definitions (`spec.md` §3).
// Purpose: Define the typed record the Entity State Store indexes, with
//          disjoint `data`/`state` namespaces and predicate field
//          resolution shared by consumption filters and scenario
//          requirements.
// Dependencies: indexmap, serde, serde_json
// ============================================================================

//! ## Overview
//! `data` is the originating generation payload, treated as immutable by
//! convention outside of explicit `update_data` calls. `state` is a
//! disjoint, mutable attribute bag addressed in predicates with the
//! `state.<key>` prefix. `Entity::resolve_predicate_field` implements that
//! prefix split once so the Entity State Store's `matches` and the
//! Scheduler's feasibility gate share identical field resolution.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::identifiers::EntityId;
use crate::core::identifiers::EntityTypeName;
use crate::core::json_path;
use crate::core::time::SimTime;

const STATE_PREFIX: &str = "state.";

// ============================================================================
// SECTION: Entity
// ============================================================================

/// A live entity instance tracked by the Entity State Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// The entity's type.
    pub entity_type: EntityTypeName,
    /// The entity's id, unique within its type.
    pub id: EntityId,
    /// The `data` field used as this entity's primary key, if any.
    pub primary_key: Option<String>,
    /// The originating generation payload, immutable by convention.
    pub data: JsonValue,
    /// The mutable state attribute bag.
    pub state: HashMap<String, JsonValue>,
    /// Virtual simulation time at which this entity was created.
    pub created_at: SimTime,
}

impl Entity {
    /// Resolves a predicate `field` against this entity: `state.<key>`
    /// addresses [`Entity::state`]; anything else walks [`Entity::data`] by
    /// dotted path. Missing segments resolve to `None` (treated as `Null`
    /// by the predicate evaluator).
    #[must_use]
    pub fn resolve_predicate_field(&self, field: &str) -> Option<JsonValue> {
        if let Some(key) = field.strip_prefix(STATE_PREFIX) {
            self.state.get(key).cloned()
        } else {
            json_path::navigate(&self.data, field)
        }
    }

    /// Resolves a dotted path into `data` only, used by `from_entity` leaf
    /// generation (`spec.md` §4.B), which navigates `data` exclusively.
    #[must_use]
    pub fn resolve_data_field(&self, field: &str) -> Option<JsonValue> {
        json_path::navigate(&self.data, field)
    }
}

// ============================================================================
// SECTION: Entity Type Definition
// ============================================================================

/// How a state attribute's initial value is derived at entity creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAttributeDef {
    /// Declared value type, informational only (not enforced at creation).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Literal default value, used when `from_field` is absent or its
    /// source field is missing from `data`.
    #[serde(default)]
    pub default: Option<JsonValue>,
    /// Whether `null` is an acceptable resolved value.
    #[serde(default)]
    pub nullable: bool,
    /// When set, initialize this attribute from `data[from_field]` instead
    /// of `default`.
    #[serde(default)]
    pub from_field: Option<String>,
}

/// An entity type definition: schema reference, primary key field, and
/// state attribute initializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeDef {
    /// The schema this entity type's `data` conforms to.
    pub schema_ref: String,
    /// The `data` field used to derive `id` at creation, if present.
    pub primary_key: String,
    /// State attribute initializers, in declaration order.
    #[serde(default)]
    pub state_attributes: IndexMap<String, StateAttributeDef>,
}

impl EntityTypeDef {
    /// Computes the initial `state` map for a freshly created entity from
    /// its generated `data` payload, per `spec.md` §3's `from_field` rule.
    #[must_use]
    pub fn initial_state(&self, data: &JsonValue) -> HashMap<String, JsonValue> {
        let mut state = HashMap::with_capacity(self.state_attributes.len());
        for (name, attr) in &self.state_attributes {
            let value = attr
                .from_field
                .as_deref()
                .and_then(|field| json_path::navigate(data, field))
                .or_else(|| attr.default.clone())
                .unwrap_or(JsonValue::Null);
            state.insert(name.clone(), value);
        }
        state
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
    use serde_json::json;

    fn sample_entity() -> Entity {
        let mut state = HashMap::new();
        state.insert("purchase_count".to_string(), json!(2));
        Entity {
            entity_type: EntityTypeName::new("user"),
            id: EntityId::new("u1"),
            primary_key: Some("user_id".to_string()),
            data: json!({"user_id": "u1", "address": {"city": "Gotham"}}),
            state,
            created_at: SimTime::ZERO,
        }
    }

    #[test]
    fn state_prefix_addresses_state_map() {
        let entity = sample_entity();
        assert_eq!(entity.resolve_predicate_field("state.purchase_count"), Some(json!(2)));
    }

    #[test]
    fn dotted_path_addresses_data_map() {
        let entity = sample_entity();
        assert_eq!(entity.resolve_predicate_field("address.city"), Some(json!("Gotham")));
    }

    #[test]
    fn missing_state_key_is_none() {
        let entity = sample_entity();
        assert_eq!(entity.resolve_predicate_field("state.missing"), None);
    }

    #[test]
    fn initial_state_prefers_from_field_over_default() {
        let mut attrs = IndexMap::new();
        attrs.insert(
            "tier".to_string(),
            StateAttributeDef {
                type_name: "string".to_string(),
                default: Some(json!("bronze")),
                nullable: false,
                from_field: Some("signup_tier".to_string()),
            },
        );
        let def = EntityTypeDef {
            schema_ref: "user".to_string(),
            primary_key: "user_id".to_string(),
            state_attributes: attrs,
        };
        let data = json!({"signup_tier": "gold"});
        let state = def.initial_state(&data);
        assert_eq!(state.get("tier"), Some(&json!("gold")));
    }

    #[test]
    fn initial_state_falls_back_to_default_when_field_absent() {
        let mut attrs = IndexMap::new();
        attrs.insert(
            "tier".to_string(),
            StateAttributeDef {
                type_name: "string".to_string(),
                default: Some(json!("bronze")),
                nullable: false,
                from_field: Some("signup_tier".to_string()),
            },
        );
        let def = EntityTypeDef {
            schema_ref: "user".to_string(),
            primary_key: "user_id".to_string(),
            state_attributes: attrs,
        };
        let state = def.initial_state(&json!({}));
        assert_eq!(state.get("tier"), Some(&json!("bronze")));
    }
}
