// crates/simstream-core/src/core/context.rs
// ============================================================================
// Module: Simstream Generation Context
// Description: Immutable-by-convention binding layer propagated through
//              recursive schema generation and scenario/event scheduling.
// Purpose: Let sibling properties, `conditional_choice`, and `derived`
//          generators see earlier-declared values without entities being
//          owned (or cyclically referenced) by the context itself.
// Dependencies: serde_json, simstream-expr
// ============================================================================

//! ## Overview
//! `spec.md` §9 asks for context to be modeled as an immutable mapping from
//! string keys to a tagged-union value, with entities represented as stable
//! handles rather than direct references (so a scheduled event's context can
//! never form an ownership cycle with the Entity State Store). `Context`
//! here is a thin wrapper over a cloned `HashMap`: `child()` produces a new
//! binding layer cheaply enough for this simulator's scale, and descent
//! during object generation mutates the child so later sibling properties
//! observe earlier ones, per §4.C.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value as JsonValue;
use simstream_expr::{Value as ExprValue, VariableResolver};

use crate::core::identifiers::EntityId;
use crate::core::identifiers::EntityTypeName;
use crate::core::time::SimTime;

// ============================================================================
// SECTION: Reserved Keys
// ============================================================================

/// Reserved context key: current simulation time.
pub const SIMULATION_TIME: &str = "simulation_time";
/// Reserved context key: index of the current element during array generation.
pub const ARRAY_INDEX: &str = "array_index";
/// Reserved context key: payload override map for the event being generated.
pub const PAYLOAD_OVERRIDES: &str = "payload_overrides";
/// Reserved context key: entities bound by a `consumes_entities` clause.
pub const CONSUMED_ENTITIES: &str = "consumed_entities";
/// Reserved context key: the active scenario instance, if any.
pub const SCENARIO_INSTANCE: &str = "scenario_instance";
/// Reserved context key: the stable id of the scenario instance a scheduled
/// step belongs to, used to re-locate it once its event fires and schedule
/// the next step.
pub const SCENARIO_INSTANCE_ID: &str = "scenario_instance_id";
/// Reserved context key prefix: the alias under which a consumed entity was bound.
pub const ENTITY_ALIAS: &str = "entity_alias";

/// Builds the reserved `entity_<alias-or-type>` context key for a bound entity.
#[must_use]
pub fn entity_context_key(alias_or_type: &str) -> String {
    format!("entity_{alias_or_type}")
}

// ============================================================================
// SECTION: Entity Handles
// ============================================================================

/// A stable reference to an entity, resolved against the Entity State Store
/// on use rather than carried as a direct pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    /// The entity's type.
    pub entity_type: EntityTypeName,
    /// The entity's id within that type.
    pub id: EntityId,
}

impl EntityHandle {
    /// Creates a new entity handle.
    #[must_use]
    pub const fn new(entity_type: EntityTypeName, id: EntityId) -> Self {
        Self { entity_type, id }
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.id)
    }
}

// ============================================================================
// SECTION: Context Values
// ============================================================================

/// A value bound in a [`Context`].
///
/// Mirrors `spec.md` §9's tagged union (`Null | Bool | Int | Float | String |
/// Timestamp | List | Object | EntityHandle`). `Json` covers values produced
/// by nested object/array generation that do not need individual variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// A virtual simulation time.
    Timestamp(SimTime),
    /// An ordered list of values.
    List(Vec<ContextValue>),
    /// A structured JSON value (a generated object/array subtree, or a raw
    /// config value such as `payload_overrides`).
    Json(JsonValue),
    /// A single stable entity reference.
    Entity(EntityHandle),
    /// Multiple stable entity references (`min_required > 1` bindings).
    EntityList(Vec<EntityHandle>),
}

impl From<JsonValue> for ContextValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            other @ JsonValue::Object(_) => Self::Json(other),
        }
    }
}

impl ContextValue {
    /// Converts this value into the expression evaluator's [`ExprValue`],
    /// if it has a representable counterpart. Entity handles, timestamps,
    /// and nested objects are not expressible in the `derived` grammar and
    /// resolve to `None`.
    #[must_use]
    pub fn to_expr_value(&self) -> Option<ExprValue> {
        match self {
            Self::Bool(b) => Some(ExprValue::Bool(*b)),
            Self::Int(i) => Some(ExprValue::Number(*i as f64)),
            Self::Float(f) => Some(ExprValue::Number(*f)),
            Self::String(s) => Some(ExprValue::Text(s.clone())),
            Self::List(items) => {
                let converted: Option<Vec<ExprValue>> = items.iter().map(Self::to_expr_value).collect();
                converted.map(ExprValue::List)
            }
            Self::Json(JsonValue::Number(n)) => n.as_f64().map(ExprValue::Number),
            Self::Json(JsonValue::String(s)) => Some(ExprValue::Text(s.clone())),
            Self::Json(JsonValue::Bool(b)) => Some(ExprValue::Bool(*b)),
            Self::Null | Self::Timestamp(_) | Self::Entity(_) | Self::EntityList(_) | Self::Json(_) => None,
        }
    }

    /// Converts this value back into a [`JsonValue`], the inverse of
    /// `From<JsonValue>`, used by `conditional_choice` to compare a
    /// context binding against its configured case values. Entity handles
    /// and timestamps have no JSON form and resolve to `Null`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null | Self::Entity(_) | Self::EntityList(_) | Self::Timestamp(_) => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::Number((*i).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Json(v) => v.clone(),
        }
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// A binding layer propagated through recursive schema generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    bindings: HashMap<String, ContextValue>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a child binding layer. Descent during object generation
    /// mutates the child so later sibling properties observe earlier ones;
    /// the parent context is left untouched.
    #[must_use]
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Binds `key` to `value` in this context, overwriting any prior binding.
    pub fn insert(&mut self, key: impl Into<String>, value: ContextValue) {
        self.bindings.insert(key.into(), value);
    }

    /// Looks up a binding by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.bindings.get(key)
    }

    /// Returns the bound [`SimTime`] at `simulation_time`, if present and of
    /// the expected variant.
    #[must_use]
    pub fn simulation_time(&self) -> Option<SimTime> {
        match self.get(SIMULATION_TIME) {
            Some(ContextValue::Timestamp(t)) => Some(*t),
            _ => None,
        }
    }

    /// Convenience constructor for the initial generation context carrying
    /// only `simulation_time`.
    #[must_use]
    pub fn with_simulation_time(time: SimTime) -> Self {
        let mut ctx = Self::new();
        ctx.insert(SIMULATION_TIME, ContextValue::Timestamp(time));
        ctx
    }
}

impl VariableResolver for Context {
    fn resolve(&self, name: &str) -> Option<ExprValue> {
        self.get(name).and_then(ContextValue::to_expr_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_inherits_then_diverges_from_parent() {
        let mut parent = Context::new();
        parent.insert("a", ContextValue::Int(1));
        let mut child = parent.child();
        child.insert("b", ContextValue::Int(2));

        assert_eq!(child.get("a"), Some(&ContextValue::Int(1)));
        assert_eq!(parent.get("b"), None);
    }

    #[test]
    fn resolves_numeric_and_text_bindings_for_expressions() {
        let mut ctx = Context::new();
        ctx.insert("price", ContextValue::Float(9.5));
        ctx.insert("label", ContextValue::String("widget".to_string()));
        assert_eq!(ctx.resolve("price"), Some(ExprValue::Number(9.5)));
        assert_eq!(ctx.resolve("label"), Some(ExprValue::Text("widget".to_string())));
        assert_eq!(ctx.resolve("missing"), None);
    }

    #[test]
    fn entity_handles_are_not_expression_values() {
        let mut ctx = Context::new();
        let handle = EntityHandle::new(EntityTypeName::new("user"), EntityId::new("u1"));
        ctx.insert(entity_context_key("user"), ContextValue::Entity(handle));
        assert_eq!(ctx.resolve("entity_user"), None);
    }
}
