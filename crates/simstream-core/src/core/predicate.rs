// crates/simstream-core/src/core/predicate.rs
// ============================================================================
// Module: Simstream Predicates
// Description: Selection predicates used by consumption filters, scenario
//              entity requirements, and the feasibility gate.
// Purpose: Define the `{field, operator, value}` comparison language and its
//          pure evaluation semantics against a single resolved JSON value.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Predicate`] names a field (resolved elsewhere — see
//! `runtime::store::Entity::resolve_field` — since `state.<key>` vs a
//! dotted `data` path is an Entity State Store concern, not a predicate
//! concern) and compares the resolved value against a configured value.
//! Missing segments resolve to `Null`; ordering comparisons against `Null`
//! are `false` rather than an error, per `spec.md` §4.D.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::errors::CoreError;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// A predicate comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Ge,
    /// Less than or equal.
    Le,
    /// String or array containment.
    Contains,
    /// Negated string or array containment.
    NotContains,
    /// Membership in a configured list.
    In,
    /// Negated membership in a configured list.
    NotIn,
}

// ============================================================================
// SECTION: Predicate
// ============================================================================

/// A single selection predicate: `{field, operator, value}`.
///
/// `field` is either a dotted path into an entity's `data` map or a
/// `state.<key>` path into its `state` map; resolving that distinction is
/// the Entity State Store's responsibility (`runtime::store`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// The field to compare, dotted-path or `state.<key>`.
    pub field: String,
    /// The comparison operator.
    pub operator: Operator,
    /// The value compared against.
    pub value: JsonValue,
}

impl Predicate {
    /// Evaluates this predicate against an already-resolved field value.
    ///
    /// `resolved` is `None` when the dotted path had a missing segment,
    /// which is treated as `JsonValue::Null` for comparison purposes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSchema`] for an operator/value
    /// combination the comparison semantics cannot evaluate (there are
    /// none today — every `Operator` variant is total over `JsonValue` —
    /// but the fallible signature matches `spec.md` §4.D's "unknown
    /// operator fails `InvalidSchema`" contract for forward compatibility).
    pub fn evaluate(&self, resolved: Option<&JsonValue>) -> Result<bool, CoreError> {
        let actual = resolved.unwrap_or(&JsonValue::Null);
        evaluate_operator(self.operator, actual, &self.value)
    }
}

/// Evaluates `operator` for already-resolved `actual`/`target` values,
/// shared with the `conditional_choice` leaf generator (`spec.md` §4.B),
/// which compares against context bindings rather than entity fields.
pub(crate) fn evaluate_operator(operator: Operator, actual: &JsonValue, target: &JsonValue) -> Result<bool, CoreError> {
    match operator {
        Operator::Eq => Ok(actual == target),
        Operator::Ne => Ok(actual != target),
        Operator::Gt => Ok(compare_ordering(actual, target).is_some_and(std::cmp::Ordering::is_gt)),
        Operator::Lt => Ok(compare_ordering(actual, target).is_some_and(std::cmp::Ordering::is_lt)),
        Operator::Ge => Ok(compare_ordering(actual, target).is_some_and(std::cmp::Ordering::is_ge)),
        Operator::Le => Ok(compare_ordering(actual, target).is_some_and(std::cmp::Ordering::is_le)),
        Operator::Contains => Ok(contains(actual, target)),
        Operator::NotContains => Ok(!contains(actual, target)),
        Operator::In => Ok(membership(actual, target)),
        Operator::NotIn => Ok(!membership(actual, target)),
    }
}

fn compare_ordering(actual: &JsonValue, target: &JsonValue) -> Option<std::cmp::Ordering> {
    match (actual, target) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (JsonValue::String(a), JsonValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn contains(actual: &JsonValue, target: &JsonValue) -> bool {
    match actual {
        JsonValue::String(s) => target.as_str().is_some_and(|t| s.contains(t)),
        JsonValue::Array(items) => items.contains(target),
        _ => false,
    }
}

fn membership(actual: &JsonValue, target: &JsonValue) -> bool {
    match target {
        JsonValue::Array(items) => items.contains(actual),
        _ => false,
    }
}
