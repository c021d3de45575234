// crates/simstream-core/src/core/errors.rs
// ============================================================================
// Module: Simstream Core Errors
// Description: Per-event and schema-resolution error taxonomy.
// Purpose: Distinguish fatal event-abort errors from the silent infeasible
//          skip, matching the propagation policy in `spec.md` §7.
// Dependencies: thiserror, simstream-expr
// ============================================================================

//! ## Overview
//! `CoreError` covers every failure that can occur while generating a single
//! event's payload or applying its entity effects. All variants here abort
//! *only the event in progress*: the orchestrator logs the failure and
//! resumes the main loop, except `InfeasibleEvent`, which is never logged
//! as an error (it is an expected skip, see `spec.md` §7).

use crate::core::identifiers::EntityTypeName;
use crate::core::identifiers::EventTypeName;
use crate::core::identifiers::SchemaName;

/// Errors arising from schema resolution, value generation, or entity
/// effect application for a single event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// A `$ref` or `from_entity` target named a schema the registry does
    /// not contain.
    #[error("schema not found: {0}")]
    SchemaNotFound(SchemaName),

    /// A schema declared a structurally invalid configuration (mismatched
    /// weights/choices lengths, empty `cases`, unknown selection operator,
    /// `max_items < min_items`, unknown generator or faker name).
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A `derived` expression, `conditional_choice` condition field, or
    /// context lookup referenced a name absent from the current context.
    #[error("unknown name: {0}")]
    UnknownName(String),

    /// An operation was applied to a value of the wrong type (most often a
    /// non-numeric `increment_attributes` target or operand).
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An event's `consumes_entities` predicates could not be satisfied
    /// with at least `min_required` matches. Not logged as an error; the
    /// event is silently skipped per `spec.md` §4.F rule 3 / §7.
    #[error("event type {0} is infeasible: insufficient matching entities")]
    InfeasibleEvent(EventTypeName),

    /// A `from_entity` leaf, consumption alias, or scenario binding
    /// referenced an entity type with no registered entities.
    #[error("no entities registered for entity type: {0}")]
    EntityTypeNotFound(EntityTypeName),

    /// Propagated failure from the `derived` expression evaluator.
    #[error("derived expression error: {0}")]
    Expression(#[from] simstream_expr::ExprError),
}

impl CoreError {
    /// Returns `true` for the single error kind that the orchestrator must
    /// treat as a silent, expected skip rather than a logged failure.
    #[must_use]
    pub const fn is_infeasible(&self) -> bool {
        matches!(self, Self::InfeasibleEvent(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_is_distinguished_from_other_variants() {
        let infeasible = CoreError::InfeasibleEvent(EventTypeName::new("purchase"));
        let invalid = CoreError::InvalidSchema("bad".to_string());
        assert!(infeasible.is_infeasible());
        assert!(!invalid.is_infeasible());
    }

    #[test]
    fn expression_error_converts_via_from() {
        let expr_err = simstream_expr::ExprError::DivideByZero;
        let core_err: CoreError = expr_err.into();
        assert!(matches!(core_err, CoreError::Expression(simstream_expr::ExprError::DivideByZero)));
    }
}
