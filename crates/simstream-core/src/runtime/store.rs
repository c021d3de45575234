// crates/simstream-core/src/runtime/store.rs
// ============================================================================
// Module: Simstream Entity State Store
// Description: Typed, queryable in-memory registry of entity instances
//              (`spec.md` §4.D).
// Purpose: Provide predicate-based selection shared by the Scheduler's
//          feasibility gate and the Generator's entity consumption, with
//          last-writer-wins creation and atomic set-then-increment state
//          updates.
// Dependencies: crate::core, serde_json, tracing
// ============================================================================

//! ## Overview
//! Entities are indexed by `(entity_type, id)`. Iteration order over a
//! type's entities is deliberately unspecified (`spec.md` §4.D): this
//! store backs it with a `HashMap`, so callers needing a stable order
//! (tests, `find` with a `limit`) must not rely on insertion order.

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::core::entity::Entity;
use crate::core::errors::CoreError;
use crate::core::identifiers::EntityId;
use crate::core::identifiers::EntityTypeName;
use crate::core::predicate::Predicate;
use crate::core::time::SimTime;

/// The Entity State Store: a typed registry of live entity instances.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: HashMap<EntityTypeName, HashMap<EntityId, Entity>>,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an entity, registering its type lazily. Overwrites any prior
    /// entity with the same id (last-writer-wins), logging the overwrite
    /// at `debug` per `spec.md` §4.D.
    pub fn create(&mut self, entity_type: EntityTypeName, id: EntityId, data: JsonValue, primary_key: Option<String>, state: HashMap<String, JsonValue>, created_at: SimTime) -> Entity {
        let entity = Entity {
            entity_type: entity_type.clone(),
            id: id.clone(),
            primary_key,
            data,
            state,
            created_at,
        };
        let bucket = self.entities.entry(entity_type.clone()).or_default();
        if bucket.contains_key(&id) {
            debug!(entity_type = %entity_type, id = %id, "overwriting existing entity (last-writer-wins)");
        }
        bucket.insert(id, entity.clone());
        entity
    }

    /// Shallow-merges `delta` into an entity's `data`. Returns `None` (a
    /// non-fatal condition) if the entity does not exist.
    #[must_use]
    pub fn update_data(&mut self, entity_type: &EntityTypeName, id: &EntityId, delta: &JsonValue) -> Option<()> {
        let entity = self.entities.get_mut(entity_type)?.get_mut(id)?;
        if let (JsonValue::Object(existing), JsonValue::Object(incoming)) = (&mut entity.data, delta) {
            for (key, value) in incoming {
                existing.insert(key.clone(), value.clone());
            }
        }
        Some(())
    }

    /// Applies `sets` literally, then `increments` as numeric addition,
    /// atomically (per `spec.md` §8 invariant 5: both effects are
    /// observable together or neither is). Returns `None` if the entity
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TypeMismatch`] if an increment target's current
    /// value or delta is non-numeric; in that case no mutation is applied.
    pub fn update_state(
        &mut self,
        entity_type: &EntityTypeName,
        id: &EntityId,
        sets: &HashMap<String, JsonValue>,
        increments: &HashMap<String, JsonValue>,
    ) -> Option<Result<(), CoreError>> {
        let entity = self.entities.get_mut(entity_type)?.get_mut(id)?;

        // Validate every increment before mutating anything, so a failure
        // never leaves a partially-updated entity (§8 invariant 5).
        let mut resolved_increments = Vec::with_capacity(increments.len());
        for (key, delta) in increments {
            let Some(delta_n) = delta.as_f64() else {
                return Some(Err(CoreError::TypeMismatch(format!("increment delta for {key} is not numeric"))));
            };
            let current_n = match entity.state.get(key) {
                None | Some(JsonValue::Null) => 0.0,
                Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
                Some(_) => {
                    return Some(Err(CoreError::TypeMismatch(format!("current value for {key} is not numeric"))));
                }
            };
            resolved_increments.push((key.clone(), current_n + delta_n));
        }

        for (key, value) in sets {
            entity.state.insert(key.clone(), value.clone());
        }
        for (key, new_value) in resolved_increments {
            entity.state.insert(
                key,
                serde_json::Number::from_f64(new_value).map_or(JsonValue::Null, JsonValue::Number),
            );
        }
        Some(Ok(()))
    }

    /// Returns a clone of the entity at `(entity_type, id)`, if present.
    #[must_use]
    pub fn get(&self, entity_type: &EntityTypeName, id: &EntityId) -> Option<Entity> {
        self.entities.get(entity_type)?.get(id).cloned()
    }

    /// Returns all entities of `entity_type`. Order is unspecified.
    #[must_use]
    pub fn all_of(&self, entity_type: &EntityTypeName) -> Vec<Entity> {
        self.entities.get(entity_type).map(|bucket| bucket.values().cloned().collect()).unwrap_or_default()
    }

    /// Counts entities of `entity_type` matching every predicate in
    /// `filters` (conjunction). An empty filter list counts all entities
    /// of the type.
    ///
    /// # Errors
    ///
    /// Propagates any [`CoreError`] from predicate evaluation.
    pub fn count(&self, entity_type: &EntityTypeName, filters: &[Predicate]) -> Result<usize, CoreError> {
        Ok(self.find(entity_type, filters, None)?.len())
    }

    /// Finds entities of `entity_type` matching every predicate in
    /// `filters` (conjunction), optionally capped at `limit` results.
    ///
    /// # Errors
    ///
    /// Propagates any [`CoreError`] from predicate evaluation.
    pub fn find(&self, entity_type: &EntityTypeName, filters: &[Predicate], limit: Option<usize>) -> Result<Vec<Entity>, CoreError> {
        let mut matched = Vec::new();
        for entity in self.all_of(entity_type) {
            if self.matches(&entity, filters)? {
                matched.push(entity);
                if limit.is_some_and(|n| matched.len() >= n) {
                    break;
                }
            }
        }
        Ok(matched)
    }

    /// Deletes the entity at `(entity_type, id)`, returning it if present.
    /// Defined for completeness (`spec.md` §3) but unused by the core loop.
    pub fn delete(&mut self, entity_type: &EntityTypeName, id: &EntityId) -> Option<Entity> {
        self.entities.get_mut(entity_type)?.remove(id)
    }

    /// Evaluates whether `entity` satisfies every predicate in `filters`
    /// (conjunction over AND), per `spec.md` §4.D.
    ///
    /// # Errors
    ///
    /// Propagates any [`CoreError`] a predicate's evaluation raises.
    pub fn matches(&self, entity: &Entity, filters: &[Predicate]) -> Result<bool, CoreError> {
        for predicate in filters {
            let resolved = entity.resolve_predicate_field(&predicate.field);
            if !predicate.evaluate(resolved.as_ref())? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
