// crates/simstream-core/src/runtime/registry.rs
// ============================================================================
// Module: Simstream Schema Registry
// Description: Immutable lookup of named schemas (`spec.md` §4.A).
// Purpose: Resolve `#/schemas/<name>` references and apply `$ref` merge
//          semantics, failing closed on unknown names and broken chains.
// Dependencies: crate::core
// ============================================================================

use std::collections::HashMap;

use crate::core::errors::CoreError;
use crate::core::identifiers::SchemaName;
use crate::core::schema::Schema;

/// Maximum `$ref` chain depth the registry will follow before giving up;
/// guards against a misconfigured cycle of schemas referencing each other.
const MAX_REF_CHAIN: usize = 32;

/// An immutable, load-time-populated registry of named schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<SchemaName, Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from an already-parsed name-to-schema mapping.
    #[must_use]
    pub fn from_map(schemas: HashMap<SchemaName, Schema>) -> Self {
        Self { schemas }
    }

    /// Registers or overwrites a named schema.
    pub fn insert(&mut self, name: SchemaName, schema: Schema) {
        self.schemas.insert(name, schema);
    }

    /// Resolves a schema by name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaNotFound`] when no schema is registered
    /// under `name`.
    pub fn resolve(&self, name: &SchemaName) -> Result<&Schema, CoreError> {
        self.schemas.get(name).ok_or_else(|| CoreError::SchemaNotFound(name.clone()))
    }

    /// Resolves `schema`, following and merging any `$ref` chain until a
    /// concrete node is reached (`spec.md` §4.A): take a shallow copy of
    /// the referenced schema and overlay every populated field of the
    /// referencing node except `$ref` itself.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaNotFound`] if any link in the chain names
    /// an unregistered schema, or [`CoreError::InvalidSchema`] if the chain
    /// exceeds [`MAX_REF_CHAIN`] (a likely reference cycle).
    pub fn resolve_merged(&self, schema: &Schema) -> Result<Schema, CoreError> {
        let mut current = schema.clone();
        let mut depth = 0;
        while let Some(target) = current.reference.clone() {
            depth += 1;
            if depth > MAX_REF_CHAIN {
                return Err(CoreError::InvalidSchema(format!(
                    "$ref chain exceeds {MAX_REF_CHAIN} links, likely circular: last target {target}"
                )));
            }
            let name = strip_schema_ref_prefix(&target);
            let base = self.resolve(&SchemaName::new(name))?;
            current = current.merge_over(base);
        }
        Ok(current)
    }
}

/// Strips the `#/schemas/` prefix from a `$ref` target, tolerating a bare
/// name for robustness.
fn strip_schema_ref_prefix(target: &str) -> &str {
    target.strip_prefix("#/schemas/").unwrap_or(target)
}
