// crates/simstream-core/src/core/schema.rs
// ============================================================================
// Module: Simstream Schema Model
// Description: The schema language (`spec.md` §3): object/array/scalar
//              nodes, `$ref` resolution, and `from_entity` projections.
// Purpose: Provide the typed schema tree walked by the Schema Generator and
//          resolved by the Schema Registry.
// Dependencies: indexmap, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Schema`] is a flat struct carrying every field any schema shape may
//! use; which fields are meaningful is determined by [`Schema::kind`], not
//! by a serde tag, because the wire format (`spec.md` §3) distinguishes
//! shapes by which keys are present rather than an explicit discriminator.
//! `properties` uses an order-preserving map so declaration order — which
//! `spec.md` §3 requires for sibling context visibility — survives a
//! deserialize/serialize round trip.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::errors::CoreError;
use crate::core::identifiers::EntityTypeName;
use crate::core::identifiers::SchemaName;

// ============================================================================
// SECTION: Schema Node
// ============================================================================

/// A schema node. Exactly one of the shapes described by [`SchemaKind`] is
/// active, determined by which optional fields are populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// `$ref: "#/schemas/<name>"` — resolved against the Schema Registry.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// `object | array | string | integer | number | boolean`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Object property schemas, in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,

    /// Array element schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Minimum array length (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,

    /// Maximum array length (inclusive); defaults to `min_items + 5`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    /// Leaf generator id (e.g. `uuid_v4`, `faker.person.name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,

    /// Output/stringification format, generator-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Generator-specific keyword parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonValue>,

    /// Probability in `[0, 1]` that this node resolves to `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable_probability: Option<f64>,

    /// `from_entity: <entity-type>` — projects a field off a bound entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_entity: Option<String>,

    /// Dotted path navigated into the `from_entity` entity's `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// The resolved shape of a [`Schema`] node, after `$ref`/`from_entity`
/// precedence has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// An object with declared properties.
    Object,
    /// An array of a single element schema.
    Array,
    /// A scalar string value.
    String,
    /// A scalar integer value.
    Integer,
    /// A scalar number (floating point) value.
    Number,
    /// A scalar boolean value.
    Boolean,
}

impl Schema {
    /// Resolves this node's shape. `$ref` nodes must be merged (see
    /// [`super::registry::SchemaRegistry::resolve_merged`]) before calling
    /// this; a still-present `$ref` here is a bug, not a user error, so it
    /// is treated as `InvalidSchema`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSchema`] when `type` is missing or
    /// unrecognized and the node is not a `from_entity` projection.
    pub fn kind(&self) -> Result<SchemaKind, CoreError> {
        if self.reference.is_some() {
            return Err(CoreError::InvalidSchema(
                "unresolved $ref reached Schema::kind; merge before dispatch".to_string(),
            ));
        }
        match self.type_name.as_deref() {
            Some("object") => Ok(SchemaKind::Object),
            Some("array") => Ok(SchemaKind::Array),
            Some("string") => Ok(SchemaKind::String),
            Some("integer") => Ok(SchemaKind::Integer),
            Some("number") => Ok(SchemaKind::Number),
            Some("boolean") => Ok(SchemaKind::Boolean),
            Some(other) => Err(CoreError::InvalidSchema(format!("unrecognized schema type: {other}"))),
            None => Err(CoreError::InvalidSchema(
                "schema node has neither $ref, from_entity, nor type".to_string(),
            )),
        }
    }

    /// Returns the referenced entity type, if this node is a `from_entity`
    /// projection.
    #[must_use]
    pub fn from_entity_type(&self) -> Option<EntityTypeName> {
        self.from_entity.as_deref().map(EntityTypeName::new)
    }

    /// Returns the effective array bounds, applying the `max_items =
    /// min_items + 5` default from `spec.md` §4.C.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSchema`] when `max_items < min_items`.
    pub fn array_bounds(&self) -> Result<(usize, usize), CoreError> {
        let min = self.min_items.unwrap_or(0);
        let max = self.max_items.unwrap_or(min + 5);
        if max < min {
            return Err(CoreError::InvalidSchema(format!(
                "max_items ({max}) is less than min_items ({min})"
            )));
        }
        Ok((min, max))
    }

    /// Returns the effective nullability probability, defaulting to `0.0`.
    #[must_use]
    pub fn nullable_probability(&self) -> f64 {
        self.nullable_probability.unwrap_or(0.0)
    }

    /// Merges `self` (the referencing node) over `base` (the referenced
    /// schema), per `spec.md` §4.A: a shallow copy of `base` with every
    /// populated field of `self`, other than `$ref` itself, overlaid.
    #[must_use]
    pub fn merge_over(&self, base: &Schema) -> Schema {
        Schema {
            reference: None,
            type_name: self.type_name.clone().or_else(|| base.type_name.clone()),
            properties: self.properties.clone().or_else(|| base.properties.clone()),
            items: self.items.clone().or_else(|| base.items.clone()),
            min_items: self.min_items.or(base.min_items),
            max_items: self.max_items.or(base.max_items),
            generator: self.generator.clone().or_else(|| base.generator.clone()),
            format: self.format.clone().or_else(|| base.format.clone()),
            params: self.params.clone().or_else(|| base.params.clone()),
            nullable_probability: self.nullable_probability.or(base.nullable_probability),
            from_entity: self.from_entity.clone().or_else(|| base.from_entity.clone()),
            field: self.field.clone().or_else(|| base.field.clone()),
        }
    }
}

/// A named schema registered for `$ref` resolution, paired with the name it
/// is registered under (used in `SchemaNotFound` diagnostics).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSchema {
    /// The registered name.
    pub name: SchemaName,
    /// The schema definition.
    pub schema: Schema,
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;

    fn object_schema(props: Vec<(&str, Schema)>) -> Schema {
        let mut properties = IndexMap::new();
        for (k, v) in props {
            properties.insert(k.to_string(), v);
        }
        Schema {
            type_name: Some("object".to_string()),
            properties: Some(properties),
            ..Schema::default()
        }
    }

    #[test]
    fn kind_dispatches_on_type_name() {
        let s = Schema {
            type_name: Some("integer".to_string()),
            ..Schema::default()
        };
        assert_eq!(s.kind().unwrap(), SchemaKind::Integer);
    }

    #[test]
    fn unresolved_ref_is_invalid_schema() {
        let s = Schema {
            reference: Some("#/schemas/foo".to_string()),
            ..Schema::default()
        };
        assert!(matches!(s.kind(), Err(CoreError::InvalidSchema(_))));
    }

    #[test]
    fn array_bounds_default_to_min_plus_five() {
        let s = Schema {
            type_name: Some("array".to_string()),
            min_items: Some(2),
            ..Schema::default()
        };
        assert_eq!(s.array_bounds().unwrap(), (2, 7));
    }

    #[test]
    fn array_bounds_reject_max_below_min() {
        let s = Schema {
            min_items: Some(5),
            max_items: Some(1),
            ..Schema::default()
        };
        assert!(matches!(s.array_bounds(), Err(CoreError::InvalidSchema(_))));
    }

    #[test]
    fn merge_overlays_only_present_fields() {
        let base = object_schema(vec![(
            "id",
            Schema {
                type_name: Some("string".to_string()),
                ..Schema::default()
            },
        )]);
        let referencing = Schema {
            reference: Some("#/schemas/base".to_string()),
            nullable_probability: Some(0.5),
            ..Schema::default()
        };
        let merged = referencing.merge_over(&base);
        assert_eq!(merged.type_name.as_deref(), Some("object"));
        assert_eq!(merged.nullable_probability, Some(0.5));
        assert!(merged.properties.is_some());
    }
}
