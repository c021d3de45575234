// crates/simstream-core/src/runtime/generator.rs
// ============================================================================
// Module: Simstream Schema Generator
// Description: Recursive, context-propagating value generation over a
//              resolved [`Schema`] tree (`spec.md` §4.C).
// Purpose: Walk a schema node, drawing nullability/selection/item-count/
//          per-item values in the fixed order `spec.md` §9 requires, and
//          expose each object property to its later siblings.
// Dependencies: crate::core, crate::runtime, time
// ============================================================================

//! ## Overview
//! [`generate`] resolves `$ref` chains through the Schema Registry, then
//! dispatches in this order for every node: nullability draw, `from_entity`
//! projection (if set), then object/array recursion or scalar leaf
//! generation. A scalar node with no declared `generator` still produces a
//! value, via a type-appropriate built-in fallback, rather than an error —
//! `spec.md` §4.C treats an absent `generator` as "use the type's default
//! producer", not as a configuration mistake.

use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use crate::core::context::Context;
use crate::core::context::ContextValue;
use crate::core::errors::CoreError;
use crate::core::schema::Schema;
use crate::core::schema::SchemaKind;
use crate::interfaces::FakeProvider;
use crate::runtime::generators;
use crate::runtime::registry::SchemaRegistry;
use crate::runtime::rng::SimRng;
use crate::runtime::store::EntityStore;

/// The collaborators a single generation pass needs, bundled to keep
/// [`generate`]'s signature manageable across its recursive calls.
pub struct GeneratorEnv<'a> {
    /// Resolves `$ref` targets.
    pub registry: &'a SchemaRegistry,
    /// Supplies randomness for every draw.
    pub rng: &'a mut SimRng,
    /// Resolves `faker.*` leaf generators.
    pub providers: &'a dyn FakeProvider,
    /// Resolves `from_entity` projections.
    pub store: &'a EntityStore,
    /// The run's wall-clock anchor, for `current_timestamp`.
    pub anchor: OffsetDateTime,
}

/// Generates a value for `schema` against `context`, recursing into object
/// properties and array items.
///
/// # Errors
///
/// Returns any [`CoreError`] raised resolving `$ref` chains, dispatching an
/// unknown generator/type, or evaluating a `derived` expression.
pub fn generate(schema: &Schema, context: &Context, env: &mut GeneratorEnv<'_>) -> Result<JsonValue, CoreError> {
    let resolved = if schema.reference.is_some() {
        env.registry.resolve_merged(schema)?
    } else {
        schema.clone()
    };

    if resolved.nullable_probability() > 0.0 && env.rng.gen_bool(resolved.nullable_probability()) {
        return Ok(JsonValue::Null);
    }

    if resolved.from_entity_type().is_some() {
        return generators::generate_from_entity(&resolved, context, env.store);
    }

    match resolved.kind()? {
        SchemaKind::Object => generate_object(&resolved, context, env),
        SchemaKind::Array => generate_array(&resolved, context, env),
        scalar_kind => generate_scalar(&resolved, scalar_kind, context, env),
    }
}

/// Generates an event payload, applying `overrides` to the payload schema's
/// top-level properties (`spec.md` §4.C, §4.F rule 3): a key present both
/// as a declared top-level property and in `overrides` takes the override
/// value directly rather than invoking its generator. Overrides naming a
/// key absent from the schema are silently ignored (`spec.md` §9).
///
/// # Errors
///
/// Returns any [`CoreError`] [`generate`] can return, plus
/// [`CoreError::InvalidSchema`] if the resolved payload schema is not an
/// object.
pub fn generate_payload(
    schema: &Schema,
    context: &Context,
    overrides: &indexmap::IndexMap<String, JsonValue>,
    env: &mut GeneratorEnv<'_>,
) -> Result<JsonValue, CoreError> {
    let resolved = if schema.reference.is_some() {
        env.registry.resolve_merged(schema)?
    } else {
        schema.clone()
    };
    let properties = resolved
        .properties
        .as_ref()
        .ok_or_else(|| CoreError::InvalidSchema("payload schema must be an object".to_string()))?;

    let mut output = serde_json::Map::with_capacity(properties.len());
    let mut child = context.child();
    for (name, property_schema) in properties {
        let value = if let Some(override_value) = overrides.get(name) {
            override_value.clone()
        } else {
            generate(property_schema, &child, env)?
        };
        child.insert(name.clone(), ContextValue::from(value.clone()));
        output.insert(name.clone(), value);
    }
    Ok(JsonValue::Object(output))
}

fn generate_object(schema: &Schema, context: &Context, env: &mut GeneratorEnv<'_>) -> Result<JsonValue, CoreError> {
    let properties = schema.properties.as_ref().ok_or_else(|| {
        CoreError::InvalidSchema("object schema declares no properties".to_string())
    })?;

    let mut output = serde_json::Map::with_capacity(properties.len());
    let mut child = context.child();

    for (name, property_schema) in properties {
        let value = generate(property_schema, &child, env)?;
        child.insert(name.clone(), ContextValue::from(value.clone()));
        output.insert(name.clone(), value);
    }

    Ok(JsonValue::Object(output))
}

fn generate_array(schema: &Schema, context: &Context, env: &mut GeneratorEnv<'_>) -> Result<JsonValue, CoreError> {
    let item_schema = schema
        .items
        .as_deref()
        .ok_or_else(|| CoreError::InvalidSchema("array schema declares no items".to_string()))?;
    let (min, max) = schema.array_bounds()?;
    let count = env.rng.gen_range_usize(min, max);

    let mut items = Vec::with_capacity(count);
    for index in 0..count {
        let mut child = context.child();
        child.insert(crate::core::context::ARRAY_INDEX, ContextValue::Int(index as i64));
        items.push(generate(item_schema, &child, env)?);
    }
    Ok(JsonValue::Array(items))
}

fn generate_scalar(
    schema: &Schema,
    kind: SchemaKind,
    context: &Context,
    env: &mut GeneratorEnv<'_>,
) -> Result<JsonValue, CoreError> {
    if let Some(generator_name) = schema.generator.as_deref() {
        return generators::generate_leaf(generator_name, schema, context, env.rng, env.providers, env.anchor);
    }

    Ok(match kind {
        SchemaKind::String => JsonValue::String(generators::generate_random_word(env.rng)),
        SchemaKind::Integer => JsonValue::from(generators::generate_random_int(None, env.rng)),
        SchemaKind::Number => {
            let value = generators::generate_random_float(None, env.rng);
            serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
        }
        SchemaKind::Boolean => JsonValue::Bool(env.rng.gen_bool(0.5)),
        SchemaKind::Object | SchemaKind::Array => unreachable!("composite kinds are dispatched before generate_scalar"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;
    use crate::interfaces::FakeProviderError;
    use indexmap::IndexMap;
    use serde_json::json;

    struct NoopProvider;
    impl FakeProvider for NoopProvider {
        fn call(&self, name: &str, _params: &JsonValue, _rng: &mut dyn rand::RngCore) -> Result<JsonValue, FakeProviderError> {
            Err(FakeProviderError::UnknownFunction(name.to_string()))
        }
    }

    fn env<'a>(registry: &'a SchemaRegistry, rng: &'a mut SimRng, providers: &'a NoopProvider, store: &'a EntityStore) -> GeneratorEnv<'a> {
        GeneratorEnv {
            registry,
            rng,
            providers,
            store,
            anchor: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn object_properties_generate_in_declared_order_and_see_siblings() {
        let registry = SchemaRegistry::new();
        let mut rng = SimRng::from_seed(1);
        let providers = NoopProvider;
        let store = EntityStore::new();

        let mut properties = IndexMap::new();
        properties.insert(
            "unit_price".to_string(),
            Schema {
                type_name: Some("number".to_string()),
                generator: Some("random_float".to_string()),
                params: Some(json!({"min": 5.0, "max": 5.0})),
                ..Schema::default()
            },
        );
        properties.insert(
            "total".to_string(),
            Schema {
                type_name: Some("number".to_string()),
                generator: Some("derived".to_string()),
                params: Some(json!({"expression": "unit_price * 2"})),
                ..Schema::default()
            },
        );
        let schema = Schema {
            type_name: Some("object".to_string()),
            properties: Some(properties),
            ..Schema::default()
        };

        let context = Context::new();
        let mut environment = env(&registry, &mut rng, &providers, &store);
        let value = generate(&schema, &context, &mut environment).unwrap();
        assert_eq!(value["unit_price"], json!(5.0));
        assert_eq!(value["total"], json!(10.0));
    }

    #[test]
    fn array_item_count_respects_bounds() {
        let registry = SchemaRegistry::new();
        let mut rng = SimRng::from_seed(2);
        let providers = NoopProvider;
        let store = EntityStore::new();

        let schema = Schema {
            type_name: Some("array".to_string()),
            min_items: Some(2),
            max_items: Some(2),
            items: Some(Box::new(Schema {
                type_name: Some("integer".to_string()),
                generator: Some("random_int".to_string()),
                params: Some(json!({"min": 1, "max": 1})),
                ..Schema::default()
            })),
            ..Schema::default()
        };

        let context = Context::new();
        let mut environment = env(&registry, &mut rng, &providers, &store);
        let value = generate(&schema, &context, &mut environment).unwrap();
        assert_eq!(value, json!([1, 1]));
    }

    #[test]
    fn nullable_probability_one_always_yields_null() {
        let registry = SchemaRegistry::new();
        let mut rng = SimRng::from_seed(3);
        let providers = NoopProvider;
        let store = EntityStore::new();

        let schema = Schema {
            type_name: Some("string".to_string()),
            nullable_probability: Some(1.0),
            generator: Some("random_alphanumeric".to_string()),
            ..Schema::default()
        };
        let context = Context::new();
        let mut environment = env(&registry, &mut rng, &providers, &store);
        assert_eq!(generate(&schema, &context, &mut environment).unwrap(), JsonValue::Null);
    }

    #[test]
    fn payload_overrides_replace_generation_for_matching_top_level_keys() {
        let registry = SchemaRegistry::new();
        let mut rng = SimRng::from_seed(5);
        let providers = NoopProvider;
        let store = EntityStore::new();

        let mut properties = IndexMap::new();
        properties.insert(
            "amount".to_string(),
            Schema {
                type_name: Some("integer".to_string()),
                generator: Some("random_int".to_string()),
                params: Some(json!({"min": 1, "max": 1})),
                ..Schema::default()
            },
        );
        properties.insert(
            "currency".to_string(),
            Schema {
                type_name: Some("string".to_string()),
                generator: Some("random_alphanumeric".to_string()),
                ..Schema::default()
            },
        );
        let schema = Schema {
            type_name: Some("object".to_string()),
            properties: Some(properties),
            ..Schema::default()
        };

        let mut overrides = indexmap::IndexMap::new();
        overrides.insert("currency".to_string(), json!("USD"));
        overrides.insert("unknown_key".to_string(), json!("ignored"));

        let context = Context::new();
        let mut environment = env(&registry, &mut rng, &providers, &store);
        let value = generate_payload(&schema, &context, &overrides, &mut environment).unwrap();
        assert_eq!(value["amount"], json!(1));
        assert_eq!(value["currency"], json!("USD"));
        assert!(value.get("unknown_key").is_none());
    }

    #[test]
    fn scalar_without_generator_uses_type_appropriate_default() {
        let registry = SchemaRegistry::new();
        let mut rng = SimRng::from_seed(4);
        let providers = NoopProvider;
        let store = EntityStore::new();

        let schema = Schema {
            type_name: Some("boolean".to_string()),
            ..Schema::default()
        };
        let context = Context::new();
        let mut environment = env(&registry, &mut rng, &providers, &store);
        assert!(generate(&schema, &context, &mut environment).unwrap().is_boolean());
    }
}
