// crates/simstream-core/src/runtime/generators.rs
// ============================================================================
// Module: Simstream Leaf Value Generators
// Description: The named value generators a scalar schema node may invoke
//              (`spec.md` §4.B), plus the `from_entity` projection.
// Purpose: Produce a single JSON value per call, deterministic under the
//          run's seeded RNG, without knowing anything about recursive
//          object/array schema structure (that lives in `runtime::generator`).
// Dependencies: crate::core, simstream-expr, sha2, time, uuid
// ============================================================================

//! ## Overview
//! Every function here is a pure leaf producer: given a schema node's
//! `params`, the current [`Context`], and the shared [`SimRng`], it returns
//! one [`JsonValue`]. [`generate_leaf`] dispatches by the `generator` name;
//! [`generate_from_entity`] is the separate `from_entity` projection path,
//! which bypasses named-generator dispatch entirely (`spec.md` §4.C: a node
//! with `from_entity` set is resolved by entity projection, not by its
//! `generator`, if any).

use md5::Md5;
use sha2::Digest;
use sha2::Sha256;
use time::OffsetDateTime;
use uuid::Builder as UuidBuilder;

use crate::core::context::entity_context_key;
use crate::core::context::Context;
use crate::core::context::ContextValue;
use crate::core::errors::CoreError;
use crate::core::predicate::evaluate_operator;
use crate::core::predicate::Operator;
use crate::core::schema::Schema;
use crate::core::time::format_timestamp;
use crate::core::time::SimTime;
use crate::core::time::TimestampFormat;
use crate::interfaces::FakeProvider;
use crate::runtime::rng::SimRng;
use crate::runtime::store::EntityStore;
use serde_json::Value as JsonValue;

const FAKER_PREFIX: &str = "faker.";

const DEFAULT_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do", "eiusmod", "tempor", "incididunt",
];

// ============================================================================
// SECTION: Parameter Helpers
// ============================================================================

fn param(params: Option<&JsonValue>, key: &str) -> Option<JsonValue> {
    params?.as_object()?.get(key).cloned()
}

fn param_f64(params: Option<&JsonValue>, key: &str, default: f64) -> f64 {
    param(params, key).and_then(|v| v.as_f64()).unwrap_or(default)
}

fn param_i64(params: Option<&JsonValue>, key: &str, default: i64) -> i64 {
    param(params, key).and_then(|v| v.as_i64()).unwrap_or(default)
}

fn param_usize(params: Option<&JsonValue>, key: &str, default: usize) -> usize {
    param(params, key).and_then(|v| v.as_u64()).map_or(default, |v| v as usize)
}

fn param_str(params: Option<&JsonValue>, key: &str) -> Option<String> {
    param(params, key).and_then(|v| v.as_str().map(str::to_string))
}

// ============================================================================
// SECTION: from_entity Projection
// ============================================================================

/// Resolves a `from_entity` schema node: looks up the entity bound under
/// `entity_<from_entity>` in `context`, then navigates `schema.field` (if
/// set) into its `data`, or returns the whole `data` payload otherwise.
///
/// # Errors
///
/// Returns [`CoreError::EntityTypeNotFound`] if no entity is bound under
/// that key, or if the bound entity is no longer present in `store`.
pub fn generate_from_entity(schema: &Schema, context: &Context, store: &EntityStore) -> Result<JsonValue, CoreError> {
    let entity_type = schema.from_entity_type().ok_or_else(|| {
        CoreError::InvalidSchema("generate_from_entity called on a node without from_entity".to_string())
    })?;

    let key = entity_context_key(entity_type.as_str());
    let handle = match context.get(&key) {
        Some(ContextValue::Entity(handle)) => handle.clone(),
        _ => return Err(CoreError::EntityTypeNotFound(entity_type)),
    };

    let entity = store.get(&handle.entity_type, &handle.id).ok_or_else(|| CoreError::EntityTypeNotFound(entity_type))?;

    match schema.field.as_deref() {
        Some(field) => Ok(entity.resolve_data_field(field).unwrap_or(JsonValue::Null)),
        None => Ok(entity.data.clone()),
    }
}

// ============================================================================
// SECTION: Named Leaf Generators
// ============================================================================

/// Dispatches a named leaf generator, drawing randomness from `rng` and
/// resolving `faker.*` names through `providers`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidSchema`] for unknown generator/faker names or
/// malformed `params` (mismatched `choice` weights, empty `conditional_choice`
/// cases), and propagates [`CoreError::Expression`] from `derived`.
pub fn generate_leaf(
    name: &str,
    schema: &Schema,
    context: &Context,
    rng: &mut SimRng,
    providers: &dyn FakeProvider,
    anchor: OffsetDateTime,
) -> Result<JsonValue, CoreError> {
    let params = schema.params.as_ref();
    match name {
        "uuid_v4" => Ok(JsonValue::String(generate_uuid_v4(rng).to_string())),
        "random_int" => Ok(JsonValue::from(generate_random_int(params, rng))),
        "random_float" => {
            let value = generate_random_float(params, rng);
            Ok(serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number))
        }
        "random_alphanumeric" => Ok(JsonValue::String(generate_random_alphanumeric(params, rng))),
        "choice" => generate_choice(params, rng),
        "conditional_choice" => generate_conditional_choice(params, context, rng),
        "current_timestamp" => generate_current_timestamp(params, context, anchor),
        "static_hashed" => generate_static_hashed(params, rng),
        "derived" => generate_derived(params, context),
        other if other.starts_with(FAKER_PREFIX) => providers
            .call(&other[FAKER_PREFIX.len()..], params.unwrap_or(&JsonValue::Null), rng.as_rng_core())
            .map_err(|err| CoreError::InvalidSchema(err.to_string())),
        other => Err(CoreError::InvalidSchema(format!("unknown generator: {other}"))),
    }
}

/// Generates a fresh v4 UUID drawing its randomness from `rng`, exposed for
/// the Orchestrator's entity-id fallback (`spec.md` §4.F: `id = data[primary_key]
/// ?? fresh-uuid`).
pub(crate) fn generate_uuid_v4(rng: &mut SimRng) -> uuid::Uuid {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    UuidBuilder::from_random_bytes(bytes).into_uuid()
}

/// Exposed for the Schema Generator's type-appropriate scalar fallback
/// (`spec.md` §4.C), used when a scalar node declares no `generator`.
pub(crate) fn generate_random_int(params: Option<&JsonValue>, rng: &mut SimRng) -> i64 {
    let min = param_i64(params, "min", 0);
    let max = param_i64(params, "max", 100);
    rng.gen_range_i64(min, max)
}

/// See [`generate_random_int`].
pub(crate) fn generate_random_float(params: Option<&JsonValue>, rng: &mut SimRng) -> f64 {
    let min = param_f64(params, "min", 0.0);
    let max = param_f64(params, "max", 100.0);
    let precision = param_usize(params, "precision", 2);
    let raw = rng.gen_range_f64(min, max);
    simstream_expr::round_to_precision(raw, u32::try_from(precision).unwrap_or(2))
}

/// See [`generate_random_int`].
pub(crate) fn generate_random_alphanumeric(params: Option<&JsonValue>, rng: &mut SimRng) -> String {
    let length = param_usize(params, "length", 10);
    rng.alphanumeric_string(length)
}

/// Exposed for the Schema Generator's type-appropriate scalar fallback
/// (`spec.md` §4.C: a `string` node with no `generator` set draws a random
/// word, not an alphanumeric blob).
pub(crate) fn generate_random_word(rng: &mut SimRng) -> String {
    DEFAULT_WORDS[rng.choose_uniform_index(DEFAULT_WORDS.len())].to_string()
}

/// Draws one value from `choices`, uniformly or by `weights` if present,
/// shared by the top-level `choice` generator and `conditional_choice`'s
/// per-case selection.
fn select_from_choices(choices: &[JsonValue], weights: Option<&[JsonValue]>, rng: &mut SimRng) -> Result<JsonValue, CoreError> {
    if choices.is_empty() {
        return Err(CoreError::InvalidSchema("choice generator has no choices".to_string()));
    }

    let index = match weights {
        Some(weights) => {
            if weights.len() != choices.len() {
                return Err(CoreError::InvalidSchema(format!(
                    "choice weights length ({}) does not match choices length ({})",
                    weights.len(),
                    choices.len()
                )));
            }
            let weights: Vec<f64> = weights.iter().map(|w| w.as_f64().unwrap_or(0.0)).collect();
            rng.choose_weighted_index(&weights)
                .map_err(|err| CoreError::InvalidSchema(format!("invalid choice weights: {err}")))?
        }
        None => rng.choose_uniform_index(choices.len()),
    };
    Ok(choices[index].clone())
}

fn generate_choice(params: Option<&JsonValue>, rng: &mut SimRng) -> Result<JsonValue, CoreError> {
    let choices = param(params, "choices")
        .and_then(|v| v.as_array().cloned())
        .ok_or_else(|| CoreError::InvalidSchema("choice generator requires params.choices".to_string()))?;
    let weights = param(params, "weights").and_then(|v| v.as_array().cloned());
    select_from_choices(&choices, weights.as_deref(), rng)
}

/// Applies `choice`-style selection over a matched `conditional_choice`
/// case's own `choices`/`weights` (`spec.md` §4.B: "Chosen case's
/// `choices`/`weights` are applied like `choice`").
fn choose_from_case(case: &JsonValue, rng: &mut SimRng) -> Result<JsonValue, CoreError> {
    let choices = case
        .get("choices")
        .and_then(JsonValue::as_array)
        .cloned()
        .ok_or_else(|| CoreError::InvalidSchema("conditional_choice case requires choices".to_string()))?;
    let weights = case.get("weights").and_then(JsonValue::as_array).cloned();
    select_from_choices(&choices, weights.as_deref(), rng)
}

fn generate_conditional_choice(params: Option<&JsonValue>, context: &Context, rng: &mut SimRng) -> Result<JsonValue, CoreError> {
    let condition_field = param_str(params, "condition_field")
        .ok_or_else(|| CoreError::InvalidSchema("conditional_choice requires params.condition_field".to_string()))?;
    let cases = param(params, "cases")
        .and_then(|v| v.as_array().cloned())
        .ok_or_else(|| CoreError::InvalidSchema("conditional_choice requires params.cases".to_string()))?;
    if cases.is_empty() {
        return Err(CoreError::InvalidSchema("conditional_choice has no cases".to_string()));
    }

    let actual = context.get(&condition_field).map_or(JsonValue::Null, ContextValue::to_json);

    let mut default_case: Option<&JsonValue> = None;
    for case in &cases {
        if case.get("default").and_then(JsonValue::as_bool) == Some(true) {
            default_case = Some(case);
            continue;
        }
        let matched = if let Some(target) = case.get("condition_value") {
            evaluate_operator(Operator::Eq, &actual, target)?
        } else if let Some(target) = case.get("condition_value_greater_than") {
            evaluate_operator(Operator::Gt, &actual, target)?
        } else if let Some(target) = case.get("condition_value_less_than") {
            evaluate_operator(Operator::Lt, &actual, target)?
        } else if let Some(target) = case.get("condition_value_in") {
            evaluate_operator(Operator::In, &actual, target)?
        } else {
            false
        };
        if matched {
            return choose_from_case(case, rng);
        }
    }

    // `cases` was confirmed non-empty above, so a fallback always exists.
    let fallback = default_case.unwrap_or(&cases[0]);
    choose_from_case(fallback, rng)
}

fn generate_current_timestamp(params: Option<&JsonValue>, context: &Context, anchor: OffsetDateTime) -> Result<JsonValue, CoreError> {
    let format = param_str(params, "format")
        .and_then(|raw| match raw.as_str() {
            "unix" => Some(TimestampFormat::Unix),
            "unix_ms" => Some(TimestampFormat::UnixMs),
            "date" => Some(TimestampFormat::Date),
            "time" => Some(TimestampFormat::Time),
            "iso8601" => Some(TimestampFormat::Iso8601),
            _ => None,
        })
        .unwrap_or_default();
    let sim_time = context.simulation_time().unwrap_or(SimTime::ZERO);
    let absolute = sim_time.to_offset_date_time(anchor);
    let rendered = format_timestamp(absolute, format)
        .map_err(|err| CoreError::InvalidSchema(format!("failed to format timestamp: {err}")))?;
    Ok(JsonValue::String(rendered))
}

/// Resolves `static_hashed`'s raw value: either a nested sub-generator spec
/// (`{"generator": "...", "params": {...}}`) or a 12-char random
/// alphanumeric fallback (`spec.md` §4.B). Only the simple, non-recursive
/// leaf generators are supported here — a raw value has no need for
/// `derived`/`conditional_choice`/`static_hashed` itself, and an
/// unsupported nested name falls back the same way an absent one does.
fn generate_static_hashed_raw_value(source: &JsonValue, rng: &mut SimRng) -> String {
    let params = source.get("params");
    match source.get("generator").and_then(JsonValue::as_str) {
        Some("uuid_v4") => generate_uuid_v4(rng).to_string(),
        Some("random_int") => generate_random_int(params, rng).to_string(),
        Some("random_float") => generate_random_float(params, rng).to_string(),
        Some("random_alphanumeric") | None => generate_random_alphanumeric(params, rng),
        Some(_) => rng.alphanumeric_string(12),
    }
}

fn generate_static_hashed(params: Option<&JsonValue>, rng: &mut SimRng) -> Result<JsonValue, CoreError> {
    let raw = match param(params, "raw_value_source") {
        Some(source) => generate_static_hashed_raw_value(&source, rng),
        None => rng.alphanumeric_string(12),
    };
    let algorithm = param_str(params, "algorithm").unwrap_or_else(|| "bcrypt-style".to_string());
    let hex = match algorithm.as_str() {
        "sha256" => {
            let mut hasher = Sha256::new();
            hasher.update(raw.as_bytes());
            hex_encode(&hasher.finalize())
        }
        "md5" => {
            let mut hasher = Md5::new();
            hasher.update(raw.as_bytes());
            hex_encode(&hasher.finalize())
        }
        "bcrypt-style" | "bcrypt" => {
            let mut hasher = Md5::new();
            hasher.update(raw.as_bytes());
            format!("$2a$10${}", &hex_encode(&hasher.finalize())[..22])
        }
        other => return Err(CoreError::InvalidSchema(format!("unknown static_hashed algorithm: {other}"))),
    };
    Ok(JsonValue::String(hex))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

fn generate_derived(params: Option<&JsonValue>, context: &Context) -> Result<JsonValue, CoreError> {
    let expression = param_str(params, "expression")
        .ok_or_else(|| CoreError::InvalidSchema("derived generator requires params.expression".to_string()))?;
    // Precision rounding only applies when params.precision is present
    // (`spec.md` §4.B) — an absent precision leaves the result untouched.
    let precision = param(params, "precision").and_then(|v| v.as_u64()).map(|v| v as usize);
    let value = simstream_expr::evaluate(&expression, context)?;
    match value {
        simstream_expr::Value::Number(n) => {
            let result = match precision {
                Some(p) => simstream_expr::round_to_precision(n, u32::try_from(p).unwrap_or(0)),
                None => n,
            };
            Ok(serde_json::Number::from_f64(result).map_or(JsonValue::Null, JsonValue::Number))
        }
        simstream_expr::Value::Bool(b) => Ok(JsonValue::Bool(b)),
        simstream_expr::Value::Text(s) => Ok(JsonValue::String(s)),
        simstream_expr::Value::List(_) => Err(CoreError::InvalidSchema(
            "derived expression evaluated to a list, which is not a valid leaf value".to_string(),
        )),
    }
}
