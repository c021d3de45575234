// crates/simstream-config/src/validate.rs
// ============================================================================
// Module: Config Validation
// Description: Statically-checkable structural requirements from `spec.md`
//              §4.C and §8's boundary behaviors, surfaced as `ConfigInvalid`
//              at load time rather than left to fail mid-run.
// Purpose: Catch what can be caught without generating a single event: a
//          malformed `duration`, a `min_required = 0` consumption, a
//          schema's `max_items < min_items`, and mismatched `choice`
//          weights/choices lengths.
// Dependencies: simstream-core, crate::duration, crate::model
// ============================================================================

use simstream_core::core::schema::Schema;

use crate::duration::parse_duration_seconds;
use crate::error::ConfigError;
use crate::model::RawConfig;

/// Validates `config` against every requirement that can be checked without
/// running the simulation.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] on the first violation found.
pub fn validate(config: &RawConfig) -> Result<(), ConfigError> {
    if let Some(duration) = &config.simulation_settings.duration {
        parse_duration_seconds(duration)?;
    }

    for (name, schema) in &config.schemas {
        validate_schema(name.as_str(), schema)?;
    }

    for (name, event_type) in &config.event_types {
        for consumption in &event_type.consumes_entities {
            if consumption.min_required == 0 {
                return Err(ConfigError::Invalid(format!(
                    "event type {name}: consumption of {} requires min_required >= 1",
                    consumption.entity_type
                )));
            }
        }
    }

    for output in &config.outputs {
        validate_output(output)?;
    }

    Ok(())
}

fn validate_schema(path: &str, schema: &Schema) -> Result<(), ConfigError> {
    if schema.reference.is_some() {
        return Ok(());
    }

    if schema.type_name.as_deref() == Some("array") {
        schema
            .array_bounds()
            .map_err(|err| ConfigError::Invalid(format!("schema {path}: {err}")))?;
        if let Some(items) = &schema.items {
            validate_schema(&format!("{path}[]"), items)?;
        }
    }

    if let Some(properties) = &schema.properties {
        for (key, property) in properties {
            validate_schema(&format!("{path}.{key}"), property)?;
        }
    }

    if schema.generator.as_deref() == Some("choice") {
        validate_choice_params(path, schema)?;
    }

    Ok(())
}

fn validate_choice_params(path: &str, schema: &Schema) -> Result<(), ConfigError> {
    let Some(params) = &schema.params else {
        return Err(ConfigError::Invalid(format!("schema {path}: choice generator requires params")));
    };
    let choices_len = params
        .get("choices")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ConfigError::Invalid(format!("schema {path}: choice generator requires params.choices")))?
        .len();
    if choices_len == 0 {
        return Err(ConfigError::Invalid(format!("schema {path}: choice generator has no choices")));
    }
    if let Some(weights) = params.get("weights").and_then(|v| v.as_array()) {
        if weights.len() != choices_len {
            return Err(ConfigError::Invalid(format!(
                "schema {path}: choice weights length ({}) does not match choices length ({choices_len})",
                weights.len()
            )));
        }
    }
    Ok(())
}

fn validate_output(output: &crate::model::OutputConfig) -> Result<(), ConfigError> {
    use crate::model::OutputKind;
    match output.kind {
        OutputKind::File if output.path.is_none() => {
            Err(ConfigError::Invalid("file output requires path".to_string()))
        }
        OutputKind::Kafka if output.bootstrap_servers.is_none() => {
            Err(ConfigError::Invalid("kafka output requires bootstrap_servers".to_string()))
        }
        OutputKind::Stdout | OutputKind::File | OutputKind::Kafka => Ok(()),
    }
}
