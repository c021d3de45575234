// crates/simstream-config/src/model.rs
// ============================================================================
// Module: Config Document Model
// Description: The typed shape of a simulation config document (`spec.md`
//              §6): `version`, `simulation_settings`, `schemas`, `entities`,
//              `event_types`, `scenarios`, `outputs`, and `imports`.
// Purpose: Deserialize directly into `simstream-core`'s existing types
//          (`Schema`, `EntityTypeDef`, `EventTypeDef`, `ScenarioDef`), which
//          are already serde-capable, plus the config-only concepts
//          (`simulation_settings`, `outputs`, `imports`) that have no
//          runtime-engine counterpart.
// Dependencies: simstream-core, indexmap, serde
// ============================================================================

use indexmap::IndexMap;
use serde::Deserialize;
use simstream_core::core::entity::EntityTypeDef;
use simstream_core::core::event_type::EventTypeDef;
use simstream_core::core::identifiers::EntityTypeName;
use simstream_core::core::identifiers::EventTypeName;
use simstream_core::core::identifiers::SchemaName;
use simstream_core::core::identifiers::ScenarioName;
use simstream_core::core::scenario::ScenarioDef;
use simstream_core::core::schema::Schema;

// ============================================================================
// SECTION: Document Root
// ============================================================================

/// A fully merged, not-yet-validated configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    /// Configuration document version, for forward-compatibility.
    pub version: String,
    /// Run-wide settings: termination, initial population, RNG seed, clock.
    pub simulation_settings: SimulationSettings,
    /// Named schemas, resolvable by `$ref`.
    #[serde(default)]
    pub schemas: IndexMap<SchemaName, Schema>,
    /// Entity type definitions.
    #[serde(default)]
    pub entities: IndexMap<EntityTypeName, EntityTypeDef>,
    /// Event type definitions.
    #[serde(default)]
    pub event_types: IndexMap<EventTypeName, EventTypeDef>,
    /// Scenario definitions.
    #[serde(default)]
    pub scenarios: IndexMap<ScenarioName, ScenarioDef>,
    /// Configured output sinks, in declaration order.
    #[serde(default)]
    pub outputs: Vec<OutputConfig>,
    /// Other documents to merge beneath this one before it is applied.
    /// Consumed entirely during loading; never present after merge.
    #[serde(default)]
    pub imports: Vec<String>,
}

// ============================================================================
// SECTION: Simulation Settings
// ============================================================================

/// `simulation_settings` (`spec.md` §6).
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    /// Total run duration, e.g. `"30m"`. Mutually optional with
    /// `total_events`; a run with neither runs until the queue runs dry.
    #[serde(default)]
    pub duration: Option<String>,
    /// Stop once this many events have been emitted.
    #[serde(default)]
    pub total_events: Option<usize>,
    /// How many of each entity type to generate during initialization.
    #[serde(default)]
    pub initial_entity_counts: IndexMap<EntityTypeName, usize>,
    /// Seed for the run's deterministic RNG. Unseeded runs draw from
    /// entropy and are not reproducible.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// The run's wall-clock anchor and playback rate.
    pub time_progression: TimeProgression,
}

/// `simulation_settings.time_progression` (`spec.md` §6).
#[derive(Debug, Clone, Deserialize)]
pub struct TimeProgression {
    /// `"now"` or an ISO-8601 timestamp marking `simulation_time = 0`.
    pub start_time: String,
    /// Virtual-to-wall-clock playback rate. Only `1.0` yields wall-clock
    /// timestamps that track real elapsed time during the run; this field
    /// otherwise only affects how `current_timestamp` leaves render, not
    /// how fast the Orchestrator's loop itself runs.
    pub time_multiplier: f64,
}

// ============================================================================
// SECTION: Outputs
// ============================================================================

/// Which sink transport an [`OutputConfig`] entry configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Write to stdout.
    Stdout,
    /// Append to a file on disk.
    File,
    /// Publish to a Kafka topic.
    Kafka,
}

/// How a sink renders its output (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormatConfig {
    /// Compact, one-line JSON.
    Json,
    /// Indented, human-readable JSON.
    JsonPretty,
}

/// A single `outputs` list entry (`spec.md` §6): `{ type, enabled, format,
/// topic_mapping?, ...type-specific fields }`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Which sink transport this entry configures.
    #[serde(rename = "type")]
    pub kind: OutputKind,
    /// Whether this sink is active for the run. Disabled entries are
    /// parsed and validated but never constructed.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Compact vs. indented JSON encoding.
    pub format: OutputFormatConfig,
    /// Event type to topic routing, consulted by the Kafka sink with
    /// fallback topic `events` for unmapped event types.
    #[serde(default)]
    pub topic_mapping: IndexMap<String, String>,
    /// Destination file path. Required when `kind == File`.
    #[serde(default)]
    pub path: Option<String>,
    /// Kafka `bootstrap.servers` value. Required when `kind == Kafka`.
    #[serde(default)]
    pub bootstrap_servers: Option<String>,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;

    #[test]
    fn output_config_defaults_enabled_to_true() {
        let yaml = "type: stdout\nformat: json\n";
        let output: OutputConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(output.enabled);
        assert_eq!(output.kind, OutputKind::Stdout);
    }

    #[test]
    fn output_config_parses_kafka_fields() {
        let yaml = "type: kafka\nenabled: true\nformat: json_pretty\nbootstrap_servers: localhost:9092\ntopic_mapping:\n  signup: signups\n";
        let output: OutputConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(output.kind, OutputKind::Kafka);
        assert_eq!(output.bootstrap_servers.as_deref(), Some("localhost:9092"));
        assert_eq!(output.topic_mapping.get("signup").map(String::as_str), Some("signups"));
    }
}
