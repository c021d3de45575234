// crates/simstream-core/tests/nullable_property.rs
// ============================================================================
// End-to-end: a property with `nullable_probability: 1.0` is null in every
// generated payload across a full run (`spec.md` §8, end-to-end scenario 6).
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

mod support;

use indexmap::IndexMap;
use simstream_core::core::event_type::EventTypeDef;
use simstream_core::core::identifiers::EventTypeName;
use simstream_core::core::identifiers::SchemaName;
use simstream_core::core::schema::Schema;
use simstream_core::runtime::orchestrator::Orchestrator;
use simstream_core::runtime::orchestrator::RunConfig;
use simstream_core::runtime::orchestrator::TerminationConfig;
use simstream_core::runtime::registry::SchemaRegistry;
use simstream_core::runtime::rng::SimRng;
use simstream_core::runtime::scheduler::Scheduler;
use simstream_core::runtime::scheduler::SchedulerConfig;
use support::fixed_anchor;
use support::CaptureSink;
use support::NoProviders;

fn always_null_schema() -> Schema {
    let mut properties = IndexMap::new();
    properties.insert(
        "maybe_name".to_string(),
        Schema {
            type_name: Some("string".to_string()),
            generator: Some("random_alphanumeric".to_string()),
            nullable_probability: Some(1.0),
            ..Schema::default()
        },
    );
    Schema {
        type_name: Some("object".to_string()),
        properties: Some(properties),
        ..Schema::default()
    }
}

#[test]
fn nullable_probability_one_is_always_null_across_a_full_run() {
    let mut registry = SchemaRegistry::new();
    registry.insert(SchemaName::new("sample"), always_null_schema());

    let mut event_types = IndexMap::new();
    event_types.insert(
        EventTypeName::new("sample"),
        EventTypeDef {
            payload_schema: "sample".to_string(),
            produces_entity: None,
            produces_or_updates_entity: None,
            update_existing_probability: None,
            consumes_entities: Vec::new(),
            updates_entity_state: Vec::new(),
            frequency_weight: 1.0,
        },
    );

    let providers = NoProviders;
    let sink = CaptureSink::new();
    let mut orchestrator = Orchestrator::new(
        registry,
        IndexMap::new(),
        event_types,
        IndexMap::new(),
        Scheduler::new(SchedulerConfig::default()),
        SimRng::from_seed(13),
        &providers,
        vec![Box::new(sink.clone())],
        RunConfig {
            initial_entity_counts: IndexMap::new(),
            termination: TerminationConfig {
                duration_seconds: None,
                total_events: Some(25),
            },
            anchor: fixed_anchor(),
        },
    );

    orchestrator.initialize().unwrap();
    orchestrator.run().unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 25);
    for event in &events {
        assert!(event.payload["maybe_name"].is_null());
    }
}
