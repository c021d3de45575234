// crates/simstream-core/tests/infeasibility_skip.rs
// ============================================================================
// End-to-end: with no users ever available, `purchase` never fires and the
// run terminates cleanly once replenishment finds nothing feasible
// (`spec.md` §8, end-to-end scenario 3).
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

mod support;

use indexmap::IndexMap;
use serde_json::json;
use simstream_core::core::entity::EntityTypeDef;
use simstream_core::core::entity::StateAttributeDef;
use simstream_core::core::event_type::Consumption;
use simstream_core::core::event_type::EventTypeDef;
use simstream_core::core::event_type::FieldValue;
use simstream_core::core::event_type::StateUpdate;
use simstream_core::core::identifiers::EntityTypeName;
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

fn user_schema() -> Schema {
    let mut properties = IndexMap::new();
    properties.insert(
        "user_id".to_string(),
        Schema {
            type_name: Some("string".to_string()),
            generator: Some("uuid_v4".to_string()),
            ..Schema::default()
        },
    );
    Schema {
        type_name: Some("object".to_string()),
        properties: Some(properties),
        ..Schema::default()
    }
}

fn purchase_schema() -> Schema {
    let mut properties = IndexMap::new();
    properties.insert(
        "amount".to_string(),
        Schema {
            type_name: Some("integer".to_string()),
            generator: Some("random_int".to_string()),
            params: Some(json!({"min": 1, "max": 100})),
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
fn infeasible_purchase_never_fires_and_run_terminates_cleanly() {
    let mut registry = SchemaRegistry::new();
    registry.insert(SchemaName::new("user"), user_schema());
    registry.insert(SchemaName::new("purchase"), purchase_schema());

    let mut state_attrs = IndexMap::new();
    state_attrs.insert(
        "purchase_count".to_string(),
        StateAttributeDef {
            type_name: "integer".to_string(),
            default: Some(json!(0)),
            nullable: false,
            from_field: None,
        },
    );
    let mut entity_types = IndexMap::new();
    entity_types.insert(
        EntityTypeName::new("user"),
        EntityTypeDef {
            schema_ref: "user".to_string(),
            primary_key: "user_id".to_string(),
            state_attributes: state_attrs,
        },
    );

    let mut event_types = IndexMap::new();
    event_types.insert(
        EventTypeName::new("signup"),
        EventTypeDef {
            payload_schema: "user".to_string(),
            produces_entity: Some("user".to_string()),
            produces_or_updates_entity: None,
            update_existing_probability: None,
            consumes_entities: Vec::new(),
            updates_entity_state: Vec::new(),
            // Weight zero: signup must never fire, so users never appear.
            frequency_weight: 0.0,
        },
    );
    event_types.insert(
        EventTypeName::new("purchase"),
        EventTypeDef {
            payload_schema: "purchase".to_string(),
            produces_entity: None,
            produces_or_updates_entity: None,
            update_existing_probability: None,
            consumes_entities: vec![Consumption {
                entity_type: "user".to_string(),
                alias: "buyer".to_string(),
                selection_filter: Vec::new(),
                min_required: 1,
            }],
            updates_entity_state: vec![StateUpdate {
                entity_alias: "buyer".to_string(),
                set_attributes: IndexMap::new(),
                increment_attributes: {
                    let mut map = IndexMap::new();
                    map.insert("purchase_count".to_string(), FieldValue::Literal(json!(1)));
                    map
                },
            }],
            frequency_weight: 1.0,
        },
    );

    let providers = NoProviders;
    let sink = CaptureSink::new();
    let mut orchestrator = Orchestrator::new(
        registry,
        entity_types,
        event_types,
        IndexMap::new(),
        Scheduler::new(SchedulerConfig::default()),
        SimRng::from_seed(7),
        &providers,
        vec![Box::new(sink.clone())],
        RunConfig {
            initial_entity_counts: IndexMap::new(),
            termination: TerminationConfig::default(),
            anchor: fixed_anchor(),
        },
    );

    orchestrator.initialize().unwrap();
    orchestrator.run().unwrap();

    assert!(sink.events().into_iter().all(|event| event.event_type != "purchase"));
    assert_eq!(orchestrator.emitted_count(), 0);
}
