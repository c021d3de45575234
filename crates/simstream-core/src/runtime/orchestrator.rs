// crates/simstream-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Simstream Orchestrator
// Description: Drives the run's main loop: initialization, event generation,
//              entity effect application, emission, and scenario stepping
//              (`spec.md` §4.F).
// Purpose: The single place that sequences every other runtime collaborator
//          (registry, generator, store, scheduler, sinks, providers) into one
//          coherent run, per the component boundaries `spec.md` §4 draws.
// Dependencies: crate::core, crate::runtime, indexmap, time, tracing
// ============================================================================

//! ## Overview
//! [`Orchestrator::initialize`] seeds the Entity State Store and primes the
//! Scheduler; [`Orchestrator::run`] then loops: pop the earliest event,
//! advance virtual time to it, generate its payload (aborting silently on an
//! infeasible consumption), apply its entity effects in the fixed
//! produce/update/state-update order `spec.md` §4.F prescribes, emit to every
//! configured sink in isolation, step scenarios, and replenish the queue.
//! Every random decision — fake-data provider calls, delay sampling,
//! selection, nullability — draws from the single [`SimRng`] threaded
//! through [`GeneratorEnv`], so a run is fully determined by its seed.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use crate::core::context::entity_context_key;
use crate::core::context::Context;
use crate::core::context::ContextValue;
use crate::core::context::EntityHandle;
use crate::core::context::PAYLOAD_OVERRIDES;
use crate::core::context::SCENARIO_INSTANCE;
use crate::core::context::SCENARIO_INSTANCE_ID;
use crate::core::entity::EntityTypeDef;
use crate::core::errors::CoreError;
use crate::core::event::Event;
use crate::core::event::ScheduledEvent;
use crate::core::event_type::EventTypeDef;
use crate::core::event_type::FieldValue;
use crate::core::event_type::StateUpdate;
use crate::core::identifiers::EntityTypeName;
use crate::core::identifiers::EventTypeName;
use crate::core::identifiers::ScenarioName;
use crate::core::identifiers::SchemaName;
use crate::core::json_path;
use crate::core::scenario::ScenarioDef;
use crate::core::scenario::ScenarioInstance;
use crate::core::time::SimTime;
use crate::interfaces::FakeProvider;
use crate::interfaces::Sink;
use crate::runtime::generator;
use crate::runtime::generator::GeneratorEnv;
use crate::runtime::generators;
use crate::runtime::registry::SchemaRegistry;
use crate::runtime::rng::SimRng;
use crate::runtime::scheduler::Scheduler;
use crate::runtime::store::EntityStore;

/// Maximum number of scenario instances active at once (`spec.md` §4.F).
const MAX_ACTIVE_SCENARIOS: usize = 5;
/// Inter-step delay bounds for scenario steps, in seconds (`spec.md` §4.F).
const SCENARIO_STEP_DELAY_MIN_SECONDS: f64 = 5.0;
const SCENARIO_STEP_DELAY_MAX_SECONDS: f64 = 30.0;

// ============================================================================
// SECTION: Run Configuration
// ============================================================================

/// Conditions that end a run (`spec.md` §4.F rule 0). A run with neither set
/// terminates only once the Scheduler's queue runs dry and replenishment
/// yields nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TerminationConfig {
    /// Stop once virtual time since the anchor reaches this many seconds.
    pub duration_seconds: Option<f64>,
    /// Stop once this many events have been emitted.
    pub total_events: Option<usize>,
}

/// Everything the Orchestrator needs to start a run, beyond the static
/// definitions (schemas, entity/event types, scenarios) it is constructed
/// with.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// How many of each entity type to generate during initialization.
    pub initial_entity_counts: IndexMap<EntityTypeName, usize>,
    /// The run's termination conditions.
    pub termination: TerminationConfig,
    /// The wall-clock instant `simulation_time = 0` corresponds to.
    pub anchor: OffsetDateTime,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives one simulation run end to end.
pub struct Orchestrator<'p> {
    registry: SchemaRegistry,
    entity_types: IndexMap<EntityTypeName, EntityTypeDef>,
    event_types: IndexMap<EventTypeName, EventTypeDef>,
    scenarios: IndexMap<ScenarioName, ScenarioDef>,
    store: EntityStore,
    scheduler: Scheduler,
    rng: SimRng,
    providers: &'p dyn FakeProvider,
    sinks: Vec<Box<dyn Sink>>,
    run_config: RunConfig,
    simulation_time: SimTime,
    emitted_count: usize,
    active_scenarios: Vec<ScenarioInstance>,
    next_scenario_instance_id: u64,
}

impl<'p> Orchestrator<'p> {
    /// Constructs an orchestrator from already-parsed definitions. Config
    /// file parsing and validation happen upstream, in `simstream-config`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: SchemaRegistry,
        entity_types: IndexMap<EntityTypeName, EntityTypeDef>,
        event_types: IndexMap<EventTypeName, EventTypeDef>,
        scenarios: IndexMap<ScenarioName, ScenarioDef>,
        scheduler: Scheduler,
        rng: SimRng,
        providers: &'p dyn FakeProvider,
        sinks: Vec<Box<dyn Sink>>,
        run_config: RunConfig,
    ) -> Self {
        Self {
            registry,
            entity_types,
            event_types,
            scenarios,
            store: EntityStore::new(),
            scheduler,
            rng,
            providers,
            sinks,
            run_config,
            simulation_time: SimTime::ZERO,
            emitted_count: 0,
            active_scenarios: Vec::new(),
            next_scenario_instance_id: 0,
        }
    }

    /// Number of events emitted so far this run.
    #[must_use]
    pub fn emitted_count(&self) -> usize {
        self.emitted_count
    }

    /// Read-only access to the Entity State Store, for tests and `info`
    /// reporting.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------

    /// Populates initial entities, primes the Scheduler, and initiates the
    /// first scenarios (`spec.md` §4.F rule 1).
    ///
    /// # Errors
    ///
    /// Propagates any [`CoreError`] raised generating initial entity data or
    /// evaluating scenario/consumption feasibility.
    pub fn initialize(&mut self) -> Result<(), CoreError> {
        self.populate_initial_entities()?;
        self.scheduler.replenish(self.simulation_time, &self.event_types, &self.store, &mut self.rng, true)?;
        self.initiate_scenarios(self.scenarios.len().max(1))?;
        Ok(())
    }

    fn populate_initial_entities(&mut self) -> Result<(), CoreError> {
        let counts = self.run_config.initial_entity_counts.clone();
        for (entity_type, count) in &counts {
            let def = self
                .entity_types
                .get(entity_type)
                .cloned()
                .ok_or_else(|| CoreError::EntityTypeNotFound(entity_type.clone()))?;
            let schema = self.registry.resolve(&SchemaName::new(def.schema_ref.as_str()))?.clone();

            for _ in 0..*count {
                let context = Context::with_simulation_time(self.simulation_time);
                let data = {
                    let mut env = GeneratorEnv {
                        registry: &self.registry,
                        rng: &mut self.rng,
                        providers: self.providers,
                        store: &self.store,
                        anchor: self.run_config.anchor,
                    };
                    generator::generate(&schema, &context, &mut env)?
                };
                let id = self.resolve_entity_id(&data, &def.primary_key);
                let state = def.initial_state(&data);
                self.store.create(entity_type.clone(), id, data, Some(def.primary_key.clone()), state, self.simulation_time);
            }
        }
        Ok(())
    }

    fn resolve_entity_id(&mut self, data: &JsonValue, primary_key: &str) -> crate::core::identifiers::EntityId {
        match json_path::navigate(data, primary_key) {
            Some(JsonValue::String(s)) => crate::core::identifiers::EntityId::new(s),
            Some(other) => crate::core::identifiers::EntityId::new(other.to_string()),
            None => crate::core::identifiers::EntityId::new(generators::generate_uuid_v4(&mut self.rng).to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Main loop
    // ------------------------------------------------------------------

    /// Runs the simulation until a termination condition is met or the
    /// event queue runs dry after replenishment, then closes every sink.
    /// Per-event failures (`spec.md` §7) never abort the run: `InfeasibleEvent`
    /// is a silent, expected skip, and every other [`CoreError`] is logged at
    /// error level and the loop continues with the next scheduled event. Sink
    /// close failures at run end are likewise logged, not propagated, so every
    /// sink gets a chance to close.
    ///
    /// # Errors
    ///
    /// Propagates a [`CoreError`] only from queue replenishment itself (event
    /// selection against the static definitions), never from generating or
    /// applying a single event's effects.
    pub fn run(&mut self) -> Result<(), CoreError> {
        loop {
            if self.should_terminate() {
                break;
            }
            let Some(scheduled) = self.next_event()? else {
                break;
            };
            self.simulation_time = scheduled.scheduled_time;
            if let Err(err) = self.process_event(scheduled) {
                if !err.is_infeasible() {
                    tracing::error!(error = %err, "event processing failed, skipping event");
                }
            }

            let active = self.active_scenarios.iter().filter(|s| !s.completed).count();
            if active < MAX_ACTIVE_SCENARIOS {
                self.initiate_scenarios(self.scenarios.len().max(1))?;
            }
            self.active_scenarios.retain(|s| !s.completed);

            if self.scheduler.needs_replenish() {
                self.scheduler.replenish(self.simulation_time, &self.event_types, &self.store, &mut self.rng, false)?;
            }
        }

        for sink in &mut self.sinks {
            if let Err(err) = sink.close() {
                tracing::error!(error = %err, "sink close failed");
            }
        }
        Ok(())
    }

    fn should_terminate(&self) -> bool {
        if let Some(total) = self.run_config.termination.total_events {
            if self.emitted_count >= total {
                return true;
            }
        }
        if let Some(duration) = self.run_config.termination.duration_seconds {
            if self.simulation_time.as_seconds() >= duration {
                return true;
            }
        }
        false
    }

    fn next_event(&mut self) -> Result<Option<ScheduledEvent>, CoreError> {
        if let Some(event) = self.scheduler.pop_earliest() {
            return Ok(Some(event));
        }
        if self.scheduler.needs_replenish() {
            self.scheduler.replenish(self.simulation_time, &self.event_types, &self.store, &mut self.rng, false)?;
        }
        Ok(self.scheduler.pop_earliest())
    }

    /// Processes one scheduled event, then — if it was a scenario step —
    /// schedules the scenario's next step, keyed by the stable instance id
    /// carried in the event's context (`spec.md` §4.F rule 5). Continuation
    /// happens regardless of whether the step itself succeeded, failed, or
    /// was skipped as infeasible: a scripted sequence still advances even
    /// when one of its steps had no effect.
    fn process_event(&mut self, scheduled: ScheduledEvent) -> Result<(), CoreError> {
        let continuation = match scheduled.context.get(SCENARIO_INSTANCE_ID) {
            Some(ContextValue::Int(id)) => Some(*id as u64),
            _ => None,
        };

        let result = self.process_event_inner(scheduled);

        if let Some(id) = continuation {
            if let Some(index) = self.active_scenarios.iter().position(|instance| instance.id == id) {
                if !self.active_scenarios[index].completed {
                    self.schedule_scenario_step(index, self.simulation_time)?;
                }
            }
        }

        result
    }

    fn process_event_inner(&mut self, scheduled: ScheduledEvent) -> Result<(), CoreError> {
        let event_type_name = scheduled.event_type.clone();
        let Some(event_def) = self.event_types.get(&event_type_name).cloned() else {
            tracing::warn!(event_type = %event_type_name, "scheduled event names an unknown event type, skipping");
            return Ok(());
        };

        let mut context = scheduled.context;
        context.insert(crate::core::context::SIMULATION_TIME, ContextValue::Timestamp(self.simulation_time));

        let mut consumed: HashMap<String, Vec<EntityHandle>> = HashMap::new();
        for consumption in &event_def.consumes_entities {
            let entity_type = EntityTypeName::new(consumption.entity_type.as_str());
            let matches = self.store.find(&entity_type, &consumption.selection_filter, Some(consumption.min_required))?;
            if matches.len() < consumption.min_required {
                // Silent, expected skip (`spec.md` §4.F rule 3 / §7): not logged.
                return Ok(());
            }
            let handles: Vec<EntityHandle> = matches.iter().map(|entity| EntityHandle::new(entity.entity_type.clone(), entity.id.clone())).collect();
            if consumption.min_required == 1 {
                context.insert(entity_context_key(&consumption.alias), ContextValue::Entity(handles[0].clone()));
            } else {
                context.insert(entity_context_key(&consumption.alias), ContextValue::EntityList(handles.clone()));
            }
            consumed.insert(consumption.alias.clone(), handles);
        }

        let overrides = match context.get(PAYLOAD_OVERRIDES) {
            Some(ContextValue::Json(JsonValue::Object(map))) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => IndexMap::new(),
        };

        let payload_schema = self.registry.resolve(&SchemaName::new(event_def.payload_schema.as_str()))?.clone();
        let payload = {
            let mut env = GeneratorEnv {
                registry: &self.registry,
                rng: &mut self.rng,
                providers: self.providers,
                store: &self.store,
                anchor: self.run_config.anchor,
            };
            generator::generate_payload(&payload_schema, &context, &overrides, &mut env)?
        };

        if let Some(entity_type) = event_def.produces_entity.clone() {
            self.produce_entity(&entity_type, &payload, &mut context)?;
        }
        if let Some(entity_type) = event_def.produces_or_updates_entity.clone() {
            self.produce_or_update_entity(&entity_type, &payload, &mut context, event_def.update_existing_probability())?;
        }
        for update in &event_def.updates_entity_state {
            self.apply_state_update(update, &payload, &context, &consumed)?;
        }

        let at = self.simulation_time.to_offset_date_time(self.run_config.anchor);
        let event = Event::new(event_type_name.clone(), payload, at)
            .map_err(|err| CoreError::InvalidSchema(format!("failed to format event timestamp: {err}")))?;
        for sink in &mut self.sinks {
            if let Err(err) = sink.emit(&event) {
                tracing::error!(event_type = %event_type_name, error = %err, "sink emit failed, continuing");
            }
        }
        self.emitted_count += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entity effects
    // ------------------------------------------------------------------

    fn produce_entity(&mut self, entity_type_str: &str, payload: &JsonValue, context: &mut Context) -> Result<(), CoreError> {
        let entity_type = EntityTypeName::new(entity_type_str);
        let def = self
            .entity_types
            .get(&entity_type)
            .cloned()
            .ok_or_else(|| CoreError::EntityTypeNotFound(entity_type.clone()))?;
        let id = self.resolve_entity_id(payload, &def.primary_key);
        let state = def.initial_state(payload);
        self.store.create(entity_type.clone(), id.clone(), payload.clone(), Some(def.primary_key.clone()), state, self.simulation_time);
        context.insert(entity_context_key(entity_type.as_str()), ContextValue::Entity(EntityHandle::new(entity_type, id)));
        Ok(())
    }

    /// `spec.md` §4.F rule 4b: with probability `update_probability`, update
    /// a uniformly-chosen existing entity's `data`; otherwise (or when none
    /// exist) create a new one, mirroring `produces_entity`. Update does
    /// *not* re-initialize `state` — only creation runs the state-init path
    /// (`spec.md` §9 open question).
    fn produce_or_update_entity(&mut self, entity_type_str: &str, payload: &JsonValue, context: &mut Context, update_probability: f64) -> Result<(), CoreError> {
        let entity_type = EntityTypeName::new(entity_type_str);
        let existing = self.store.all_of(&entity_type);
        let should_update = !existing.is_empty() && self.rng.gen_bool(update_probability);

        if should_update {
            let index = self.rng.choose_uniform_index(existing.len());
            let target = &existing[index];
            let target_id = target.id.clone();
            self.store.update_data(&entity_type, &target_id, payload);
            context.insert(entity_context_key(entity_type.as_str()), ContextValue::Entity(EntityHandle::new(entity_type, target_id)));
            Ok(())
        } else {
            self.produce_entity(entity_type_str, payload, context)
        }
    }

    fn apply_state_update(&mut self, update: &StateUpdate, payload: &JsonValue, context: &Context, consumed: &HashMap<String, Vec<EntityHandle>>) -> Result<(), CoreError> {
        let Some(handle) = resolve_state_update_target(&update.entity_alias, context, consumed) else {
            tracing::warn!(alias = %update.entity_alias, "state update alias did not resolve to a bound entity, skipping");
            return Ok(());
        };

        let sets: HashMap<String, JsonValue> = update.set_attributes.iter().map(|(key, value)| (key.clone(), resolve_field_value(value, payload))).collect();
        let increments: HashMap<String, JsonValue> = update.increment_attributes.iter().map(|(key, value)| (key.clone(), resolve_field_value(value, payload))).collect();

        match self.store.update_state(&handle.entity_type, &handle.id, &sets, &increments) {
            Some(Ok(())) => Ok(()),
            Some(Err(err)) => Err(err),
            None => {
                tracing::warn!(entity_type = %handle.entity_type, id = %handle.id, "state update target entity no longer exists, skipping");
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Scenario initiation and stepping
    // ------------------------------------------------------------------

    /// Attempts to bring the number of active scenarios up to
    /// [`MAX_ACTIVE_SCENARIOS`], giving up after `max_attempts` consecutive
    /// infeasible draws (unsatisfiable `requires_initial_entities`).
    fn initiate_scenarios(&mut self, max_attempts: usize) -> Result<(), CoreError> {
        let mut consecutive_failures = 0;
        while self.active_scenarios.len() < MAX_ACTIVE_SCENARIOS && consecutive_failures < max_attempts {
            if self.try_initiate_one_scenario()? {
                consecutive_failures = 0;
            } else {
                consecutive_failures += 1;
            }
        }
        Ok(())
    }

    fn try_initiate_one_scenario(&mut self) -> Result<bool, CoreError> {
        if self.scenarios.is_empty() {
            return Ok(false);
        }
        let weights: Vec<f64> = self.scenarios.values().map(|def| def.initiation_weight).collect();
        if weights.iter().all(|weight| *weight <= 0.0) {
            return Ok(false);
        }
        let index = self
            .rng
            .choose_weighted_index(&weights)
            .map_err(|err| CoreError::InvalidSchema(format!("scenario initiation weights are invalid: {err}")))?;
        let Some((scenario_name, def)) = self.scenarios.get_index(index) else {
            return Ok(false);
        };
        let scenario_name = scenario_name.clone();
        let def = def.clone();

        let mut aliases = IndexMap::new();
        for requirement in &def.requires_initial_entities {
            let entity_type = EntityTypeName::new(requirement.entity_type.as_str());
            let matches = self.store.find(&entity_type, &requirement.selection_filter, Some(1))?;
            let Some(entity) = matches.into_iter().next() else {
                // At least one requirement has zero matches: abandon this initiation.
                return Ok(false);
            };
            aliases.insert(requirement.alias.clone(), entity.id);
        }

        let instance_id = self.next_scenario_instance_id;
        self.next_scenario_instance_id += 1;
        let instance = ScenarioInstance::new(instance_id, scenario_name, aliases);
        self.active_scenarios.push(instance);
        let index = self.active_scenarios.len() - 1;

        // Only the first step is scheduled here; `process_event` schedules
        // each subsequent step once the previous one actually fires, keyed
        // by the instance id carried in its context (`spec.md` §4.F rule 5).
        self.schedule_scenario_step(index, self.simulation_time)?;
        Ok(true)
    }

    fn schedule_scenario_step(&mut self, index: usize, from_time: SimTime) -> Result<(), CoreError> {
        let instance = self.active_scenarios[index].clone();
        let def = self
            .scenarios
            .get(&instance.name)
            .cloned()
            .ok_or_else(|| CoreError::InvalidSchema(format!("scenario not found: {}", instance.name)))?;
        let Some(step) = def.steps.get(instance.current_step).cloned() else {
            self.active_scenarios[index].completed = true;
            return Ok(());
        };

        let mut context = Context::new();
        for (alias, entity_id) in &instance.entity_aliases {
            if let Some(entity_type) = scenario_alias_entity_type(&def, alias) {
                context.insert(entity_context_key(alias), ContextValue::Entity(EntityHandle::new(entity_type, entity_id.clone())));
            }
        }
        context.insert(SCENARIO_INSTANCE, ContextValue::String(instance.name.to_string()));
        context.insert(SCENARIO_INSTANCE_ID, ContextValue::Int(instance.id as i64));
        let overrides_json = serde_json::to_value(&step.payload_overrides).unwrap_or(JsonValue::Null);
        context.insert(PAYLOAD_OVERRIDES, ContextValue::Json(overrides_json));

        let delay = self.rng.gen_range_f64(SCENARIO_STEP_DELAY_MIN_SECONDS, SCENARIO_STEP_DELAY_MAX_SECONDS);
        let scheduled_time = from_time.advance(delay);
        self.scheduler.push(ScheduledEvent::with_context(EventTypeName::new(step.event_type.as_str()), scheduled_time, context));

        self.active_scenarios[index].advance(def.steps.len());
        Ok(())
    }
}

fn scenario_alias_entity_type(def: &ScenarioDef, alias: &str) -> Option<EntityTypeName> {
    def.requires_initial_entities
        .iter()
        .find(|requirement| requirement.alias == alias)
        .map(|requirement| EntityTypeName::new(requirement.entity_type.as_str()))
}

/// Resolves a `StateUpdate::entity_alias`: context first (the `entity_<alias>`
/// binding every consumption and production establishes), then the
/// `consumed_entities` side table (`spec.md` §4.F rule 4c).
fn resolve_state_update_target(entity_alias: &str, context: &Context, consumed: &HashMap<String, Vec<EntityHandle>>) -> Option<EntityHandle> {
    if let Some(ContextValue::Entity(handle)) = context.get(&entity_context_key(entity_alias)) {
        return Some(handle.clone());
    }
    consumed.get(entity_alias).and_then(|handles| handles.first()).cloned()
}

fn resolve_field_value(value: &FieldValue, payload: &JsonValue) -> JsonValue {
    match value {
        FieldValue::Literal(literal) => literal.clone(),
        FieldValue::FromPayloadField { from_payload_field } => json_path::navigate(payload, from_payload_field).unwrap_or(JsonValue::Null),
    }
}
