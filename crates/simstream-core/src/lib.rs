// crates/simstream-core/src/lib.rs
// ============================================================================
// Crate: simstream-core
// Description: The simulation engine: schema/entity/event/scenario data
//              model, schema resolution and value generation, entity
//              storage, scheduling, and the Orchestrator that drives a run.
// Purpose: Host everything `spec.md` describes that is independent of how a
//          run is configured (`simstream-config`), which fake-data functions
//          back `faker.*` (`simstream-providers`), which sinks events reach
//          (`simstream-sinks`), or how a run is invoked (`simstream-cli`).
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;
