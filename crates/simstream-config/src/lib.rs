// crates/simstream-config/src/lib.rs
// ============================================================================
// Crate: simstream-config
// Description: Configuration loading, `imports` resolution, and validation
//              (`spec.md` §6, §7).
// Purpose: Turn a YAML document on disk into the typed definitions
//          `simstream-core`'s Orchestrator is constructed from, failing
//          closed on anything malformed before a single event is generated.
// Dependencies: simstream-core, indexmap, serde, serde_yaml, thiserror, time, tracing
// ============================================================================

//! ## Overview
//! [`loader::load_config`] resolves a document's `imports` chain
//! depth-first and merges it ([`merge::merge_over`]) into a single
//! [`model::RawConfig`]; [`validate::validate`] then checks everything that
//! can be checked without running the simulation. `simstream-core`'s own
//! types (`Schema`, `EntityTypeDef`, `EventTypeDef`, `ScenarioDef`) are
//! already serde-capable, so this crate deserializes straight into them
//! rather than maintaining a parallel config-only type hierarchy.

pub mod duration;
pub mod error;
pub mod loader;
pub mod merge;
pub mod model;
pub mod validate;

pub use error::ConfigError;
pub use loader::load_config;
pub use model::OutputConfig;
pub use model::OutputFormatConfig;
pub use model::OutputKind;
pub use model::RawConfig;
pub use model::SimulationSettings;
pub use model::TimeProgression;
pub use validate::validate;

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]
}
