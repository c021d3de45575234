// crates/simstream-core/src/interfaces/mod.rs
// ============================================================================
// Module: Simstream Interfaces
// Description: Backend-agnostic seams for sinks and fake-data providers.
// Purpose: Let `simstream-sinks` and `simstream-providers` plug into the
//          Orchestrator without this crate depending on either.
// Dependencies: crate::core, rand, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `spec.md` treats concrete sinks and the `faker.*` function registry as
//! external collaborators with narrow interfaces. [`Sink`] and
//! [`FakeProvider`] are those interfaces: `simstream-sinks` implements
//! `Sink` for stdout/file/Kafka, and `simstream-providers` implements
//! `FakeProvider` for the named fake-data functions in `spec.md` §4.B.

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::core::event::Event;

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Errors a [`Sink`] may report. The Orchestrator logs these and continues
/// (`spec.md` §4.G, §7): a sink failure never aborts the run.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink failed to deliver or serialize an event.
    #[error("sink error: {0}")]
    Failed(String),
}

/// A consumer of emitted events. Concrete implementations (stdout, file,
/// Kafka) live in `simstream-sinks`.
pub trait Sink {
    /// Delivers a single emitted event.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] on delivery or serialization failure. The
    /// Orchestrator treats this as isolated: log and continue.
    fn emit(&mut self, event: &Event) -> Result<(), SinkError>;

    /// Flushes and releases any resources held by the sink. Called once at
    /// run end; the default implementation is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if finalization fails.
    fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Fake Data Provider
// ============================================================================

/// Errors a [`FakeProvider`] may report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FakeProviderError {
    /// No function is registered under this name.
    #[error("unknown fake-data function: {0}")]
    UnknownFunction(String),
}

/// A registry of named fake-data functions dispatched by the `faker.*`
/// leaf generator (`spec.md` §4.B). Implementations must be deterministic
/// given the same RNG state, so runs remain reproducible under a fixed
/// seed.
pub trait FakeProvider {
    /// Invokes the named function with keyword `params`, drawing randomness
    /// from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`FakeProviderError::UnknownFunction`] for an unrecognized
    /// name, which the caller surfaces as `CoreError::InvalidSchema`.
    fn call(&self, name: &str, params: &JsonValue, rng: &mut dyn rand::RngCore) -> Result<JsonValue, FakeProviderError>;
}
