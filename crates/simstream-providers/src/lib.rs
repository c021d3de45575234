// crates/simstream-providers/src/lib.rs
// ============================================================================
// Crate: simstream-providers
// Description: Built-in `faker.*` fake-data functions and the registry that
//              dispatches them for the `faker.<provider>.<method>` leaf
//              generator (`spec.md` §4.B).
// Purpose: Give `simstream-core`'s generator something real to call without
//          the core crate depending on any fake-data implementation.
// Dependencies: simstream-core, rand, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each domain module (`person`, `internet`, `commerce`, `lorem`, `address`)
//! exposes pure functions of the form `fn(params, rng) -> JsonValue`, drawing
//! every random choice from the caller-supplied RNG so a run stays
//! reproducible under a fixed seed. [`ProviderRegistry`] maps the dotted
//! `faker.*` suffix (e.g. `person.name`) to its function and implements
//! [`simstream_core::interfaces::FakeProvider`].

pub mod address;
pub mod commerce;
pub mod internet;
pub mod lorem;
pub mod person;
pub mod registry;

pub use registry::ProviderRegistry;
