// crates/simstream-core/tests/support/mod.rs
// ============================================================================
// Module: End-to-End Test Support
// Description: Shared fixtures for the `spec.md` §8 end-to-end scenarios.
// ============================================================================

#![allow(dead_code, reason = "Not every fixture is used by every test file.")]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value as JsonValue;
use simstream_core::core::event::Event;
use simstream_core::interfaces::FakeProvider;
use simstream_core::interfaces::FakeProviderError;
use simstream_core::interfaces::Sink;
use simstream_core::interfaces::SinkError;

/// Collects every emitted event in order, for assertion after a run.
#[derive(Clone, Default)]
pub struct CaptureSink {
    events: Rc<RefCell<Vec<Event>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}

impl Sink for CaptureSink {
    fn emit(&mut self, event: &Event) -> Result<(), SinkError> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// A [`FakeProvider`] with no registered functions, sufficient for scenarios
/// whose schemas never invoke `faker.*`.
pub struct NoProviders;

impl FakeProvider for NoProviders {
    fn call(&self, name: &str, _params: &JsonValue, _rng: &mut dyn rand::RngCore) -> Result<JsonValue, FakeProviderError> {
        Err(FakeProviderError::UnknownFunction(name.to_string()))
    }
}

/// A fixed, non-"now" anchor so every run in these tests is fully
/// reproducible, including its wall-clock timestamps.
pub fn fixed_anchor() -> time::OffsetDateTime {
    time::OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid unix timestamp")
}
