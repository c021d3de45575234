// crates/simstream-core/src/core/event.rs
// ============================================================================
// Module: Simstream Event Model
// Description: Scheduled and emitted event records (`spec.md` §3, §6).
// Purpose: Separate the scheduler's pending work item (`ScheduledEvent`)
//          from the wire-format record a sink actually emits (`Event`).
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! `ScheduledEvent` carries only what is known at push time: which event
//! type, when, and any pre-bound context (scenario instance, payload
//! overrides). FIFO tie-breaking on equal `scheduled_time` is a scheduler
//! mechanism, not a data-model property, so the insertion sequence number
//! used for it lives in `runtime::scheduler`, not here.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use crate::core::context::Context;
use crate::core::identifiers::EventTypeName;
use crate::core::time::SimTime;

// ============================================================================
// SECTION: Scheduled Event
// ============================================================================

/// A pending item in the Scheduler's priority queue.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    /// The event type to generate and emit when popped.
    pub event_type: EventTypeName,
    /// The virtual time at which this event becomes due.
    pub scheduled_time: SimTime,
    /// Pre-bound context (e.g. `scenario_instance`, `payload_overrides`)
    /// established when this entry was pushed.
    pub context: Context,
}

impl ScheduledEvent {
    /// Creates a scheduled event with an empty pre-bound context.
    #[must_use]
    pub fn new(event_type: EventTypeName, scheduled_time: SimTime) -> Self {
        Self {
            event_type,
            scheduled_time,
            context: Context::new(),
        }
    }

    /// Creates a scheduled event carrying pre-bound `context`.
    #[must_use]
    pub fn with_context(event_type: EventTypeName, scheduled_time: SimTime, context: Context) -> Self {
        Self {
            event_type,
            scheduled_time,
            context,
        }
    }
}

// ============================================================================
// SECTION: Emitted Event
// ============================================================================

/// An emitted event, in the wire shape `spec.md` §6 defines:
/// `{event_type, payload, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The event type name.
    pub event_type: String,
    /// The generated payload.
    pub payload: JsonValue,
    /// ISO-8601 timestamp with timezone, resolved from virtual time against
    /// the run's wall-clock anchor.
    pub timestamp: String,
}

impl Event {
    /// Builds an emitted event from a generated payload and a resolved
    /// wall-clock timestamp.
    ///
    /// # Errors
    ///
    /// Returns a formatting error if RFC 3339 rendering fails, which only
    /// happens for out-of-range years `time` cannot represent.
    pub fn new(event_type: EventTypeName, payload: JsonValue, at: OffsetDateTime) -> Result<Self, time::error::Format> {
        use time::format_description::well_known::Rfc3339;
        Ok(Self {
            event_type: event_type.to_string(),
            payload,
            timestamp: at.format(&Rfc3339)?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;
    use serde_json::json;

    #[test]
    fn event_serializes_to_spec_wire_shape() {
        let anchor = OffsetDateTime::from_unix_timestamp(0).unwrap();
        let event = Event::new(EventTypeName::new("signup"), json!({"id": "u1"}), anchor).unwrap();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], json!("signup"));
        assert_eq!(value["payload"]["id"], json!("u1"));
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }
}
