// crates/simstream-core/src/runtime/scheduler.rs
// ============================================================================
// Module: Simstream Scheduler
// Description: Virtual-time priority queue of pending events, plus the
//              feasibility gate and replenishment policy (`spec.md` §4.E).
// Purpose: Pop events in scheduled-time order with FIFO tie-break, and keep
//          the queue topped up with weighted, feasibility-filtered picks.
// Dependencies: crate::core, indexmap
// ============================================================================

//! ## Overview
//! `ScheduledEvent` (`crate::core::event`) deliberately carries no ordering
//! mechanics; [`HeapEntry`] supplies them here, as a private wrapper that
//! pairs each event with a monotonic insertion sequence so two events due at
//! the identical `scheduled_time` pop in the order they were pushed
//! (`spec.md` §8 invariant 2).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use indexmap::IndexMap;

use crate::core::errors::CoreError;
use crate::core::event::ScheduledEvent;
use crate::core::event_type::EventTypeDef;
use crate::core::identifiers::EntityTypeName;
use crate::core::identifiers::EventTypeName;
use crate::core::time::SimTime;
use crate::runtime::rng::SimRng;
use crate::runtime::store::EntityStore;

// ============================================================================
// SECTION: Heap Entry
// ============================================================================

struct HeapEntry {
    event: ScheduledEvent,
    sequence: u64,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.event.scheduled_time == other.event.scheduled_time && self.sequence == other.sequence
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    /// Reversed so [`BinaryHeap`] (a max-heap) pops the earliest
    /// `scheduled_time`, and the lowest `sequence` among ties.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .event
            .scheduled_time
            .cmp(&self.event.scheduled_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

// ============================================================================
// SECTION: Replenishment Policy
// ============================================================================

/// Tunables for queue replenishment (`spec.md` §4.E), overridable from
/// `simulation_settings`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Replenish when the queue length drops below this watermark.
    pub low_watermark: usize,
    /// Number of events scheduled per replenishment pass.
    pub replenish_batch: usize,
    /// Minimum delay, in seconds, for a replenished event's `scheduled_time`.
    pub delay_min_seconds: f64,
    /// Maximum delay, in seconds, for a replenished event's `scheduled_time`.
    pub delay_max_seconds: f64,
    /// Maximum delay, in seconds, used only for the very first priming pass.
    pub initial_delay_max_seconds: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            low_watermark: 100,
            replenish_batch: 10,
            delay_min_seconds: 10.0,
            delay_max_seconds: 300.0,
            initial_delay_max_seconds: 60.0,
        }
    }
}

// ============================================================================
// SECTION: Scheduler
// ============================================================================

/// The run's virtual-time event queue.
pub struct Scheduler {
    heap: BinaryHeap<HeapEntry>,
    next_sequence: u64,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Creates an empty scheduler with the given replenishment policy.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
            config,
        }
    }

    /// Pushes an event, assigning it the next insertion sequence number.
    pub fn push(&mut self, event: ScheduledEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(HeapEntry { event, sequence });
    }

    /// Pops the event with the earliest `scheduled_time`, breaking ties by
    /// insertion order.
    pub fn pop_earliest(&mut self) -> Option<ScheduledEvent> {
        self.heap.pop().map(|entry| entry.event)
    }

    /// Number of events currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether the queue has dropped below the configured low watermark.
    #[must_use]
    pub fn needs_replenish(&self) -> bool {
        self.heap.len() < self.config.low_watermark
    }

    /// Schedules up to `replenish_batch` new events, chosen by
    /// `frequency_weight` among event types currently feasible against
    /// `store`, with delays drawn from the run's `config`.
    ///
    /// `initial` selects the wider `initial_delay_max_seconds` priming
    /// window used only for the run's first replenishment pass (`spec.md`
    /// §4.F rule 1).
    ///
    /// # Errors
    ///
    /// Propagates any [`CoreError`] raised evaluating a `consumes_entities`
    /// feasibility filter.
    pub fn replenish(
        &mut self,
        current_time: SimTime,
        event_types: &IndexMap<EventTypeName, EventTypeDef>,
        store: &EntityStore,
        rng: &mut SimRng,
        initial: bool,
    ) -> Result<usize, CoreError> {
        let mut feasible = Vec::new();
        for (name, def) in event_types {
            // A zero or negative weight can never be drawn, so it is
            // excluded from feasibility itself rather than left to make
            // `choose_weighted_index` fail on an all-zero weight vector.
            if def.frequency_weight > 0.0 && can_generate(def, store)? {
                feasible.push((name.clone(), def.frequency_weight));
            }
        }
        if feasible.is_empty() {
            return Ok(0);
        }

        let weights: Vec<f64> = feasible.iter().map(|(_, weight)| *weight).collect();
        let (delay_min, delay_max) = if initial { (0.0, self.config.initial_delay_max_seconds) } else { (self.config.delay_min_seconds, self.config.delay_max_seconds) };

        let mut scheduled = 0;
        for _ in 0..self.config.replenish_batch {
            let index = rng
                .choose_weighted_index(&weights)
                .map_err(|err| CoreError::InvalidSchema(format!("replenishment weights are invalid: {err}")))?;
            let delay = rng.gen_range_f64(delay_min, delay_max);
            let scheduled_time = current_time.advance(delay);
            self.push(ScheduledEvent::new(feasible[index].0.clone(), scheduled_time));
            scheduled += 1;
        }
        Ok(scheduled)
    }
}

/// Checks whether every `consumes_entities` clause of `event_type` can be
/// satisfied against `store`: at least `min_required` matching entities for
/// each clause.
///
/// # Errors
///
/// Propagates any [`CoreError`] raised evaluating a selection filter.
pub fn can_generate(event_type: &EventTypeDef, store: &EntityStore) -> Result<bool, CoreError> {
    for consumption in &event_type.consumes_entities {
        let count = store.count(&EntityTypeName::new(consumption.entity_type.as_str()), &consumption.selection_filter)?;
        if count < consumption.min_required {
            return Ok(false);
        }
    }
    Ok(true)
}
