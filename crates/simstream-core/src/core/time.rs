// crates/simstream-core/src/core/time.rs
// ============================================================================
// Module: Simstream Virtual Time
// Description: Virtual simulation clock, decoupled from wall-clock time.
// Purpose: Provide a monotonically-advanceable time value the core never
//          derives from a live clock read, so runs stay replayable.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! `SimTime` is a pure value: fractional seconds elapsed since the run's
//! configured anchor (`time_progression.start_time`). The orchestrator is
//! the only place permitted to resolve an anchor from `"now"`; everywhere
//! else in the core, time flows exclusively through scheduled-event pops
//! and explicit deltas, never through a fresh clock read.

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Virtual Time
// ============================================================================

/// A point in virtual simulation time, in fractional seconds since the run
/// anchor.
///
/// # Invariants
/// - Never constructed from a live wall-clock read within `simstream-core`;
///   the orchestrator resolves `"now"` exactly once at run start.
/// - Comparisons use [`f64::total_cmp`] so values can sit in an ordered
///   collection (the scheduler's priority queue) without requiring `Eq`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SimTime(f64);

impl SimTime {
    /// The start of simulation time, by convention `0.0`.
    pub const ZERO: Self = Self(0.0);

    /// Constructs a `SimTime` from a fractional-seconds offset.
    #[must_use]
    pub const fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Returns the underlying fractional-seconds offset.
    #[must_use]
    pub const fn as_seconds(self) -> f64 {
        self.0
    }

    /// Returns a new `SimTime` advanced by `delta_seconds` (may be negative,
    /// though the scheduler never produces negative delays).
    #[must_use]
    pub fn advance(self, delta_seconds: f64) -> Self {
        Self(self.0 + delta_seconds)
    }

    /// Resolves this virtual time to an absolute timestamp given the run's
    /// wall-clock anchor.
    #[must_use]
    pub fn to_offset_date_time(self, anchor: OffsetDateTime) -> OffsetDateTime {
        anchor + Duration::seconds_f64(self.0)
    }
}

impl Eq for SimTime {}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

// ============================================================================
// SECTION: Timestamp Formatting
// ============================================================================

/// Output formats accepted by `current_timestamp` and stringified
/// date/time leaf values (`spec.md` §4.B, §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// RFC 3339 / ISO-8601 with timezone.
    Iso8601,
    /// Unix epoch seconds.
    Unix,
    /// Unix epoch milliseconds.
    UnixMs,
    /// Calendar date only (`YYYY-MM-DD`).
    Date,
    /// Time of day only (`HH:MM:SS`).
    Time,
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self::Iso8601
    }
}

/// Renders an absolute timestamp per `format`.
///
/// # Errors
///
/// Returns an error if the underlying `time` formatting call fails, which
/// only happens if the process's formatting descriptors are malformed (they
/// are not: they are compile-time `time::macros::format_description!`
/// constants).
pub fn format_timestamp(value: OffsetDateTime, format: TimestampFormat) -> Result<String, time::error::Format> {
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;

    match format {
        TimestampFormat::Iso8601 => value.format(&Rfc3339),
        TimestampFormat::Unix => Ok(value.unix_timestamp().to_string()),
        TimestampFormat::UnixMs => Ok((value.unix_timestamp_nanos() / 1_000_000).to_string()),
        TimestampFormat::Date => value.format(format_description!("[year]-[month]-[day]")),
        TimestampFormat::Time => value.format(format_description!("[hour]:[minute]:[second]")),
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

    #[test]
    fn ordering_is_total() {
        let a = SimTime::from_seconds(1.0);
        let b = SimTime::from_seconds(2.0);
        assert!(a < b);
        assert_eq!(a.advance(1.0), b);
    }

    #[test]
    fn anchor_resolution_adds_elapsed_seconds() {
        let anchor = OffsetDateTime::from_unix_timestamp(1_000).unwrap();
        let t = SimTime::from_seconds(90.0);
        let resolved = t.to_offset_date_time(anchor);
        assert_eq!(resolved.unix_timestamp(), 1_090);
    }

    #[test]
    fn unix_ms_format_matches_expected_scale() {
        let anchor = OffsetDateTime::from_unix_timestamp(1_000).unwrap();
        let rendered = format_timestamp(anchor, TimestampFormat::UnixMs).unwrap();
        assert_eq!(rendered, "1000000");
    }
}
