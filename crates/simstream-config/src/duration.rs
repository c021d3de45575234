// crates/simstream-config/src/duration.rs
// ============================================================================
// Module: Duration Parsing
// Description: Parses `simulation_settings.duration` (`spec.md` §6, regex
//              `^\d+[smh]$`) into seconds.
// Purpose: Give the Orchestrator's `duration_seconds` termination condition
//          a single, validated number instead of a raw string.
// Dependencies: crate::error
// ============================================================================

use crate::error::ConfigError;

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Parses a duration string of the form `<digits><s|m|h>` into seconds.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if `text` does not match
/// `^\d+[smh]$`.
pub fn parse_duration_seconds(text: &str) -> Result<f64, ConfigError> {
    let (digits, unit) = text.split_at(text.len().saturating_sub(1));
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::Invalid(format!("malformed duration: {text}")));
    }
    let magnitude: f64 = digits
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("duration magnitude out of range: {text}")))?;
    let multiplier = match unit {
        "s" => 1.0,
        "m" => SECONDS_PER_MINUTE,
        "h" => SECONDS_PER_HOUR,
        _ => return Err(ConfigError::Invalid(format!("malformed duration: {text}"))),
    };
    Ok(magnitude * multiplier)
}
