// crates/simstream-sinks/src/format.rs
// ============================================================================
// Module: Output Format
// Description: The `format: json|json_pretty` knob shared by every sink
//              (`spec.md` §6).
// Purpose: Centralize compact vs. indented JSON encoding so stdout, file,
//          and Kafka sinks serialize identically.
// Dependencies: serde_json
// ============================================================================

use simstream_core::core::event::Event;
use simstream_core::interfaces::SinkError;

/// How a sink renders an [`Event`] to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per event, no extra whitespace.
    #[default]
    Json,
    /// Multi-line, human-readable indentation.
    JsonPretty,
}

impl OutputFormat {
    /// Serializes `event` per this format, mapping any failure (there
    /// shouldn't be one, since `Event` always serializes cleanly) to
    /// [`SinkError`].
    pub fn render(self, event: &Event) -> Result<String, SinkError> {
        let rendered = match self {
            OutputFormat::Json => serde_json::to_string(event),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(event),
        };
        rendered.map_err(|err| SinkError::Failed(format!("failed to serialize event: {err}")))
    }
}
