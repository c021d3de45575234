// crates/simstream-sinks/src/stdout.rs
// ============================================================================
// Module: Stdout Sink
// Description: Writes emitted events to stdout, one rendering per event
//              (`spec.md` §6, output `type: stdout`).
// Purpose: The simplest sink, and the default an operator reaches for while
//          iterating on a scenario.
// Dependencies: simstream-core, std::io
// ============================================================================

use std::io;
use std::io::Write;

use simstream_core::core::event::Event;
use simstream_core::interfaces::Sink;
use simstream_core::interfaces::SinkError;

use crate::format::OutputFormat;

/// Writes each event to stdout, flushing after every write so output stays
/// visible even if the process is later killed mid-run.
pub struct StdoutSink {
    format: OutputFormat,
}

impl StdoutSink {
    /// Creates a stdout sink rendering events with `format`.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl Sink for StdoutSink {
    fn emit(&mut self, event: &Event) -> Result<(), SinkError> {
        let rendered = self.format.render(event)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{rendered}").map_err(|err| SinkError::Failed(format!("failed to write to stdout: {err}")))?;
        stdout.flush().map_err(|err| SinkError::Failed(format!("failed to flush stdout: {err}")))
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
    fn emit_succeeds_for_a_well_formed_event() {
        let mut sink = StdoutSink::new(OutputFormat::Json);
        let event = Event {
            event_type: "signup".to_string(),
            payload: json!({"id": "u1"}),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };
        assert!(sink.emit(&event).is_ok());
    }
}
