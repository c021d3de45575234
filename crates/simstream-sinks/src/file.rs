// crates/simstream-sinks/src/file.rs
// ============================================================================
// Module: File Sink
// Description: Appends emitted events, one rendering per line, to a file on
//              disk (`spec.md` §6, output `type: file`).
// Purpose: Durable capture of a run's event stream for later inspection.
// Dependencies: simstream-core, std::fs, std::io
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use simstream_core::core::event::Event;
use simstream_core::interfaces::Sink;
use simstream_core::interfaces::SinkError;

use crate::format::OutputFormat;

/// Appends events to a file, buffering writes and flushing on [`close`](Sink::close).
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    format: OutputFormat,
}

impl FileSink {
    /// Opens (creating if absent, truncating any existing content) the file
    /// at `path` for writing.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] if the file cannot be created or opened.
    pub fn create(path: impl AsRef<Path>, format: OutputFormat) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            format,
        })
    }

    /// The path events are being written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn emit(&mut self, event: &Event) -> Result<(), SinkError> {
        let rendered = self.format.render(event)?;
        writeln!(self.writer, "{rendered}").map_err(|err| SinkError::Failed(format!("failed to write to {}: {err}", self.path.display())))
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|err| SinkError::Failed(format!("failed to flush {}: {err}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use std::fs;

    use super::*;
    use serde_json::json;

    #[test]
    fn emit_then_close_persists_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut sink = FileSink::create(&path, OutputFormat::Json).unwrap();

        for id in ["u1", "u2"] {
            let event = Event {
                event_type: "signup".to_string(),
                payload: json!({"id": id}),
                timestamp: "2024-01-01T00:00:00Z".to_string(),
            };
            sink.emit(&event).unwrap();
        }
        sink.close().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn create_truncates_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        fs::write(&path, "stale\ndata\n").unwrap();

        let mut sink = FileSink::create(&path, OutputFormat::Json).unwrap();
        let event = Event {
            event_type: "signup".to_string(),
            payload: json!({"id": "u1"}),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };
        sink.emit(&event).unwrap();
        sink.close().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(!contents.contains("stale"));
    }
}
