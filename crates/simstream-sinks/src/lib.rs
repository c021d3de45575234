// crates/simstream-sinks/src/lib.rs
// ============================================================================
// Crate: simstream-sinks
// Description: Concrete `Sink` implementations (`spec.md` §4.G, §6):
//              stdout, file, and (feature-gated) Kafka.
// Purpose: Give a run somewhere to actually deliver emitted events without
//          `simstream-core` depending on any particular transport.
// Dependencies: simstream-core, serde_json, thiserror, tracing, rdkafka (optional)
// ============================================================================

//! ## Overview
//! Every sink here implements [`simstream_core::interfaces::Sink`] and
//! serializes with [`OutputFormat`] (compact or indented JSON, `spec.md`
//! §6). Kafka routing resolves a topic via `topic_mapping[event_type]`,
//! falling back to `events` when the event type is unmapped.

pub mod file;
pub mod format;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod stdout;

pub use file::FileSink;
pub use format::OutputFormat;
#[cfg(feature = "kafka")]
pub use kafka::KafkaSink;
pub use stdout::StdoutSink;
