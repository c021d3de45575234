// crates/simstream-sinks/src/kafka.rs
// ============================================================================
// Module: Kafka Sink
// Description: Publishes emitted events to Kafka, routed by
//              `topic_mapping[event_type]` with fallback topic `events`
//              (`spec.md` §6, output `type: kafka`).
// Purpose: Let a run feed a real streaming pipeline instead of a file.
// Dependencies: simstream-core, rdkafka
// ============================================================================

//! ## Overview
//! Built on `rdkafka`'s [`BaseProducer`], which queues records and hands
//! delivery to a background poll thread rather than requiring an async
//! runtime — a good fit for [`Sink::emit`]'s synchronous signature.

use std::collections::HashMap;
use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::producer::BaseProducer;
use rdkafka::producer::BaseRecord;
use rdkafka::producer::Producer;
use simstream_core::core::event::Event;
use simstream_core::interfaces::Sink;
use simstream_core::interfaces::SinkError;

use crate::format::OutputFormat;

const DEFAULT_TOPIC: &str = "events";
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Publishes events to Kafka, one record per event.
pub struct KafkaSink {
    producer: BaseProducer,
    topic_mapping: HashMap<String, String>,
    format: OutputFormat,
}

impl KafkaSink {
    /// Connects a producer to `bootstrap_servers`, routing events per
    /// `topic_mapping` (event type → topic) with `events` as the fallback
    /// topic for unmapped event types.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the producer cannot be constructed (e.g. an
    /// invalid configuration value).
    pub fn connect(bootstrap_servers: &str, topic_mapping: HashMap<String, String>, format: OutputFormat) -> Result<Self, SinkError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .create()
            .map_err(|err| SinkError::Failed(format!("failed to create kafka producer: {err}")))?;
        Ok(Self {
            producer,
            topic_mapping,
            format,
        })
    }

    fn topic_for(&self, event_type: &str) -> &str {
        self.topic_mapping.get(event_type).map_or(DEFAULT_TOPIC, String::as_str)
    }
}

impl Sink for KafkaSink {
    fn emit(&mut self, event: &Event) -> Result<(), SinkError> {
        let rendered = self.format.render(event)?;
        let topic = self.topic_for(&event.event_type).to_string();
        let record: BaseRecord<'_, (), str> = BaseRecord::to(&topic).payload(&rendered);
        self.producer
            .send(record)
            .map_err(|(err, _)| SinkError::Failed(format!("failed to enqueue event on topic {topic}: {err}")))?;
        self.producer.poll(Duration::from_secs(0));
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.producer
            .flush(FLUSH_TIMEOUT)
            .map_err(|err| SinkError::Failed(format!("failed to flush kafka producer: {err}")))
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
    fn topic_for_falls_back_to_default_when_unmapped() {
        let mut mapping = HashMap::new();
        mapping.insert("signup".to_string(), "signups".to_string());
        let sink = KafkaSink::connect("localhost:9092", mapping, OutputFormat::Json).unwrap();

        assert_eq!(sink.topic_for("signup"), "signups");
        assert_eq!(sink.topic_for("purchase"), DEFAULT_TOPIC);
    }
}
