//! Alert sink capability.
//!
//! Constructed once at process start and passed into the quota
//! monitor; no global client. Publication is fire-and-forget: sinks
//! swallow and log their own transport failures so a broken alerting
//! path never blocks a sweep or a cache update.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

/// Where alert events go. Must never fail for callers.
pub trait AlertSink: Send + Sync {
    fn publish(&self, message: &str, severity: Severity, metadata: HashMap<String, String>);
}

/// Default sink: emits alerts as tracing events.
#[derive(Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn publish(&self, message: &str, severity: Severity, metadata: HashMap<String, String>) {
        match severity {
            Severity::Info => tracing::info!(?metadata, "{message}"),
            Severity::Warning => tracing::warn!(?metadata, "{message}"),
            Severity::Error => tracing::error!(?metadata, "{message}"),
        }
    }
}

/// A captured alert event.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub message: String,
    pub severity: Severity,
    pub metadata: HashMap<String, String>,
}

/// Sink that records events in memory, for tests.
#[derive(Debug, Default)]
pub struct InMemoryAlertSink {
    events: Mutex<Vec<AlertEvent>>,
}

impl InMemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().expect("alert sink lock poisoned").clone()
    }
}

impl AlertSink for InMemoryAlertSink {
    fn publish(&self, message: &str, severity: Severity, metadata: HashMap<String, String>) {
        self.events
            .lock()
            .expect("alert sink lock poisoned")
            .push(AlertEvent {
                message: message.to_string(),
                severity,
                metadata,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_events() {
        let sink = InMemoryAlertSink::new();
        sink.publish(
            "size limit exceeded",
            Severity::Warning,
            HashMap::from([("kind".to_string(), "Crash".to_string())]),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Warning);
        assert_eq!(events[0].metadata.get("kind").unwrap(), "Crash");
    }
}
