//! Telemetry and logging sinks
//!
//! Both sinks are injected collaborators. The default implementations forward
//! everything to `tracing`.

use crate::eligibility::RequestInfo;
use chrono::Utc;
use std::collections::BTreeMap;

/// A structured key/value telemetry event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryEvent {
    /// Log event names attached to the event, e.g. `button_click`
    pub names: Vec<String>,
    /// Tracking payload
    pub fields: BTreeMap<String, String>,
}

impl TelemetryEvent {
    /// Create an event with a first name, stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            crate::types::fpti::TIMESTAMP.to_string(),
            Utc::now().timestamp_millis().to_string(),
        );
        Self {
            names: vec![name.into()],
            fields,
        }
    }

    /// Attach another event name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Attach a tracking field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Get a tracking field
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Sink for structured telemetry and fire-and-forget beacons
pub trait TelemetrySink: Send + Sync {
    /// Record and flush a structured event
    fn track(&self, event: TelemetryEvent);

    /// Fire a tracking beacon
    fn send_beacon(&self, url: &str);
}

/// Telemetry sink writing to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn track(&self, event: TelemetryEvent) {
        tracing::info!(names = ?event.names, fields = ?event.fields, "telemetry event");
    }

    fn send_beacon(&self, url: &str) {
        tracing::debug!("beacon: {}", url);
    }
}

/// Sink for error events tied to an inbound request
pub trait Logger: Send + Sync {
    /// Record an error event
    fn error(&self, request: &RequestInfo, event: &str, context: serde_json::Value);
}

/// Logger writing to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, request: &RequestInfo, event: &str, context: serde_json::Value) {
        tracing::error!(
            ip = ?request.ip(),
            event = event,
            context = %context,
            "request error"
        );
    }
}
