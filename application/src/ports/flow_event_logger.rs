//! Port for structured flow event logging.
//!
//! Defines the [`FlowEventLogger`] trait for recording analytics events
//! (executions recorded, telemetry dropped, improvement annotations) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures an audit
//! trail in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured flow event for logging.
pub struct FlowEvent {
    /// Event type identifier (e.g., "execution_recorded").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl FlowEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging flow events to a structured log.
///
/// `log` is synchronous and non-fallible; logging failures are ignored.
pub trait FlowEventLogger: Send + Sync {
    fn log(&self, event: FlowEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoFlowEventLogger;

impl FlowEventLogger for NoFlowEventLogger {
    fn log(&self, _event: FlowEvent) {}
}
