//! Port for structured poll event logging.
//!
//! Defines the [`PollEventLogger`] trait for recording lifecycle events
//! (poll created, choice added, vote toggled, poll ended or deleted) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures an audit
//! trail of state changes in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured poll event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. Writers add the timestamp.
pub struct PollEvent {
    /// Event type identifier (e.g., "poll_created", "vote_added", "poll_ended").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl PollEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging poll events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// The `log` method is intentionally synchronous and non-fallible so that a
/// broken log never blocks a vote or a reconciliation tick.
pub trait PollEventLogger: Send + Sync {
    /// Record a poll event.
    fn log(&self, event: PollEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoPollEventLogger;

impl PollEventLogger for NoPollEventLogger {
    fn log(&self, _event: PollEvent) {}
}
