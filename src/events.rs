//! Status-broadcast sink.
//!
//! The core emits an event on every motor busy-change and every task
//! status change. Delivery is fire-and-forget: implementations log their
//! own failures, the core never treats a publish as fatal.

use serde_json::Value;

/// External status-broadcast sink.
///
/// Topics used by the core:
/// - `motors.<name>.busy` on every idle/moving transition
/// - `motors.<name>.settings` when motor settings are applied
/// - `tasks.<id>.status` on every task status change
/// - `tasks.<id>.progress` on every progress report
pub trait StatusSink: Send + Sync {
    /// Publish a payload on a topic. Must not block and must not panic.
    fn publish(&self, topic: &str, payload: Value);
}

/// A sink that discards everything. Useful for tests and headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn publish(&self, _topic: &str, _payload: Value) {}
}
