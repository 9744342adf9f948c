//! Error types for the scanrig-motion core.
//!
//! One flat taxonomy covers motor control, endstop handling and task
//! orchestration. Callers receive these as typed failures; a request
//! rejection is never silently swallowed.

use thiserror::Error;

/// Result type alias using the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all scanrig-motion operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// A conflicting operation is already in progress (e.g. a second move
    /// requested while the motor is still stepping).
    #[error("{0} is busy")]
    Busy(String),

    /// A motor, task or task type was looked up under an unknown name.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was looked up ("motor", "task", "task type", ...).
        kind: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// Exclusivity or state-machine violation (second exclusive task,
    /// pausing a completed task, duplicate registration).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A wall-clock wait exceeded its bound.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Invalid settings or pin role conflict.
    #[error("configuration error: {0}")]
    Config(String),

    /// An underlying capability call (GPIO, task store, worker pool) failed.
    #[error("hardware fault: {0}")]
    Hardware(String),

    /// A cooperative checkpoint observed a cancellation request.
    ///
    /// Task runners return this from a checkpoint to acknowledge
    /// cancellation; the task manager maps it to the `Cancelled` status
    /// rather than the `Error` status.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Shorthand for [`Error::NotFound`] with the given kind and name.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for [`Error::Busy`] naming the busy resource.
    pub fn busy(what: impl Into<String>) -> Self {
        Error::Busy(what.into())
    }
}
