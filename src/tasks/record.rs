//! Task data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Lifecycle status of a task.
///
/// Transitions: `Pending -> Running -> {Completed, Error, Cancelled}`;
/// `Running <-> Paused`; any of `{Pending, Running, Paused}` can be
/// cancelled. Tasks found `Running`/`Paused` at restart become
/// `Interrupted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not yet started.
    Pending,
    /// Executing under the scheduler or worker pool.
    Running,
    /// Pause signal set; the task is parked at a checkpoint.
    Paused,
    /// Finished successfully.
    Completed,
    /// Acknowledged a cancellation request.
    Cancelled,
    /// Failed; the message is in [`TaskRecord::error`].
    Error,
    /// Was running or paused when the process last shut down.
    Interrupted,
}

impl TaskStatus {
    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed
                | TaskStatus::Cancelled
                | TaskStatus::Error
                | TaskStatus::Interrupted
        )
    }
}

/// Progress snapshot of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    /// Current progress value (e.g. items processed).
    pub current: f64,
    /// Total value at completion.
    pub total: f64,
    /// Human-readable progress message.
    pub message: String,
}

/// Persistent record of a background task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique task id (UUID v4).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Registered task type this record was created from.
    pub task_type: String,
    /// Whether this task excludes other exclusive tasks.
    pub is_exclusive: bool,
    /// Whether the task body runs on the blocking worker pool.
    pub is_blocking: bool,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Latest progress snapshot.
    #[serde(default)]
    pub progress: TaskProgress,
    /// Final result, if the task produced one.
    pub result: Option<Value>,
    /// Error message, if the task failed or was interrupted.
    pub error: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Set exactly once, on entering `Running`.
    pub started_at: Option<DateTime<Utc>>,
    /// Set when a terminal state is reached.
    pub completed_at: Option<DateTime<Utc>>,
    /// Arguments the task was started with, kept for diagnostics and
    /// potential restarts.
    #[serde(default)]
    pub run_args: Vec<Value>,
}

impl TaskRecord {
    /// Create a fresh `Pending` record.
    pub fn new(
        name: impl Into<String>,
        task_type: impl Into<String>,
        is_exclusive: bool,
        is_blocking: bool,
        run_args: Vec<Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            task_type: task_type.into(),
            is_exclusive,
            is_blocking,
            status: TaskStatus::Pending,
            progress: TaskProgress::default(),
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            run_args,
        }
    }
}
