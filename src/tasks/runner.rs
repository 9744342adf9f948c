//! Task execution contract.
//!
//! A task kind is registered as either an async runner (driven by the
//! cooperative scheduler) or a blocking runner (offloaded to the worker
//! pool). A runner either returns its final result, or streams progress
//! through the [`TaskContext`] and sets the result on the record before
//! returning — never both shapes at once.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::events::StatusSink;
use crate::tasks::record::TaskRecord;
use crate::tasks::signals::TaskSignals;
use crate::tasks::store::TaskStore;

/// Async task body, run directly under the cooperative scheduler.
///
/// Implementations must call [`TaskContext::checkpoint`] at each natural
/// unit of work so pause and cancellation are observed promptly.
#[async_trait]
pub trait AsyncTask: Send + Sync {
    /// Execute the task.
    ///
    /// Return `Ok(Some(value))` for a final result, or `Ok(None)` after
    /// storing the result with [`TaskContext::set_result`] (or when there
    /// is none). Return [`crate::Error::Cancelled`] from a checkpoint to
    /// acknowledge cancellation.
    async fn run(&self, ctx: TaskContext, args: Vec<Value>) -> Result<Option<Value>>;
}

/// Blocking task body, run on the worker pool.
///
/// Pause is not supported here; implementations observe cancellation via
/// [`TaskContext::checkpoint_blocking`].
pub trait BlockingTask: Send + Sync {
    /// Execute the task to completion. Same result contract as
    /// [`AsyncTask::run`].
    fn run(&self, ctx: TaskContext, args: Vec<Value>) -> Result<Option<Value>>;
}

/// The two execution shapes a task kind can declare.
#[derive(Clone)]
pub enum TaskExec {
    /// Runs under the cooperative scheduler.
    Async(Arc<dyn AsyncTask>),
    /// Runs on the blocking worker pool.
    Blocking(Arc<dyn BlockingTask>),
}

/// A registered task kind: its execution shape plus concurrency policy.
#[derive(Clone)]
pub struct TaskKind {
    /// Whether this kind excludes other exclusive tasks while running.
    pub exclusive: bool,
    /// The execution shape.
    pub exec: TaskExec,
}

impl TaskKind {
    /// A non-exclusive async task kind.
    pub fn async_task(runner: Arc<dyn AsyncTask>) -> Self {
        Self {
            exclusive: false,
            exec: TaskExec::Async(runner),
        }
    }

    /// A non-exclusive blocking task kind.
    pub fn blocking_task(runner: Arc<dyn BlockingTask>) -> Self {
        Self {
            exclusive: false,
            exec: TaskExec::Blocking(runner),
        }
    }

    /// Mark this kind as exclusive.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Whether the kind runs on the blocking worker pool.
    pub fn is_blocking(&self) -> bool {
        matches!(self.exec, TaskExec::Blocking(_))
    }
}

/// Handle a running task uses to report progress, store a result and
/// observe pause/cancellation.
#[derive(Clone)]
pub struct TaskContext {
    record: Arc<Mutex<TaskRecord>>,
    signals: Arc<TaskSignals>,
    store: Arc<dyn TaskStore>,
    events: Arc<dyn StatusSink>,
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl TaskContext {
    pub(crate) fn new(
        record: Arc<Mutex<TaskRecord>>,
        signals: Arc<TaskSignals>,
        store: Arc<dyn TaskStore>,
        events: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            record,
            signals,
            store,
            events,
        }
    }

    /// The id of the task this context belongs to.
    pub fn task_id(&self) -> String {
        lock_ignoring_poison(&self.record).id.clone()
    }

    /// Pause-then-cancellation checkpoint for async tasks.
    pub async fn checkpoint(&self) -> Result<()> {
        self.signals.checkpoint().await
    }

    /// Cancellation checkpoint for blocking tasks.
    pub fn checkpoint_blocking(&self) -> Result<()> {
        self.signals.checkpoint_blocking()
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.signals.is_cancelled()
    }

    /// Publish a progress snapshot and persist it immediately.
    pub fn report_progress(&self, current: f64, total: f64, message: impl Into<String>) {
        let snapshot = {
            let mut record = lock_ignoring_poison(&self.record);
            record.progress.current = current;
            record.progress.total = total;
            record.progress.message = message.into();
            record.clone()
        };
        if let Err(e) = self.store.save(&snapshot) {
            warn!(task = %snapshot.id, error = %e, "failed to persist task progress");
        }
        self.events.publish(
            &format!("tasks.{}.progress", snapshot.id),
            serde_json::json!({
                "id": snapshot.id,
                "current": snapshot.progress.current,
                "total": snapshot.progress.total,
                "message": snapshot.progress.message,
            }),
        );
    }

    /// Store the final result on the task record directly. Used by
    /// progress-streaming tasks, which return `Ok(None)` from `run`.
    pub fn set_result(&self, value: Value) {
        lock_ignoring_poison(&self.record).result = Some(value);
    }
}
