//! Task lifecycle management.
//!
//! The manager owns the registry of task kinds, the in-memory record
//! table and the signal handles of running tasks. Exclusivity is checked
//! at submission: a second exclusive task is rejected outright rather
//! than queued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::events::StatusSink;
use crate::tasks::record::{TaskRecord, TaskStatus};
use crate::tasks::runner::{TaskContext, TaskExec, TaskKind};
use crate::tasks::signals::TaskSignals;
use crate::tasks::store::TaskStore;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Owns task registration, execution, pause/cancel signalling and
/// restart recovery.
pub struct TaskManager {
    registry: Mutex<HashMap<String, TaskKind>>,
    tasks: Mutex<HashMap<String, Arc<Mutex<TaskRecord>>>>,
    running: Mutex<HashMap<String, Arc<TaskSignals>>>,
    active_exclusive: Mutex<Option<String>>,
    store: Arc<dyn TaskStore>,
    events: Arc<dyn StatusSink>,
}

impl TaskManager {
    /// Create a manager over the given store and event sink.
    pub fn new(store: Arc<dyn TaskStore>, events: Arc<dyn StatusSink>) -> Self {
        Self {
            registry: Mutex::new(HashMap::new()),
            tasks: Mutex::new(HashMap::new()),
            running: Mutex::new(HashMap::new()),
            active_exclusive: Mutex::new(None),
            store,
            events,
        }
    }

    /// Register a task kind under a unique type name.
    pub fn register_task_type(&self, type_name: impl Into<String>, kind: TaskKind) -> Result<()> {
        let type_name = type_name.into();
        let mut registry = lock_ignoring_poison(&self.registry);
        if registry.contains_key(&type_name) {
            return Err(Error::Conflict(format!(
                "task type '{type_name}' is already registered"
            )));
        }
        registry.insert(type_name, kind);
        Ok(())
    }

    /// Create a task of a registered type and start it immediately.
    ///
    /// Returns the new task id. Fails with [`Error::NotFound`] for an
    /// unknown type and [`Error::Conflict`] when an exclusive task is
    /// already running and the new type is exclusive too.
    pub fn create_and_run_task(
        self: &Arc<Self>,
        type_name: &str,
        args: Vec<Value>,
    ) -> Result<String> {
        let kind = lock_ignoring_poison(&self.registry)
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::not_found("task type", type_name))?;

        let mut record = TaskRecord::new(type_name, type_name, kind.exclusive, kind.is_blocking(), args.clone());
        let id = record.id.clone();

        if kind.exclusive {
            let mut slot = lock_ignoring_poison(&self.active_exclusive);
            if let Some(active) = slot.as_ref() {
                return Err(Error::Conflict(format!(
                    "exclusive task '{active}' is already running"
                )));
            }
            *slot = Some(id.clone());
        }

        record.status = TaskStatus::Running;
        record.started_at = Some(Utc::now());
        self.persist(&record);
        self.publish_status(&record);

        let record = Arc::new(Mutex::new(record));
        let signals = Arc::new(TaskSignals::new());
        lock_ignoring_poison(&self.tasks).insert(id.clone(), record.clone());
        lock_ignoring_poison(&self.running).insert(id.clone(), signals.clone());

        let ctx = TaskContext::new(record, signals, self.store.clone(), self.events.clone());
        let manager = self.clone();
        let task_id = id.clone();
        info!(task = %id, task_type = %type_name, "task started");
        tokio::spawn(async move {
            // Both arms run the body under its own spawn so a panicking
            // runner surfaces as a JoinError instead of unwinding past
            // the lifecycle bookkeeping below.
            let worker = match kind.exec {
                TaskExec::Async(runner) => {
                    tokio::spawn(async move { runner.run(ctx, args).await }).await
                }
                TaskExec::Blocking(runner) => {
                    tokio::task::spawn_blocking(move || runner.run(ctx, args)).await
                }
            };
            let outcome = match worker {
                Ok(result) => result,
                Err(e) => Err(Error::Hardware(format!("task worker failed: {e}"))),
            };
            manager.finish_task(&task_id, outcome);
        });

        Ok(id)
    }

    /// Map a finished runner outcome onto the task record and release
    /// the task's manager-side state.
    fn finish_task(&self, id: &str, outcome: Result<Option<Value>>) {
        let record = match lock_ignoring_poison(&self.tasks).get(id).cloned() {
            Some(record) => record,
            None => return,
        };

        let snapshot = {
            let mut record = lock_ignoring_poison(&record);
            match outcome {
                Ok(result) => {
                    record.status = TaskStatus::Completed;
                    if result.is_some() {
                        record.result = result;
                    }
                    if record.progress.total > 0.0 {
                        record.progress.current = record.progress.total;
                    }
                }
                Err(Error::Cancelled) => {
                    record.status = TaskStatus::Cancelled;
                    record.progress.message = "cancelled by user".into();
                }
                Err(e) => {
                    record.status = TaskStatus::Error;
                    record.error = Some(e.to_string());
                    warn!(task = %id, error = %e, "task failed");
                }
            }
            record.completed_at = Some(Utc::now());
            record.clone()
        };

        self.persist(&snapshot);
        self.publish_status(&snapshot);

        lock_ignoring_poison(&self.running).remove(id);
        let mut slot = lock_ignoring_poison(&self.active_exclusive);
        if slot.as_deref() == Some(id) {
            *slot = None;
        }
        info!(task = %id, status = ?snapshot.status, "task finished");
    }

    /// Signal a running async task to pause at its next checkpoint.
    pub fn pause_task(&self, id: &str) -> Result<()> {
        let record = self.record_handle(id)?;
        let signals = lock_ignoring_poison(&self.running)
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Conflict(format!("task '{id}' is not running")))?;

        let snapshot = {
            let mut record = lock_ignoring_poison(&record);
            if record.status != TaskStatus::Running {
                return Err(Error::Conflict(format!(
                    "cannot pause task '{id}' in status {:?}",
                    record.status
                )));
            }
            if record.is_blocking {
                return Err(Error::Conflict(format!(
                    "task '{id}' runs on the worker pool and cannot be paused"
                )));
            }
            record.status = TaskStatus::Paused;
            record.clone()
        };
        signals.pause();
        self.persist(&snapshot);
        self.publish_status(&snapshot);
        Ok(())
    }

    /// Release a paused task.
    pub fn resume_task(&self, id: &str) -> Result<()> {
        let record = self.record_handle(id)?;
        let signals = lock_ignoring_poison(&self.running)
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Conflict(format!("task '{id}' is not running")))?;

        let snapshot = {
            let mut record = lock_ignoring_poison(&record);
            if record.status != TaskStatus::Paused {
                return Err(Error::Conflict(format!(
                    "cannot resume task '{id}' in status {:?}",
                    record.status
                )));
            }
            record.status = TaskStatus::Running;
            record.clone()
        };
        signals.resume();
        self.persist(&snapshot);
        self.publish_status(&snapshot);
        Ok(())
    }

    /// Request cancellation.
    ///
    /// A running or paused task is signalled and reaches `Cancelled` at
    /// its next checkpoint; a task that never started is cancelled
    /// directly. Cancelling an already-terminal task is a no-op.
    pub fn cancel_task(&self, id: &str) -> Result<()> {
        let record = self.record_handle(id)?;
        if lock_ignoring_poison(&record).status.is_terminal() {
            return Ok(());
        }
        if let Some(signals) = lock_ignoring_poison(&self.running).get(id).cloned() {
            signals.cancel();
            return Ok(());
        }

        // Not attached to a runner (e.g. restored as pending).
        let snapshot = {
            let mut record = lock_ignoring_poison(&record);
            record.status = TaskStatus::Cancelled;
            record.completed_at = Some(Utc::now());
            record.clone()
        };
        self.persist(&snapshot);
        self.publish_status(&snapshot);
        Ok(())
    }

    /// Remove a terminal task from memory and from the store.
    pub fn delete_task(&self, id: &str) -> Result<()> {
        {
            let tasks = lock_ignoring_poison(&self.tasks);
            if let Some(record) = tasks.get(id) {
                if !lock_ignoring_poison(record).status.is_terminal() {
                    return Err(Error::Conflict(format!(
                        "task '{id}' is still active and cannot be deleted"
                    )));
                }
            }
        }
        lock_ignoring_poison(&self.tasks).remove(id);
        self.store.delete(id)
    }

    /// Snapshot of one task record.
    pub fn get_task_info(&self, id: &str) -> Result<TaskRecord> {
        let record = self.record_handle(id)?;
        let snapshot = lock_ignoring_poison(&record).clone();
        Ok(snapshot)
    }

    /// Snapshots of all known tasks, newest first.
    pub fn get_all_tasks_info(&self) -> Vec<TaskRecord> {
        let mut records: Vec<TaskRecord> = lock_ignoring_poison(&self.tasks)
            .values()
            .map(|record| lock_ignoring_poison(record).clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Block until the task reaches a terminal status, or fail with
    /// [`Error::Timeout`].
    pub async fn wait_for_task(&self, id: &str, timeout: Duration) -> Result<TaskRecord> {
        let deadline = Instant::now() + timeout;
        loop {
            let snapshot = self.get_task_info(id)?;
            if snapshot.status.is_terminal() {
                return Ok(snapshot);
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!(
                    "task '{id}' did not finish within {timeout:?}"
                )));
            }
            sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// Reload task records persisted by a previous process run.
    ///
    /// Completed records are garbage-collected from the store. Records
    /// that were `Running` or `Paused` at shutdown become `Interrupted`;
    /// records whose type is no longer registered become `Error`. Returns
    /// the number of records restored into memory.
    pub fn restore_tasks_from_persistence(&self) -> Result<usize> {
        let persisted = self.store.load_all()?;
        let registry = lock_ignoring_poison(&self.registry);
        let mut restored = 0;

        for mut record in persisted {
            if record.status == TaskStatus::Completed {
                if let Err(e) = self.store.delete(&record.id) {
                    warn!(task = %record.id, error = %e, "failed to clean up completed task");
                }
                continue;
            }

            if !registry.contains_key(&record.task_type) {
                record.status = TaskStatus::Error;
                record.error = Some(format!(
                    "task type '{}' is no longer registered",
                    record.task_type
                ));
                record.completed_at = Some(Utc::now());
                self.persist(&record);
            } else if matches!(record.status, TaskStatus::Running | TaskStatus::Paused) {
                record.status = TaskStatus::Interrupted;
                record.error = Some("interrupted by restart".into());
                record.completed_at = Some(Utc::now());
                self.persist(&record);
            }

            info!(task = %record.id, status = ?record.status, "restored task");
            lock_ignoring_poison(&self.tasks).insert(record.id.clone(), Arc::new(Mutex::new(record)));
            restored += 1;
        }
        Ok(restored)
    }

    fn record_handle(&self, id: &str) -> Result<Arc<Mutex<TaskRecord>>> {
        lock_ignoring_poison(&self.tasks)
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("task", id))
    }

    fn persist(&self, record: &TaskRecord) {
        if let Err(e) = self.store.save(record) {
            warn!(task = %record.id, error = %e, "failed to persist task record");
        }
    }

    fn publish_status(&self, record: &TaskRecord) {
        let payload = serde_json::to_value(record).unwrap_or(Value::Null);
        self.events
            .publish(&format!("tasks.{}.status", record.id), payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::tasks::runner::{AsyncTask, BlockingTask};
    use crate::tasks::store::MemoryTaskStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct InstantTask;

    #[async_trait]
    impl AsyncTask for InstantTask {
        async fn run(&self, _ctx: TaskContext, _args: Vec<Value>) -> Result<Option<Value>> {
            Ok(Some(json!(42)))
        }
    }

    struct SlowTask;

    #[async_trait]
    impl AsyncTask for SlowTask {
        async fn run(&self, ctx: TaskContext, _args: Vec<Value>) -> Result<Option<Value>> {
            for i in 0..200 {
                ctx.checkpoint().await?;
                ctx.report_progress(i as f64, 200.0, "stepping");
                sleep(Duration::from_millis(10)).await;
            }
            Ok(None)
        }
    }

    struct FailingTask;

    #[async_trait]
    impl AsyncTask for FailingTask {
        async fn run(&self, _ctx: TaskContext, _args: Vec<Value>) -> Result<Option<Value>> {
            Err(Error::Hardware("stepper driver offline".into()))
        }
    }

    struct BlockingSum;

    impl BlockingTask for BlockingSum {
        fn run(&self, ctx: TaskContext, args: Vec<Value>) -> Result<Option<Value>> {
            ctx.checkpoint_blocking()?;
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(Some(json!(sum)))
        }
    }

    fn manager() -> Arc<TaskManager> {
        Arc::new(TaskManager::new(
            Arc::new(MemoryTaskStore::new()),
            Arc::new(NullSink),
        ))
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let manager = manager();
        manager
            .register_task_type("scan", TaskKind::async_task(Arc::new(InstantTask)))
            .unwrap();
        let again = manager.register_task_type("scan", TaskKind::async_task(Arc::new(InstantTask)));
        assert!(matches!(again, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn unknown_type_is_not_found() {
        let manager = manager();
        let result = manager.create_and_run_task("missing", Vec::new());
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn task_runs_to_completion_with_result() {
        let manager = manager();
        manager
            .register_task_type("answer", TaskKind::async_task(Arc::new(InstantTask)))
            .unwrap();

        let id = manager.create_and_run_task("answer", Vec::new()).unwrap();
        let record = manager
            .wait_for_task(&id, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.result, Some(json!(42)));
        assert!(record.started_at.is_some());
        assert!(record.completed_at.is_some());
    }

    #[tokio::test]
    async fn blocking_task_runs_on_worker_pool() {
        let manager = manager();
        manager
            .register_task_type("sum", TaskKind::blocking_task(Arc::new(BlockingSum)))
            .unwrap();

        let id = manager
            .create_and_run_task("sum", vec![json!(2), json!(40)])
            .unwrap();
        let record = manager
            .wait_for_task(&id, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.result, Some(json!(42)));
        assert!(record.is_blocking);
    }

    #[tokio::test]
    async fn failing_task_records_error_message() {
        let manager = manager();
        manager
            .register_task_type("doomed", TaskKind::async_task(Arc::new(FailingTask)))
            .unwrap();

        let id = manager.create_and_run_task("doomed", Vec::new()).unwrap();
        let record = manager
            .wait_for_task(&id, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(record.status, TaskStatus::Error);
        assert!(record.error.as_deref().unwrap().contains("stepper driver"));
    }

    #[tokio::test]
    async fn second_exclusive_task_is_rejected_until_first_finishes() {
        let manager = manager();
        manager
            .register_task_type("scan", TaskKind::async_task(Arc::new(SlowTask)).exclusive())
            .unwrap();

        let first = manager.create_and_run_task("scan", Vec::new()).unwrap();
        let second = manager.create_and_run_task("scan", Vec::new());
        assert!(matches!(second, Err(Error::Conflict(_))));

        manager.cancel_task(&first).unwrap();
        let record = manager
            .wait_for_task(&first, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(record.status, TaskStatus::Cancelled);

        let third = manager.create_and_run_task("scan", Vec::new());
        assert!(third.is_ok());
        manager.cancel_task(&third.unwrap()).unwrap();
    }

    #[tokio::test]
    async fn pause_resume_and_cancel_transitions() {
        let manager = manager();
        manager
            .register_task_type("scan", TaskKind::async_task(Arc::new(SlowTask)))
            .unwrap();
        let id = manager.create_and_run_task("scan", Vec::new()).unwrap();

        manager.pause_task(&id).unwrap();
        assert_eq!(manager.get_task_info(&id).unwrap().status, TaskStatus::Paused);

        // Pausing a paused task is a state-machine violation.
        assert!(matches!(manager.pause_task(&id), Err(Error::Conflict(_))));

        manager.resume_task(&id).unwrap();
        assert_eq!(
            manager.get_task_info(&id).unwrap().status,
            TaskStatus::Running
        );

        manager.cancel_task(&id).unwrap();
        let record = manager
            .wait_for_task(&id, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(record.status, TaskStatus::Cancelled);

        // Cancel after terminal is a no-op, pause is a conflict.
        manager.cancel_task(&id).unwrap();
        assert!(matches!(manager.pause_task(&id), Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn paused_task_stops_making_progress() {
        use std::sync::atomic::{AtomicU32, Ordering};

        struct CountingTask {
            count: Arc<AtomicU32>,
        }

        #[async_trait]
        impl AsyncTask for CountingTask {
            async fn run(&self, ctx: TaskContext, _args: Vec<Value>) -> Result<Option<Value>> {
                loop {
                    ctx.checkpoint().await?;
                    self.count.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(5)).await;
                }
            }
        }

        let manager = manager();
        let count = Arc::new(AtomicU32::new(0));
        manager
            .register_task_type(
                "count",
                TaskKind::async_task(Arc::new(CountingTask {
                    count: count.clone(),
                })),
            )
            .unwrap();
        let id = manager.create_and_run_task("count", Vec::new()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        manager.pause_task(&id).unwrap();
        // Let any iteration already past its checkpoint drain out.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let at_pause = count.load(Ordering::SeqCst);

        // A paused task must not keep doing work.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_pause);

        manager.resume_task(&id).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(count.load(Ordering::SeqCst) > at_pause);

        manager.cancel_task(&id).unwrap();
        let record = manager
            .wait_for_task(&id, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(record.status, TaskStatus::Cancelled);
    }

    #[tokio::test]
    async fn panicking_task_fails_and_releases_exclusive_slot() {
        struct PanickingTask;

        #[async_trait]
        impl AsyncTask for PanickingTask {
            async fn run(&self, _ctx: TaskContext, _args: Vec<Value>) -> Result<Option<Value>> {
                panic!("driver state corrupted");
            }
        }

        let manager = manager();
        manager
            .register_task_type(
                "fragile",
                TaskKind::async_task(Arc::new(PanickingTask)).exclusive(),
            )
            .unwrap();
        manager
            .register_task_type(
                "steady",
                TaskKind::async_task(Arc::new(InstantTask)).exclusive(),
            )
            .unwrap();

        let id = manager.create_and_run_task("fragile", Vec::new()).unwrap();
        let record = manager
            .wait_for_task(&id, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(record.status, TaskStatus::Error);
        assert!(record
            .error
            .as_deref()
            .unwrap()
            .contains("task worker failed"));

        // The exclusive slot is free again for the next task.
        let next = manager.create_and_run_task("steady", Vec::new()).unwrap();
        let record = manager
            .wait_for_task(&next, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn pausing_a_blocking_task_is_rejected() {
        let manager = manager();
        manager
            .register_task_type(
                "grind",
                TaskKind::blocking_task(Arc::new(BlockingSum)),
            )
            .unwrap();
        let id = manager.create_and_run_task("grind", Vec::new()).unwrap();

        // May have finished already; either conflict shape is acceptable.
        let result = manager.pause_task(&id);
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn wait_for_task_times_out() {
        let manager = manager();
        manager
            .register_task_type("scan", TaskKind::async_task(Arc::new(SlowTask)))
            .unwrap();
        let id = manager.create_and_run_task("scan", Vec::new()).unwrap();

        let result = manager.wait_for_task(&id, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
        manager.cancel_task(&id).unwrap();
    }

    #[tokio::test]
    async fn delete_rejects_active_and_removes_terminal() {
        let manager = manager();
        manager
            .register_task_type("scan", TaskKind::async_task(Arc::new(SlowTask)))
            .unwrap();
        let id = manager.create_and_run_task("scan", Vec::new()).unwrap();

        assert!(matches!(manager.delete_task(&id), Err(Error::Conflict(_))));

        manager.cancel_task(&id).unwrap();
        manager
            .wait_for_task(&id, Duration::from_secs(2))
            .await
            .unwrap();

        manager.delete_task(&id).unwrap();
        assert!(matches!(
            manager.get_task_info(&id),
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn restore_marks_running_tasks_as_interrupted() {
        let mut running = TaskRecord::new("scan", "scan", true, false, Vec::new());
        running.status = TaskStatus::Running;
        let mut done = TaskRecord::new("scan", "scan", true, false, Vec::new());
        done.status = TaskStatus::Completed;
        let mut orphan = TaskRecord::new("gone", "gone", false, false, Vec::new());
        orphan.status = TaskStatus::Paused;

        let store = Arc::new(MemoryTaskStore::with_records([
            running.clone(),
            done.clone(),
            orphan.clone(),
        ]));
        let manager = Arc::new(TaskManager::new(store.clone(), Arc::new(NullSink)));
        manager
            .register_task_type("scan", TaskKind::async_task(Arc::new(SlowTask)))
            .unwrap();

        let restored = manager.restore_tasks_from_persistence().unwrap();
        assert_eq!(restored, 2);

        assert_eq!(
            manager.get_task_info(&running.id).unwrap().status,
            TaskStatus::Interrupted
        );
        assert_eq!(
            manager.get_task_info(&orphan.id).unwrap().status,
            TaskStatus::Error
        );
        // Completed records are cleaned out of the store entirely.
        assert!(matches!(
            manager.get_task_info(&done.id),
            Err(Error::NotFound { .. })
        ));
        assert!(store
            .load_all()
            .unwrap()
            .iter()
            .all(|record| record.id != done.id));
    }

    #[tokio::test]
    async fn progress_is_carried_to_total_on_completion() {
        struct HalfwayTask;

        #[async_trait]
        impl AsyncTask for HalfwayTask {
            async fn run(&self, ctx: TaskContext, _args: Vec<Value>) -> Result<Option<Value>> {
                ctx.report_progress(3.0, 10.0, "halfway");
                ctx.set_result(json!({"frames": 10}));
                Ok(None)
            }
        }

        let manager = manager();
        manager
            .register_task_type("capture", TaskKind::async_task(Arc::new(HalfwayTask)))
            .unwrap();
        let id = manager.create_and_run_task("capture", Vec::new()).unwrap();
        let record = manager
            .wait_for_task(&id, Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.progress.current, record.progress.total);
        assert_eq!(record.result, Some(json!({"frames": 10})));
    }
}
