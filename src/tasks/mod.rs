//! Background task orchestration.
//!
//! Tasks are cooperative, cancellable, pausable units of work with a
//! declared execution contract (single result vs. progress-streaming).
//! The [`TaskManager`] owns their lifecycle, enforces exclusivity and
//! persists state across restarts.

mod manager;
mod record;
mod runner;
mod signals;
mod store;

pub use manager::TaskManager;
pub use record::{TaskProgress, TaskRecord, TaskStatus};
pub use runner::{AsyncTask, BlockingTask, TaskContext, TaskExec, TaskKind};
pub use signals::TaskSignals;
pub use store::{MemoryTaskStore, TaskStore};
