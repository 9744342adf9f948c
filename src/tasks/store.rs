//! Persistent task store capability.
//!
//! The core does not own a file format; the surrounding application
//! provides an implementation (JSON files, a database, ...). Failures are
//! surfaced as [`crate::Error::Hardware`] and the manager treats them as
//! non-fatal: a task never dies because its state could not be written.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::tasks::record::TaskRecord;

/// Persistence capability used for restart recovery.
pub trait TaskStore: Send + Sync {
    /// Persist (create or overwrite) one task record.
    fn save(&self, record: &TaskRecord) -> Result<()>;

    /// Load every persisted record.
    fn load_all(&self) -> Result<Vec<TaskRecord>>;

    /// Remove the persisted record for `task_id`, if any.
    fn delete(&self, task_id: &str) -> Result<()>;
}

/// In-memory store. The default for tests and for rigs that do not need
/// task recovery.
#[derive(Default)]
pub struct MemoryTaskStore {
    records: Mutex<HashMap<String, TaskRecord>>,
}

impl MemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, e.g. to simulate state left over from a
    /// previous process run.
    pub fn with_records(records: impl IntoIterator<Item = TaskRecord>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.lock().unwrap_or_else(|e| e.into_inner());
            for record in records {
                map.insert(record.id.clone(), record);
            }
        }
        store
    }
}

impl TaskStore for MemoryTaskStore {
    fn save(&self, record: &TaskRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<TaskRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect())
    }

    fn delete(&self, task_id: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(task_id);
        Ok(())
    }
}
