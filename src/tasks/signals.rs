//! Cooperative pause and cancellation signals.
//!
//! The manager cannot force-suspend work it does not control: tasks must
//! observe these signals at their own checkpoints, once per natural unit
//! of work.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::error::{Error, Result};

/// Pause and cancellation signals shared between the task manager and one
/// running task.
#[derive(Debug)]
pub struct TaskSignals {
    cancelled: AtomicBool,
    pause: watch::Sender<bool>,
}

impl Default for TaskSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSignals {
    /// Create signals in the not-paused, not-cancelled state.
    pub fn new() -> Self {
        let (pause, _) = watch::channel(false);
        Self {
            cancelled: AtomicBool::new(false),
            pause,
        }
    }

    /// Request cancellation. Also releases the pause gate so a paused
    /// task can observe the cancellation and exit.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.pause.send_replace(false);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Signal the task to pause at its next checkpoint.
    ///
    /// `send_replace` updates the gate even while no checkpoint is
    /// subscribed yet; a plain `send` would be dropped without receivers.
    pub fn pause(&self) {
        self.pause.send_replace(true);
    }

    /// Release a paused task.
    pub fn resume(&self) {
        self.pause.send_replace(false);
    }

    /// Whether the pause signal is currently set.
    pub fn is_paused(&self) -> bool {
        *self.pause.borrow()
    }

    /// Park until the pause gate is open.
    pub async fn wait_if_paused(&self) {
        let mut rx = self.pause.subscribe();
        while *rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Combined pause-then-cancellation checkpoint for async tasks.
    ///
    /// Waits out a pause, then fails with [`Error::Cancelled`] if a
    /// cancellation was requested.
    pub async fn checkpoint(&self) -> Result<()> {
        self.wait_if_paused().await;
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Cancellation-only checkpoint for blocking tasks, which cannot park
    /// on the pause gate.
    pub fn checkpoint_blocking(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}
