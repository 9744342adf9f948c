//! Step pulse execution.
//!
//! [`StepExecutor::run`] is a synchronous loop intended for
//! `tokio::task::spawn_blocking`: it compares wall-clock time against the
//! precomputed timestamps of a [`MotionProfile`], fires every step whose
//! time has passed, and sleeps adaptively in between. Cancellation is
//! cooperative through a shared stop flag checked once per batch; the loop
//! reports the number of steps actually fired, never the requested count.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::gpio::DigitalOutput;

use super::profile::MotionProfile;

/// Width of one step pulse.
pub const PULSE_WIDTH: Duration = Duration::from_micros(10);

/// How many upcoming timestamps are scanned per iteration.
const BATCH_SIZE: usize = 16;

/// Sleep used when the next step is less than a millisecond away.
const SHORT_WAIT: Duration = Duration::from_micros(50);

/// Drives step and direction pins according to a motion profile.
pub struct StepExecutor<O: DigitalOutput> {
    output: Arc<O>,
    step_pin: u8,
    direction_pin: u8,
    stop: Arc<AtomicBool>,
    executed: Arc<AtomicU32>,
}

impl<O: DigitalOutput> StepExecutor<O> {
    /// Create an executor bound to one motor's pins.
    ///
    /// `executed` is incremented once per fired step, so the owner can
    /// recover the actual count even if the worker thread dies mid-move.
    pub fn new(
        output: Arc<O>,
        step_pin: u8,
        direction_pin: u8,
        stop: Arc<AtomicBool>,
        executed: Arc<AtomicU32>,
    ) -> Self {
        Self {
            output,
            step_pin,
            direction_pin,
            stop,
            executed,
        }
    }

    /// Execute a move of `step_count` signed steps against `profile`.
    ///
    /// Sets the direction output once, then pulses until the profile is
    /// exhausted or the stop flag is observed. Timing slippage is never an
    /// error; only a failing pin write aborts the move, and the executed
    /// count stays accurate in every exit path.
    pub fn run(&self, step_count: i64, profile: &MotionProfile) -> Result<u32> {
        self.output.set(self.direction_pin, step_count > 0)?;

        let times = &profile.step_times;
        if times.is_empty() {
            return Ok(0);
        }

        let start = Instant::now();
        let mut i = 0usize;

        while i < times.len() {
            if self.stop.load(Ordering::Relaxed) {
                debug!(
                    executed = self.executed.load(Ordering::Relaxed),
                    "stop requested, aborting step loop"
                );
                break;
            }

            let now = start.elapsed().as_secs_f64();

            // Scan the lookahead batch for steps already due.
            let mut last_due = None;
            for (j, &t) in times
                .iter()
                .enumerate()
                .skip(i)
                .take(BATCH_SIZE.min(times.len() - i))
            {
                if now >= t {
                    last_due = Some(j);
                }
            }

            if let Some(last) = last_due {
                for _ in i..=last {
                    self.output.set(self.step_pin, true)?;
                    thread::sleep(PULSE_WIDTH);
                    self.output.set(self.step_pin, false)?;
                    self.executed.fetch_add(1, Ordering::Relaxed);
                }
                i = last + 1;
                // Small settle delay after a batch of pulses.
                thread::sleep(PULSE_WIDTH);
            } else {
                let wait = times[i] - now;
                if wait > 0.001 {
                    thread::sleep(Duration::from_secs_f64(wait * 0.9));
                } else {
                    thread::sleep(SHORT_WAIT);
                }
            }
        }

        Ok(self.executed.load(Ordering::Relaxed))
    }
}
