//! Motor controller.
//!
//! Owns one motor's configuration and angular state, normalizes target
//! angles, computes shortest-path movement and delegates pulse timing to
//! the step executor on the blocking worker pool. The angle is only ever
//! updated from steps the executor actually fired, and the busy flag is
//! cleared on every exit path.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{validate_motor, MotorConfig};
use crate::error::{Error, Result};
use crate::events::StatusSink;
use crate::gpio::DigitalOutput;
use crate::motion::{MotionProfile, StepExecutor};

/// Serializable status snapshot of one motor.
#[derive(Debug, Clone, Serialize)]
pub struct MotorStatus {
    /// Motor name.
    pub name: String,
    /// Current angle in degrees.
    pub angle: f64,
    /// Whether a move is in progress.
    pub busy: bool,
    /// Target of the in-progress move, if any.
    pub target_angle: Option<f64>,
    /// Current settings.
    pub settings: MotorConfig,
}

#[derive(Debug)]
struct AngularState {
    angle: f64,
    target: Option<f64>,
}

/// Controller for one stepper motor.
///
/// Shareable across tasks behind an `Arc`; `stop()` may be called from any
/// context while a move is awaited elsewhere.
pub struct MotorController<O: DigitalOutput> {
    name: String,
    output: Arc<O>,
    events: Arc<dyn StatusSink>,
    settings: Mutex<MotorConfig>,
    state: Mutex<AngularState>,
    moving: AtomicBool,
    stop_requested: Arc<AtomicBool>,
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Fold an angular delta onto the shortest rotational path.
///
/// The 180-degree tie resolves to the negative direction, always.
fn shortest_delta(delta: f64) -> f64 {
    if delta >= 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

impl<O: DigitalOutput + 'static> MotorController<O> {
    /// Create a controller, claim its output pins and start at
    /// `initial_angle` degrees.
    pub fn new(
        name: impl Into<String>,
        settings: MotorConfig,
        initial_angle: f64,
        output: Arc<O>,
        events: Arc<dyn StatusSink>,
    ) -> Result<Self> {
        let name = name.into();
        validate_motor(&name, &settings)?;
        output.initialize_outputs(&settings.output_pins())?;
        debug!(motor = %name, "motor controller initialized");
        Ok(Self {
            name,
            output,
            events,
            settings: Mutex::new(settings),
            state: Mutex::new(AngularState {
                angle: initial_angle,
                target: None,
            }),
            moving: AtomicBool::new(false),
            stop_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The motor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current angle in degrees.
    pub fn angle(&self) -> f64 {
        lock_ignoring_poison(&self.state).angle
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> MotorConfig {
        lock_ignoring_poison(&self.settings).clone()
    }

    /// True from the moment a move is admitted until its cleanup runs.
    pub fn is_busy(&self) -> bool {
        self.moving.load(Ordering::Acquire)
    }

    /// Claim the mover role atomically. Exactly one caller wins even when
    /// two `move_*` calls race from different worker threads; the claim is
    /// released by the movement cleanup.
    fn claim_move(&self) -> Result<()> {
        if self
            .moving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::busy(format!("motor '{}'", self.name)));
        }
        Ok(())
    }

    /// Request the current movement to stop. Non-blocking; a no-op on an
    /// idle motor.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        info!(motor = %self.name, "stop requested");
    }

    /// Status snapshot for external callers.
    pub fn get_status(&self) -> MotorStatus {
        let state = lock_ignoring_poison(&self.state);
        MotorStatus {
            name: self.name.clone(),
            angle: state.angle,
            busy: self.is_busy(),
            target_angle: state.target,
            settings: lock_ignoring_poison(&self.settings).clone(),
        }
    }

    /// Apply new settings: validate, re-claim output pins and broadcast
    /// the change.
    pub fn apply_settings(&self, new_settings: MotorConfig) -> Result<()> {
        validate_motor(&self.name, &new_settings)?;
        self.output.initialize_outputs(&new_settings.output_pins())?;
        *lock_ignoring_poison(&self.settings) = new_settings;
        info!(motor = %self.name, "settings updated");
        self.events.publish(
            &format!("motors.{}.settings", self.name),
            json!({ "motor": self.name }),
        );
        Ok(())
    }

    /// Normalize a target angle against the configured limits.
    ///
    /// On a full-range motor the result is `desired mod 360`; otherwise
    /// the value is clamped to `[min_angle, max_angle]` with a warning.
    pub fn normalize_target_angle(&self, desired: f64) -> f64 {
        let settings = lock_ignoring_poison(&self.settings);
        if settings.full_range() {
            return desired.rem_euclid(360.0);
        }

        if desired < settings.min_angle {
            warn!(
                motor = %self.name,
                desired,
                min = settings.min_angle,
                "desired angle below minimum limit, clamping"
            );
            settings.min_angle
        } else if desired > settings.max_angle {
            warn!(
                motor = %self.name,
                desired,
                max = settings.max_angle,
                "desired angle above maximum limit, clamping"
            );
            settings.max_angle
        } else {
            desired
        }
    }

    /// Estimate the wall-clock duration of a `steps`-step move. Pure.
    pub fn estimate_movement_time(&self, steps: i64) -> f64 {
        let settings = lock_ignoring_poison(&self.settings);
        MotionProfile::estimate_duration(
            u32::try_from(steps.unsigned_abs()).unwrap_or(u32::MAX),
            settings.max_speed,
            settings.acceleration,
        )
    }

    /// Estimate the duration of a move spanning `degrees`. Pure.
    pub fn estimate_movement_time_for_degrees(&self, degrees: f64) -> f64 {
        let steps = {
            let settings = lock_ignoring_poison(&self.settings);
            (degrees.abs() * settings.steps_per_rotation as f64 / 360.0) as i64
        };
        self.estimate_movement_time(steps)
    }

    /// Estimate the duration of a move to an absolute position, taking
    /// the shortest rotational path. Pure.
    pub fn estimate_move_to_time(&self, target_degrees: f64) -> f64 {
        let target = self.normalize_target_angle(target_degrees.rem_euclid(360.0));
        let delta = shortest_delta(target - self.angle());
        self.estimate_movement_time_for_degrees(delta.abs())
    }

    /// Move the motor to an absolute position in degrees.
    ///
    /// Fails with [`Error::Busy`] if a move is already in progress.
    pub async fn move_to(&self, degrees: f64) -> Result<()> {
        self.claim_move()?;
        self.stop_requested.store(false, Ordering::Release);

        let target = self.normalize_target_angle(degrees.rem_euclid(360.0));
        self.move_to_target_angle(target).await
    }

    /// Move the motor by a relative number of degrees.
    ///
    /// Fails with [`Error::Busy`] if a move is already in progress.
    pub async fn move_degrees(&self, degrees: f64) -> Result<()> {
        self.claim_move()?;
        self.stop_requested.store(false, Ordering::Release);

        let target = self.normalize_target_angle(self.angle() + degrees);
        self.move_to_target_angle(target).await
    }

    /// Force the angle to a known reference and drop any pending target.
    ///
    /// Used by the endstop controller on trip: the switch position is
    /// ground truth, whatever the step bookkeeping says.
    pub(crate) fn override_angle(&self, angle: f64) {
        let mut state = lock_ignoring_poison(&self.state);
        state.angle = angle;
        state.target = None;
        debug!(motor = %self.name, angle, "angle override");
    }

    async fn move_to_target_angle(&self, target_angle: f64) -> Result<()> {
        let (steps_per_rotation, direction, full_range) = {
            let settings = lock_ignoring_poison(&self.settings);
            (
                settings.steps_per_rotation,
                settings.direction,
                settings.full_range(),
            )
        };

        let mut degrees_to_move = {
            let mut state = lock_ignoring_poison(&self.state);
            state.target = Some(target_angle);
            target_angle - state.angle
        };

        if full_range {
            degrees_to_move = shortest_delta(degrees_to_move);
        }

        let step_count =
            (degrees_to_move * steps_per_rotation as f64 / 360.0) as i64 * direction as i64;
        debug!(
            motor = %self.name,
            target = target_angle,
            steps = step_count,
            "starting movement"
        );
        self.execute_movement(step_count).await
    }

    /// Run a movement on the blocking worker pool. The caller holds the
    /// move claim.
    ///
    /// Regardless of how the worker exits (completion, stop, pin fault,
    /// panic), the move claim is released, the pending target is
    /// cleared, the angle is advanced by the steps actually fired and a
    /// busy-change is published. Errors then propagate to the caller.
    async fn execute_movement(&self, step_count: i64) -> Result<()> {
        let requested = u32::try_from(step_count.unsigned_abs()).unwrap_or(u32::MAX);
        self.publish_busy_change();

        let (settings, profile) = {
            let settings = lock_ignoring_poison(&self.settings);
            let profile = MotionProfile::plan(
                requested,
                settings.max_speed,
                settings.acceleration,
                MotionProfile::DEFAULT_MIN_INTERVAL,
            );
            (settings.clone(), profile)
        };

        let executed_counter = Arc::new(AtomicU32::new(0));
        let executor = StepExecutor::new(
            self.output.clone(),
            settings.step_pin,
            settings.direction_pin,
            self.stop_requested.clone(),
            executed_counter.clone(),
        );

        let worker = tokio::task::spawn_blocking(move || executor.run(step_count, &profile)).await;

        // Guaranteed cleanup, on every exit path.
        let executed = executed_counter.load(Ordering::Acquire);
        let executed_degrees = executed as f64 / settings.steps_per_rotation as f64
            * 360.0
            * if step_count >= 0 { 1.0 } else { -1.0 }
            * settings.direction as f64;
        {
            let mut state = lock_ignoring_poison(&self.state);
            state.angle = (state.angle + executed_degrees).rem_euclid(360.0);
            state.target = None;
        }
        self.moving.store(false, Ordering::Release);
        self.publish_busy_change();

        match worker {
            Ok(Ok(_)) => {
                debug!(motor = %self.name, executed_degrees, "movement finished");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(join_error) => Err(Error::Hardware(format!(
                "step worker for motor '{}' failed: {join_error}",
                self.name
            ))),
        }
    }

    fn publish_busy_change(&self) {
        self.events.publish(
            &format!("motors.{}.busy", self.name),
            json!({ "motor": self.name, "busy": self.is_busy() }),
        );
    }
}
