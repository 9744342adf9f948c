//! Multi-motor rig facade.
//!
//! Owns the name-to-controller registry (no global state) and coordinates
//! the turntable/rotor pair for point moves.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SystemConfig;
use crate::error::{Error, Result};
use crate::events::StatusSink;
use crate::gpio::DigitalOutput;

use super::controller::MotorController;

/// Canonical name of the turntable motor.
pub const TURNTABLE: &str = "turntable";

/// Canonical name of the rotor (camera arm) motor.
pub const ROTOR: &str = "rotor";

/// A scan position in polar coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPoint {
    /// Turntable angle in degrees.
    pub fi: f64,
    /// Rotor angle in degrees.
    pub theta: f64,
}

/// Registry and coordinator for the rig's motors.
pub struct MotorSystem<O: DigitalOutput> {
    motors: HashMap<String, Arc<MotorController<O>>>,
}

impl<O: DigitalOutput + 'static> MotorSystem<O> {
    /// Build one controller per configured motor, all starting at 0
    /// degrees.
    pub fn from_config(
        config: &SystemConfig,
        output: Arc<O>,
        events: Arc<dyn StatusSink>,
    ) -> Result<Self> {
        let mut motors = HashMap::new();
        for (name, motor_config) in &config.motors {
            let controller = MotorController::new(
                name.clone(),
                motor_config.clone(),
                0.0,
                output.clone(),
                events.clone(),
            )?;
            motors.insert(name.clone(), Arc::new(controller));
        }
        Ok(Self { motors })
    }

    /// Look up a motor controller by name.
    pub fn motor(&self, name: &str) -> Result<Arc<MotorController<O>>> {
        self.motors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found("motor", name))
    }

    /// Iterate over all registered motor names.
    pub fn motor_names(&self) -> impl Iterator<Item = &str> {
        self.motors.keys().map(|k| k.as_str())
    }

    /// Whether a motor is busy; `false` for unknown names.
    pub fn is_motor_busy(&self, name: &str) -> bool {
        self.motors.get(name).map(|m| m.is_busy()).unwrap_or(false)
    }

    /// Move a motor to a position by name.
    pub async fn move_motor_to(&self, name: &str, position: f64) -> Result<()> {
        self.motor(name)?.move_to(position).await
    }

    /// Move the turntable and rotor to a scan point, concurrently.
    ///
    /// If either motor is still busy, waits with adaptive timeouts derived
    /// from the motors' own 180-degree estimates: past the graceful
    /// threshold (`max(2s, 1.5x estimate)`) both motors are asked to stop;
    /// past the total threshold (`max(10s, 3x estimate)`) the wait fails
    /// with [`Error::Timeout`] if either motor is still busy.
    pub async fn move_to_point(&self, point: PolarPoint) -> Result<()> {
        let turntable = self.motor(TURNTABLE)?;
        let rotor = self.motor(ROTOR)?;

        // Worst case for an in-flight move we know nothing about: half a
        // rotation on the slower motor.
        let typical = turntable
            .estimate_movement_time_for_degrees(180.0)
            .max(rotor.estimate_movement_time_for_degrees(180.0));
        let graceful_wait = (typical * 1.5).max(2.0);
        let total_timeout = (typical * 3.0).max(10.0);
        debug!(graceful_wait, total_timeout, "move_to_point timeouts");

        let start = Instant::now();
        while turntable.is_busy() || rotor.is_busy() {
            let elapsed = start.elapsed().as_secs_f64();

            if elapsed > graceful_wait {
                info!(
                    elapsed,
                    "motors still busy past graceful wait, requesting stop"
                );
                turntable.stop();
                rotor.stop();
                tokio::time::sleep(Duration::from_millis(200)).await;

                if elapsed > total_timeout {
                    if turntable.is_busy() || rotor.is_busy() {
                        warn!(elapsed, "motors failed to stop, giving up");
                        return Err(Error::Timeout(format!(
                            "motors failed to stop after {total_timeout:.1}s \
                             (turntable busy: {}, rotor busy: {})",
                            turntable.is_busy(),
                            rotor.is_busy()
                        )));
                    }
                    break;
                }
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let (turntable_result, rotor_result) =
            tokio::join!(turntable.move_to(point.fi), rotor.move_to(point.theta));
        turntable_result?;
        rotor_result?;

        debug!(fi = point.fi, theta = point.theta, "moved to point");
        Ok(())
    }
}
