//! Configuration validation.
//!
//! All checks fail fast with [`Error::Config`] so a bad file never reaches
//! the hardware.

use std::collections::HashMap;

use crate::error::{Error, Result};

use super::endstop::EndstopConfig;
use super::motor::MotorConfig;
use super::system::SystemConfig;

/// Validate a single motor configuration.
pub fn validate_motor(name: &str, motor: &MotorConfig) -> Result<()> {
    if motor.acceleration <= 0.0 {
        return Err(Error::Config(format!(
            "motor '{name}': acceleration must be > 0, got {}",
            motor.acceleration
        )));
    }
    if motor.max_speed <= 0.0 {
        return Err(Error::Config(format!(
            "motor '{name}': max_speed must be > 0, got {}",
            motor.max_speed
        )));
    }
    if motor.steps_per_rotation == 0 {
        return Err(Error::Config(format!(
            "motor '{name}': steps_per_rotation must be > 0"
        )));
    }
    if !(0.0..=360.0).contains(&motor.min_angle)
        || !(0.0..=360.0).contains(&motor.max_angle)
        || motor.min_angle >= motor.max_angle
    {
        return Err(Error::Config(format!(
            "motor '{name}': angle limits [{}, {}] must satisfy 0 <= min < max <= 360",
            motor.min_angle, motor.max_angle
        )));
    }
    if motor.direction != 1 && motor.direction != -1 {
        return Err(Error::Config(format!(
            "motor '{name}': direction must be +1 or -1, got {}",
            motor.direction
        )));
    }
    Ok(())
}

/// Validate a single endstop configuration against the motors it may bind to.
pub fn validate_endstop(name: &str, endstop: &EndstopConfig, config: &SystemConfig) -> Result<()> {
    if endstop.bounce_time < 0.0 {
        return Err(Error::Config(format!(
            "endstop '{name}': bounce_time must be >= 0, got {}",
            endstop.bounce_time
        )));
    }
    if config.motor(&endstop.motor_name).is_none() {
        return Err(Error::Config(format!(
            "endstop '{name}' references unknown motor '{}'",
            endstop.motor_name
        )));
    }
    Ok(())
}

/// Validate a complete system configuration.
///
/// Besides per-entry checks this enforces the pin role policy: a pin is
/// claimed as exactly one of output or button input, and never twice.
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    let mut claims: HashMap<u8, String> = HashMap::new();

    for (name, motor) in &config.motors {
        validate_motor(name, motor)?;
        for pin in motor.output_pins() {
            if let Some(owner) = claims.insert(pin, format!("motor '{name}'")) {
                return Err(Error::Config(format!(
                    "pin {pin} claimed by motor '{name}' is already claimed by {owner}"
                )));
            }
        }
    }

    for (name, endstop) in &config.endstops {
        validate_endstop(name, endstop, config)?;
        if let Some(owner) = claims.insert(endstop.pin, format!("endstop '{name}'")) {
            return Err(Error::Config(format!(
                "pin {} claimed by endstop '{name}' is already claimed by {owner}",
                endstop.pin
            )));
        }
    }

    Ok(())
}
