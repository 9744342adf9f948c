//! Motor configuration.

use serde::{Deserialize, Serialize};

/// Complete configuration for one stepper motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorConfig {
    /// GPIO pin driving the direction input of the stepper driver.
    pub direction_pin: u8,

    /// GPIO pin driving the step input of the stepper driver.
    pub step_pin: u8,

    /// GPIO pin driving the enable input of the stepper driver.
    pub enable_pin: u8,

    /// Acceleration in steps per second squared.
    pub acceleration: f64,

    /// Maximum speed in steps per second.
    pub max_speed: f64,

    /// Steps per full output rotation (including microstepping and gearing).
    pub steps_per_rotation: u32,

    /// Lower angular limit in degrees.
    #[serde(default = "default_min_angle")]
    pub min_angle: f64,

    /// Upper angular limit in degrees.
    #[serde(default = "default_max_angle")]
    pub max_angle: f64,

    /// Wiring direction multiplier, +1 or -1.
    #[serde(default = "default_direction")]
    pub direction: i8,
}

fn default_min_angle() -> f64 {
    0.0
}

fn default_max_angle() -> f64 {
    360.0
}

fn default_direction() -> i8 {
    1
}

impl MotorConfig {
    /// Whether the motor spans the full 0-360 range (wrap-around allowed).
    #[inline]
    pub fn full_range(&self) -> bool {
        self.min_angle == 0.0 && self.max_angle == 360.0
    }

    /// Steps per degree of output rotation.
    #[inline]
    pub fn steps_per_degree(&self) -> f64 {
        self.steps_per_rotation as f64 / 360.0
    }

    /// The output pins this motor claims, in a fixed order.
    pub fn output_pins(&self) -> [u8; 3] {
        [self.direction_pin, self.step_pin, self.enable_pin]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MotorConfig {
        MotorConfig {
            direction_pin: 5,
            step_pin: 6,
            enable_pin: 13,
            acceleration: 20_000.0,
            max_speed: 7_500.0,
            steps_per_rotation: 3200,
            min_angle: 0.0,
            max_angle: 360.0,
            direction: 1,
        }
    }

    #[test]
    fn full_range_detection() {
        let mut c = config();
        assert!(c.full_range());
        c.max_angle = 180.0;
        assert!(!c.full_range());
    }

    #[test]
    fn steps_per_degree() {
        let c = config();
        assert!((c.steps_per_degree() - 3200.0 / 360.0).abs() < 1e-9);
    }

    #[test]
    fn defaults_from_toml() {
        let c: MotorConfig = toml::from_str(
            r#"
direction_pin = 5
step_pin = 6
enable_pin = 13
acceleration = 1000.0
max_speed = 800.0
steps_per_rotation = 3200
"#,
        )
        .unwrap();
        assert_eq!(c.min_angle, 0.0);
        assert_eq!(c.max_angle, 360.0);
        assert_eq!(c.direction, 1);
    }
}
