//! Endstop configuration.

use serde::{Deserialize, Serialize};

/// Configuration for one endstop switch bound to a motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndstopConfig {
    /// GPIO pin the switch is wired to.
    pub pin: u8,

    /// Use the internal pull-up resistor (switch connects pin to ground).
    #[serde(default = "default_pull_up")]
    pub pull_up: bool,

    /// Debounce time in seconds.
    #[serde(default = "default_bounce_time")]
    pub bounce_time: f64,

    /// Name of the motor this endstop protects.
    pub motor_name: String,

    /// The known reference angle the motor is snapped to on trip.
    pub angular_position: f64,
}

fn default_pull_up() -> bool {
    true
}

fn default_bounce_time() -> f64 {
    0.05
}
