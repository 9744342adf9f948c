//! System-level configuration: named motors and endstops.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::endstop::EndstopConfig;
use super::motor::MotorConfig;
use super::validation::validate_config;

/// Complete rig configuration parsed from TOML.
///
/// ```toml
/// [motors.turntable]
/// direction_pin = 5
/// step_pin = 6
/// enable_pin = 13
/// acceleration = 20000.0
/// max_speed = 7500.0
/// steps_per_rotation = 3200
///
/// [endstops.rotor_home]
/// pin = 17
/// motor_name = "rotor"
/// angular_position = 0.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Motor configurations keyed by motor name.
    #[serde(default)]
    pub motors: BTreeMap<String, MotorConfig>,

    /// Endstop configurations keyed by endstop name.
    #[serde(default)]
    pub endstops: BTreeMap<String, EndstopConfig>,
}

impl SystemConfig {
    /// Get a motor configuration by name.
    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.motors.get(name)
    }

    /// Get an endstop configuration by name.
    pub fn endstop(&self, name: &str) -> Option<&EndstopConfig> {
        self.endstops.get(name)
    }

    /// Iterate over all configured motor names.
    pub fn motor_names(&self) -> impl Iterator<Item = &str> {
        self.motors.keys().map(|k| k.as_str())
    }
}

/// Load and validate a [`SystemConfig`] from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<SystemConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read '{}': {e}", path.display())))?;
    let config: SystemConfig =
        toml::from_str(&raw).map_err(|e| Error::Config(format!("invalid TOML: {e}")))?;
    validate_config(&config)?;
    Ok(config)
}
