//! Configuration types and TOML loading.
//!
//! Motors and endstops are declared in a single TOML file and validated
//! up front; invalid settings fail fast at load time rather than at the
//! first move.

mod endstop;
mod motor;
mod system;
mod validation;

pub use endstop::EndstopConfig;
pub use motor::MotorConfig;
pub use system::{load_config, SystemConfig};
pub use validation::{validate_config, validate_endstop, validate_motor};
