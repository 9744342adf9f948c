//! # scanrig-motion
//!
//! Motion and task orchestration core for a motorized 3D-scanning rig.
//!
//! ## Features
//!
//! - **Configuration-driven**: Motors and endstops declared in TOML,
//!   validated before any hardware is touched
//! - **Trapezoidal profiles**: Step schedules pre-computed as absolute
//!   timestamps, executed against the wall clock
//! - **Shortest-path positioning**: Absolute angles on a circular range
//!   take the shorter direction, tracked at all times
//! - **Homing endstops**: Debounced trigger events snap the angle to a
//!   calibrated reference and back the motor off
//! - **Cooperative tasks**: Pausable, cancellable background work with
//!   exclusivity, progress reporting and restart recovery
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scanrig_motion::{load_config, MockGpio, MotorSystem, NullSink, PolarPoint};
//!
//! let config = load_config("rig.toml")?;
//! let gpio = Arc::new(MockGpio::new());
//! let system = MotorSystem::from_config(&config, gpio, Arc::new(NullSink))?;
//!
//! // Move the turntable and rotor together.
//! system.move_to_point(PolarPoint { fi: 90.0, theta: 30.0 }).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod endstop;
pub mod error;
pub mod events;
pub mod gpio;
pub mod motion;
pub mod motor;
pub mod tasks;

pub use config::{load_config, validate_config, EndstopConfig, MotorConfig, SystemConfig};
pub use endstop::{EndstopController, EndstopStatus};
pub use error::{Error, Result};
pub use events::{NullSink, StatusSink};
pub use gpio::{ButtonCallback, DigitalInput, DigitalOutput, MockGpio};
pub use motion::{MotionProfile, StepExecutor, PULSE_WIDTH};
pub use motor::{MotorController, MotorStatus, MotorSystem, PolarPoint, ROTOR, TURNTABLE};
pub use tasks::{
    AsyncTask, BlockingTask, MemoryTaskStore, TaskContext, TaskExec, TaskKind, TaskManager,
    TaskProgress, TaskRecord, TaskSignals, TaskStatus, TaskStore,
};
