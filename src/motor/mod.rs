//! Motor control: single-motor controller and multi-motor rig facade.

mod controller;
mod system;

pub use controller::{MotorController, MotorStatus};
pub use system::{MotorSystem, PolarPoint, ROTOR, TURNTABLE};
