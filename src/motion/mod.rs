//! Motion planning and step pulse generation.

mod executor;
mod profile;

pub use executor::{StepExecutor, PULSE_WIDTH};
pub use profile::MotionProfile;
