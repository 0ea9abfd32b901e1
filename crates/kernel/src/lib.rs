//! Simulation kernel: vehicle kinematics, chase camera, frame stepping.
//!
//! # Invariants
//! - `|speed| <= max_speed` after every tick.
//! - Stepping is a pure function of input, previous state and parameters.
//! - Increments are per tick, not per second. Frame-rate independence is
//!   opt-in through [`FrameClock`].

pub mod camera;
pub mod clock;
pub mod params;
pub mod sim;
pub mod vehicle;

pub use camera::{CameraPose, follow};
pub use clock::{FrameClock, StepMode};
pub use params::{ConfigError, FollowParams, SimConfig, VehicleParams};
pub use sim::Simulation;
pub use vehicle::{VehicleState, step};
