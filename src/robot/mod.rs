// Robot module for the differential-drive base
//
// Provides:
// - Device boundary trait (motors, encoders, simulation step)
// - Turn and tile kinematics
// - Bounded motion primitives on top of the device boundary
// - A kinematic simulator implementing the device boundary

pub mod device;
mod driver;
pub mod kinematics;
pub mod sim;

pub use device::{DeviceError, Robot, Step, WheelPositions};
pub use driver::{DiffDrive, MotionOutcome, TurnDirection};
pub use kinematics::{TurnParams, turn_params};
pub use sim::SimulatedRobot;
