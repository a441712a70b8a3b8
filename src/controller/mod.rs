// Language-model driven controllers
//
// Provides:
// - Continuous directional control polled at a fixed tick interval
// - One-shot path planning on a 1-D line of tiles

pub mod directional;
pub mod planner;

pub use directional::{ControllerState, DirectionalController};
pub use planner::{LinePlanner, PlanReport};

use crate::llm::LlmError;
use crate::robot::DeviceError;

/// Errors that end a control loop
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}
