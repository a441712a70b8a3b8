// Continuous four-token controller
//
// Every `interval` ticks the model is asked for the next action; in between,
// the last action is re-applied each tick. Velocity commands are idempotent so
// there is no separate hold state.

use tracing::info;

use super::ControlError;
use crate::llm::{ChatCompletion, LlmError};
use crate::messages::{Action, ChatMessage};
use crate::robot::{DeviceError, DiffDrive, Robot, Step};

const SYSTEM_PROMPT: &str = "You are a robot controller.\n\
Your policy:\n\
- Move FORWARD by default\n\
- Occasionally turn LEFT or RIGHT\n\
Valid actions (one word only):\n\
FORWARD, LEFT, RIGHT, BACK";

const USER_PROMPT: &str = "Continue controlling the robot.\nChoose the next action.";

/// Per-run state owned by the control loop
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub ticks_since_poll: u32,
    pub action: Action,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            ticks_since_poll: 0,
            // Not a valid token: wheels stay put until the first poll
            action: Action::Unrecognized("STOP".to_string()),
        }
    }
}

pub struct DirectionalController<C: ChatCompletion> {
    chat: C,
    model: String,
    interval: u32,
    speed: f64,
    state: ControllerState,
}

impl<C: ChatCompletion> DirectionalController<C> {
    pub fn new(chat: C, model: impl Into<String>, interval: u32, speed: f64) -> Self {
        Self {
            chat,
            model: model.into(),
            interval,
            speed,
            state: ControllerState::default(),
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Ask the model for the next action
    pub fn poll(&mut self) -> Result<Action, LlmError> {
        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(USER_PROMPT)];
        let reply = self.chat.chat(&self.model, &messages)?;
        Ok(Action::from_reply(&reply))
    }

    /// Handle one tick that the simulator has already advanced
    pub fn on_tick<R: Robot>(&mut self, drive: &mut DiffDrive<R>) -> Result<(), ControlError> {
        self.state.ticks_since_poll += 1;

        if self.state.ticks_since_poll >= self.interval {
            self.state.action = self.poll()?;
            info!("LLM action: {}", self.state.action);
            self.state.ticks_since_poll = 0;
        }

        apply_action(&self.state.action, drive.robot_mut(), self.speed)?;
        Ok(())
    }

    /// Run until the simulator stops
    pub fn run<R: Robot>(&mut self, drive: &mut DiffDrive<R>) -> Result<(), ControlError> {
        info!(
            "Directional control started: polling {} every {} ticks",
            self.model, self.interval
        );
        while drive.step() == Step::Continue {
            self.on_tick(drive)?;
        }
        info!("Simulation stopped, last action {}", self.state.action);
        Ok(())
    }
}

/// Map an action to wheel velocities
///
/// `RIGHT` only drives the left wheel; the right wheel keeps its previous
/// velocity. Unrecognized actions leave both wheels unchanged.
pub fn apply_action<R: Robot>(action: &Action, robot: &mut R, speed: f64) -> Result<(), DeviceError> {
    match action {
        Action::Forward => robot.set_wheel_velocities(speed, speed),
        Action::Back => robot.set_wheel_velocities(-speed, -speed),
        Action::Left => robot.set_wheel_velocities(-speed, speed),
        Action::Right => robot.set_left_velocity(speed),
        Action::Unrecognized(_) => Ok(()),
    }
}
