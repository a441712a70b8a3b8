// One-shot path planning on a 1-D line of tiles
//
// The model is asked once for the shortest F/B sequence from the current
// position to the goal. The path is executed tile by tile with no retry or
// replanning. The line position is updated before each move starts and is
// not corrected if the motion falls short.

use std::fmt;
use std::io::Write;

use tracing::info;

use super::ControlError;
use crate::config::TILE_SETTLE_TICKS;
use crate::llm::{ChatCompletion, LlmError, parse_path};
use crate::messages::{ChatMessage, Move};
use crate::robot::{DiffDrive, Robot, Step};

const SYSTEM_PROMPT: &str = "You are a path planner for a robot on a one-dimensional line of tiles.\n\
The robot position and the goal are integers.\n\
Moves:\n\
- \"F\" moves forward one tile (+1)\n\
- \"B\" moves back one tile (-1)\n\
Return the shortest sequence of moves from the robot position to the goal.\n\
Respond with JSON only, in the form {\"path\": [\"F\", \"F\"]}.\n\
If the robot is already at the goal, respond {\"path\": []}.";

/// Outcome of executing a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanReport {
    Success { position: i32 },
    Failed { position: i32, goal: i32 },
}

impl PlanReport {
    /// Tiles between the final position and the goal
    pub fn tiles_off(&self) -> u32 {
        match *self {
            PlanReport::Success { .. } => 0,
            PlanReport::Failed { position, goal } => position.abs_diff(goal),
        }
    }
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PlanReport::Success { position } => {
                write!(f, "SUCCESS: reached goal at position {}", position)
            }
            PlanReport::Failed { position, goal } => write!(
                f,
                "FAILED by {} tiles: ended at position {}, goal {}",
                self.tiles_off(),
                position,
                goal
            ),
        }
    }
}

pub struct LinePlanner<C: ChatCompletion> {
    chat: C,
    model: String,
    speed: f64,
    position: i32,
    goal: i32,
}

impl<C: ChatCompletion> LinePlanner<C> {
    pub fn new(chat: C, model: impl Into<String>, speed: f64, position: i32, goal: i32) -> Self {
        Self {
            chat,
            model: model.into(),
            speed,
            position,
            goal,
        }
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn goal(&self) -> i32 {
        self.goal
    }

    /// Ask the model for a path from the current position to the goal
    pub fn request_path(&mut self) -> Result<Vec<Move>, LlmError> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Robot position: {}. Goal position: {}. Plan the path.",
                self.position, self.goal
            )),
        ];
        info!(
            "Requesting path from {} to {} via {}",
            self.position, self.goal, self.model
        );
        let reply = self.chat.chat(&self.model, &messages)?;
        Ok(parse_path(&reply))
    }

    /// Drive the path tile by tile and report against the goal
    pub fn execute<R: Robot>(
        &mut self,
        drive: &mut DiffDrive<R>,
        path: &[Move],
        out: &mut impl Write,
    ) -> Result<PlanReport, ControlError> {
        if path.is_empty() {
            writeln!(out, "Empty path: robot already at goal")?;
        } else {
            let tokens: Vec<&str> = path.iter().map(|m| m.token()).collect();
            writeln!(out, "Planned path: {}", tokens.join(" "))?;
        }

        for (i, &mv) in path.iter().enumerate() {
            let from = self.position;
            self.position += mv.delta();
            writeln!(
                out,
                "Move {}/{}: {} ({} -> {})",
                i + 1,
                path.len(),
                mv.token(),
                from,
                self.position
            )?;

            let outcome = drive.translate(mv, self.speed)?;
            if outcome.is_interrupted() || drive.settle(TILE_SETTLE_TICKS) == Step::Stop {
                info!("Simulation stopped during path execution");
                break;
            }
        }

        let report = if self.position == self.goal {
            PlanReport::Success {
                position: self.position,
            }
        } else {
            PlanReport::Failed {
                position: self.position,
                goal: self.goal,
            }
        };
        writeln!(out, "{}", report)?;
        Ok(report)
    }

    /// Plan once, execute, and report
    pub fn run<R: Robot>(
        &mut self,
        drive: &mut DiffDrive<R>,
        out: &mut impl Write,
    ) -> Result<PlanReport, ControlError> {
        let path = self.request_path()?;
        self.execute(drive, &path, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TILE_SIZE;
    use crate::llm::client::ScriptedChat;
    use crate::robot::SimulatedRobot;
    use Move::{Back as B, Forward as F};

    fn drive() -> DiffDrive<SimulatedRobot> {
        DiffDrive::new(SimulatedRobot::new()).unwrap()
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_empty_path_keeps_position() {
        let mut planner = LinePlanner::new(ScriptedChat::new(Vec::<String>::new()), "m", 6.0, 3, 3);
        let mut drive = drive();
        let mut out = Vec::new();
        let report = planner.execute(&mut drive, &[], &mut out).unwrap();

        assert_eq!(planner.position(), 3);
        assert_eq!(report, PlanReport::Success { position: 3 });
        assert_eq!(drive.robot().ticks(), 0);
        assert!(output(out).contains("already at goal"));
    }

    #[test]
    fn test_plans_forward_to_goal() {
        let chat = ScriptedChat::new([r#"{"path": ["F", "F"]}"#]);
        let mut planner = LinePlanner::new(chat, "m", 6.0, 0, 2);
        let mut drive = drive();
        let mut out = Vec::new();
        let report = planner.run(&mut drive, &mut out).unwrap();

        assert_eq!(report, PlanReport::Success { position: 2 });
        let text = output(out);
        assert!(text.contains("(0 -> 1)"));
        assert!(text.contains("(1 -> 2)"));
        assert!(text.contains("SUCCESS"));

        let x = drive.robot().pose().x;
        assert!((x - 2.0 * TILE_SIZE).abs() < 0.03, "x = {}", x);

        let user = &planner.chat.requests[0][1].content;
        assert!(user.contains("Robot position: 0. Goal position: 2."));
    }

    #[test]
    fn test_malformed_reply_recovers_back_path() {
        let chat = ScriptedChat::new([r#"Sure, path: ["B", "B"] (moving back twice)"#]);
        let mut planner = LinePlanner::new(chat, "m", 6.0, 0, -2);
        let mut drive = drive();
        let mut out = Vec::new();

        let path = planner.request_path().unwrap();
        assert_eq!(path, vec![B, B]);
        let report = planner.execute(&mut drive, &path, &mut out).unwrap();
        assert_eq!(report, PlanReport::Success { position: -2 });
        assert_eq!(planner.position(), -2);
    }

    #[test]
    fn test_wrong_path_reports_failure() {
        let chat = ScriptedChat::new([r#"{"path": ["F"]}"#]);
        let mut planner = LinePlanner::new(chat, "m", 6.0, 0, -2);
        let mut drive = drive();
        let mut out = Vec::new();
        let report = planner.run(&mut drive, &mut out).unwrap();

        assert_eq!(report, PlanReport::Failed { position: 1, goal: -2 });
        assert_eq!(report.tiles_off(), 3);
        assert!(output(out).contains("FAILED by 3 tiles"));
    }

    #[test]
    fn test_position_updated_before_interrupted_move() {
        let mut planner = LinePlanner::new(ScriptedChat::new(Vec::<String>::new()), "m", 6.0, 0, 2);
        let mut drive = DiffDrive::new(SimulatedRobot::new().with_max_ticks(10)).unwrap();
        let mut out = Vec::new();
        let report = planner.execute(&mut drive, &[F, F], &mut out).unwrap();

        // First move counted even though the tile was never covered
        assert_eq!(planner.position(), 1);
        assert_eq!(report.tiles_off(), 1);
    }
}
