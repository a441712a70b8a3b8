// High-level driver for a differential-drive base
//
// Wraps a device-level robot with the bounded motion primitives: spin both
// wheels at a fixed speed until the encoders report a target rotation, then
// stop. Ticks are discrete, so the realized rotation overshoots the target
// by at most one tick of wheel travel.

use tracing::{debug, info, warn};

use super::device::{DeviceError, Robot, Step};
use super::kinematics::{tile_rotation, turn_params};
use crate::config::TILE_SIZE;
use crate::messages::Move;

/// Rotation sense of an in-place turn, seen from above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Clockwise,        // left wheel forward, right wheel backward
    CounterClockwise, // left wheel backward, right wheel forward
}

/// How a bounded motion ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionOutcome {
    /// Average encoder delta crossed the target after `ticks` steps
    Reached { target: f64, realized: f64, ticks: u32 },
    /// The simulator stopped before the target was crossed
    Interrupted { target: f64, realized: f64, ticks: u32 },
}

impl MotionOutcome {
    /// Average wheel rotation (radians) measured after stopping
    pub fn realized(&self) -> f64 {
        match *self {
            MotionOutcome::Reached { realized, .. } | MotionOutcome::Interrupted { realized, .. } => {
                realized
            }
        }
    }

    pub fn ticks(&self) -> u32 {
        match *self {
            MotionOutcome::Reached { ticks, .. } | MotionOutcome::Interrupted { ticks, .. } => ticks,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, MotionOutcome::Interrupted { .. })
    }
}

/// Differential-drive driver over any [`Robot`]
pub struct DiffDrive<R: Robot> {
    robot: R,
}

impl<R: Robot> DiffDrive<R> {
    /// Take ownership of the robot with both wheels stopped
    pub fn new(mut robot: R) -> Result<Self, DeviceError> {
        info!("Differential drive ready, timestep {} ms", robot.timestep_ms());
        robot.set_wheel_velocities(0.0, 0.0)?;
        Ok(Self { robot })
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }

    /// Advance one tick
    pub fn step(&mut self) -> Step {
        self.robot.step()
    }

    /// Let `ticks` idle steps elapse so residual motion settles
    pub fn settle(&mut self, ticks: u32) -> Step {
        for _ in 0..ticks {
            if self.robot.step() == Step::Stop {
                return Step::Stop;
            }
        }
        Step::Continue
    }

    pub fn set_wheel_velocities(&mut self, left: f64, right: f64) -> Result<(), DeviceError> {
        self.robot.set_wheel_velocities(left, right)
    }

    /// Stop both wheels
    pub fn stop(&mut self) -> Result<(), DeviceError> {
        debug!("Stopping both wheels");
        self.robot.set_wheel_velocities(0.0, 0.0)
    }

    /// Turn in place until the wheels have rotated `target_rotation` radians
    pub fn turn(
        &mut self,
        direction: TurnDirection,
        target_rotation: f64,
        speed: f64,
    ) -> Result<MotionOutcome, DeviceError> {
        let (left, right) = match direction {
            TurnDirection::Clockwise => (speed, -speed),
            TurnDirection::CounterClockwise => (-speed, speed),
        };
        self.drive_until(left, right, target_rotation)
    }

    /// Turn in place by `degrees` using the given axle length
    pub fn turn_degrees(
        &mut self,
        direction: TurnDirection,
        degrees: f64,
        axle_length: f64,
        speed: f64,
    ) -> Result<MotionOutcome, DeviceError> {
        let params = turn_params(axle_length, degrees);
        self.turn(direction, params.wheel_rotation, speed)
    }

    /// Translate one tile forward or backward
    pub fn translate(&mut self, mv: Move, speed: f64) -> Result<MotionOutcome, DeviceError> {
        let velocity = speed * mv.delta() as f64;
        self.drive_until(velocity, velocity, tile_rotation(TILE_SIZE))
    }

    /// Drive the wheels until the average encoder delta reaches `target`
    fn drive_until(&mut self, left: f64, right: f64, target: f64) -> Result<MotionOutcome, DeviceError> {
        let start = self.robot.wheel_positions()?;
        debug!(
            "Driving left={:.2} right={:.2} until {:.4} rad",
            left, right, target
        );
        self.robot.set_wheel_velocities(left, right)?;

        let mut ticks = 0;
        let reached = loop {
            if self.robot.step() == Step::Stop {
                break false;
            }
            ticks += 1;
            let avg = self.robot.wheel_positions()?.average_delta(&start);
            if avg >= target {
                break true;
            }
        };

        self.stop()?;
        let realized = self.robot.wheel_positions()?.average_delta(&start);

        if reached {
            debug!("Reached {:.4} rad after {} ticks", realized, ticks);
            Ok(MotionOutcome::Reached { target, realized, ticks })
        } else {
            warn!(
                "Simulation stopped after {} ticks at {:.4}/{:.4} rad",
                ticks, realized, target
            );
            Ok(MotionOutcome::Interrupted { target, realized, ticks })
        }
    }
}

impl<R: Robot> Drop for DiffDrive<R> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop wheels on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::device::WheelPositions;
    use crate::robot::sim::SimulatedRobot;
    use approx::assert_relative_eq;

    /// Replays a fixed per-tick encoder sequence and records velocity commands
    struct ScriptedRobot {
        // (left, right) encoder readings after each tick
        readings: Vec<(f64, f64)>,
        tick: usize,
        // (tick, left, right) for every command issued
        commands: Vec<(usize, f64, f64)>,
        velocities: (f64, f64),
    }

    impl ScriptedRobot {
        fn spinning(avg_per_tick: &[f64]) -> Self {
            let readings = avg_per_tick.iter().map(|&a| (a, -a)).collect();
            Self {
                readings,
                tick: 0,
                commands: Vec::new(),
                velocities: (0.0, 0.0),
            }
        }
    }

    impl Robot for ScriptedRobot {
        fn timestep_ms(&self) -> u32 {
            32
        }

        fn step(&mut self) -> Step {
            if self.tick >= self.readings.len() {
                return Step::Stop;
            }
            self.tick += 1;
            Step::Continue
        }

        fn set_left_velocity(&mut self, velocity: f64) -> Result<(), DeviceError> {
            self.velocities.0 = velocity;
            self.commands.push((self.tick, self.velocities.0, self.velocities.1));
            Ok(())
        }

        fn set_right_velocity(&mut self, velocity: f64) -> Result<(), DeviceError> {
            self.velocities.1 = velocity;
            self.commands.push((self.tick, self.velocities.0, self.velocities.1));
            Ok(())
        }

        fn wheel_positions(&self) -> Result<WheelPositions, DeviceError> {
            if self.tick == 0 {
                return Ok(WheelPositions::default());
            }
            let (left, right) = self.readings[self.tick - 1];
            Ok(WheelPositions::new(left, right))
        }
    }

    fn stop_tick(robot: &ScriptedRobot) -> usize {
        robot
            .commands
            .iter()
            .skip(2) // zeroing on construction
            .find(|&&(_, l, r)| l == 0.0 && r == 0.0)
            .map(|&(tick, _, _)| tick)
            .unwrap()
    }

    #[test]
    fn test_turn_stops_on_first_crossing_tick() {
        let robot = ScriptedRobot::spinning(&[0.5, 1.0, 1.5, 2.0, 2.5]);
        let mut drive = DiffDrive::new(robot).unwrap();
        let outcome = drive.turn(TurnDirection::Clockwise, 1.4, 6.0).unwrap();

        assert_eq!(outcome.ticks(), 3);
        assert_relative_eq!(outcome.realized(), 1.5);
        assert_eq!(stop_tick(drive.robot()), 3);
    }

    #[test]
    fn test_turn_crossing_exactly_at_target() {
        let robot = ScriptedRobot::spinning(&[0.5, 1.0, 1.5]);
        let mut drive = DiffDrive::new(robot).unwrap();
        let outcome = drive.turn(TurnDirection::Clockwise, 1.0, 6.0).unwrap();

        assert_eq!(outcome.ticks(), 2);
        assert_eq!(stop_tick(drive.robot()), 2);
        assert!(!outcome.is_interrupted());
    }

    #[test]
    fn test_turn_interrupted_by_simulator_stop() {
        let robot = ScriptedRobot::spinning(&[0.5, 1.0]);
        let mut drive = DiffDrive::new(robot).unwrap();
        let outcome = drive.turn(TurnDirection::Clockwise, 5.0, 6.0).unwrap();

        assert!(outcome.is_interrupted());
        assert_eq!(outcome.ticks(), 2);
        assert_relative_eq!(outcome.realized(), 1.0);
    }

    #[test]
    fn test_turn_direction_sets_opposite_wheels() {
        let robot = ScriptedRobot::spinning(&[1.0]);
        let mut drive = DiffDrive::new(robot).unwrap();
        drive.turn(TurnDirection::CounterClockwise, 0.5, 4.0).unwrap();
        let driving = drive.robot().commands[3];
        assert_eq!((driving.1, driving.2), (-4.0, 4.0));
    }

    #[test]
    fn test_turn_overshoot_bounded_by_one_tick() {
        let sim = SimulatedRobot::new().with_max_acceleration(f64::INFINITY);
        let mut drive = DiffDrive::new(sim).unwrap();
        let target = turn_params(0.2, 90.0).wheel_rotation;
        let outcome = drive
            .turn(TurnDirection::Clockwise, target, crate::config::MAX_SPEED)
            .unwrap();

        let per_tick = crate::config::MAX_SPEED * drive.robot().timestep_ms() as f64 / 1000.0;
        assert!(outcome.realized() >= target);
        assert!(outcome.realized() - target <= per_tick + 1e-9);
    }

    #[test]
    fn test_translate_moves_one_tile() {
        let sim = SimulatedRobot::new().with_max_acceleration(f64::INFINITY);
        let mut drive = DiffDrive::new(sim).unwrap();
        drive.translate(Move::Back, 6.0).unwrap();
        drive.settle(5);

        let pose = drive.robot().pose();
        assert!(pose.x < -TILE_SIZE + 0.01 && pose.x > -TILE_SIZE - 0.01);
        assert_eq!(drive.robot().target_velocities(), [0.0, 0.0]);
    }

    #[test]
    fn test_settle_reports_stop() {
        let sim = SimulatedRobot::new().with_max_ticks(5);
        let mut drive = DiffDrive::new(sim).unwrap();
        assert_eq!(drive.settle(3), Step::Continue);
        assert_eq!(drive.settle(3), Step::Stop);
    }
}
