// Kinematic stand-in for the hosting simulator
//
// Models an e-puck-like differential-drive body: each motor tracks its
// target velocity under an acceleration limit, encoders integrate wheel
// velocity, and the planar pose integrates the body twist computed from the
// true axle length.

use tracing::{debug, warn};

use super::device::{DeviceError, Robot, Step, WheelPositions};
use crate::config::{
    MAX_SPEED, SIM_MAX_ACCELERATION, SIM_TIMESTEP_MS, SIM_TRUE_AXLE_LENGTH, WHEEL_RADIUS,
};

/// Planar pose of the simulated body
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64, // radians, counter-clockwise positive
}

#[derive(Debug, Clone, Copy, Default)]
struct Wheel {
    target: f64,
    velocity: f64,
    position: f64,
}

impl Wheel {
    fn advance(&mut self, dt: f64, max_acceleration: f64) {
        let max_dv = max_acceleration * dt;
        let dv = (self.target - self.velocity).clamp(-max_dv, max_dv);
        self.velocity += dv;
        self.position += self.velocity * dt;
    }
}

pub struct SimulatedRobot {
    timestep_ms: u32,
    axle_length: f64,
    wheel_radius: f64,
    max_velocity: f64,
    max_acceleration: f64,
    max_ticks: Option<u64>,
    ticks: u64,
    left: Wheel,
    right: Wheel,
    pose: Pose,
}

impl SimulatedRobot {
    pub fn new() -> Self {
        Self {
            timestep_ms: SIM_TIMESTEP_MS,
            axle_length: SIM_TRUE_AXLE_LENGTH,
            wheel_radius: WHEEL_RADIUS,
            max_velocity: MAX_SPEED,
            max_acceleration: SIM_MAX_ACCELERATION,
            max_ticks: None,
            ticks: 0,
            left: Wheel::default(),
            right: Wheel::default(),
            pose: Pose::default(),
        }
    }

    /// Terminate the simulation after `max_ticks` steps
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn with_timestep_ms(mut self, timestep_ms: u32) -> Self {
        self.timestep_ms = timestep_ms;
        self
    }

    pub fn with_axle_length(mut self, axle_length: f64) -> Self {
        self.axle_length = axle_length;
        self
    }

    /// Acceleration limit in rad/s^2; `f64::INFINITY` gives instant response
    pub fn with_max_acceleration(mut self, max_acceleration: f64) -> Self {
        self.max_acceleration = max_acceleration;
        self
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Commanded target velocities [left, right]
    pub fn target_velocities(&self) -> [f64; 2] {
        [self.left.target, self.right.target]
    }

    fn clamp_velocity(&self, name: &'static str, value: f64) -> Result<f64, DeviceError> {
        if !value.is_finite() {
            return Err(DeviceError::InvalidVelocity { name, value });
        }
        if value.abs() > self.max_velocity {
            warn!(
                "{} motor velocity {} exceeds max {}, clamping",
                name, value, self.max_velocity
            );
        }
        Ok(value.clamp(-self.max_velocity, self.max_velocity))
    }
}

impl Default for SimulatedRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl Robot for SimulatedRobot {
    fn timestep_ms(&self) -> u32 {
        self.timestep_ms
    }

    fn step(&mut self) -> Step {
        if let Some(max_ticks) = self.max_ticks {
            if self.ticks >= max_ticks {
                debug!("Simulation reached {} ticks, stopping", max_ticks);
                return Step::Stop;
            }
        }

        let dt = self.timestep_ms as f64 / 1000.0;
        self.left.advance(dt, self.max_acceleration);
        self.right.advance(dt, self.max_acceleration);

        let linear = self.wheel_radius * (self.left.velocity + self.right.velocity) / 2.0;
        let angular = self.wheel_radius * (self.right.velocity - self.left.velocity) / self.axle_length;
        self.pose.heading += angular * dt;
        self.pose.x += linear * self.pose.heading.cos() * dt;
        self.pose.y += linear * self.pose.heading.sin() * dt;

        self.ticks += 1;
        Step::Continue
    }

    fn set_left_velocity(&mut self, velocity: f64) -> Result<(), DeviceError> {
        self.left.target = self.clamp_velocity("left", velocity)?;
        Ok(())
    }

    fn set_right_velocity(&mut self, velocity: f64) -> Result<(), DeviceError> {
        self.right.target = self.clamp_velocity("right", velocity)?;
        Ok(())
    }

    fn wheel_positions(&self) -> Result<WheelPositions, DeviceError> {
        for (name, value) in [("left", self.left.position), ("right", self.right.position)] {
            if !value.is_finite() {
                return Err(DeviceError::InvalidReading { name, value });
            }
        }
        Ok(WheelPositions::new(self.left.position, self.right.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stops_after_max_ticks() {
        let mut sim = SimulatedRobot::new().with_max_ticks(3);
        assert_eq!(sim.step(), Step::Continue);
        assert_eq!(sim.step(), Step::Continue);
        assert_eq!(sim.step(), Step::Continue);
        assert_eq!(sim.step(), Step::Stop);
        assert_eq!(sim.ticks(), 3);
    }

    #[test]
    fn test_encoders_integrate_velocity() {
        let mut sim = SimulatedRobot::new()
            .with_timestep_ms(100)
            .with_max_acceleration(f64::INFINITY);
        sim.set_wheel_velocities(2.0, -1.0).unwrap();
        for _ in 0..10 {
            sim.step();
        }
        let positions = sim.wheel_positions().unwrap();
        assert_relative_eq!(positions.left, 2.0, epsilon = 1e-9);
        assert_relative_eq!(positions.right, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_acceleration_limit_ramps_velocity() {
        let mut sim = SimulatedRobot::new().with_timestep_ms(100).with_max_acceleration(10.0);
        sim.set_wheel_velocities(5.0, 5.0).unwrap();
        sim.step();
        // 10 rad/s^2 over 0.1 s reaches 1 rad/s
        assert_relative_eq!(sim.wheel_positions().unwrap().left, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_spin_in_place_changes_heading_only() {
        let mut sim = SimulatedRobot::new().with_max_acceleration(f64::INFINITY);
        sim.set_wheel_velocities(MAX_SPEED, -MAX_SPEED).unwrap();
        for _ in 0..20 {
            sim.step();
        }
        let pose = sim.pose();
        assert!(pose.heading < 0.0, "left-forward spin turns clockwise");
        assert_relative_eq!(pose.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pose.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_velocity_clamped_and_nan_rejected() {
        let mut sim = SimulatedRobot::new();
        sim.set_left_velocity(100.0).unwrap();
        assert_eq!(sim.target_velocities()[0], MAX_SPEED);
        assert!(sim.set_right_velocity(f64::NAN).is_err());
    }
}
