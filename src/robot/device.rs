// Device boundary to the hosting simulator
//
// A controller sees two wheel motors in continuous-rotation mode, the two
// paired rotary encoders, and a per-tick step primitive.

/// Result of advancing the simulation by one timestep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Stop,
}

/// Cumulative wheel rotation in radians, as read from the encoders
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelPositions {
    pub left: f64,
    pub right: f64,
}

impl WheelPositions {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Mean absolute rotation of both wheels since `start`
    pub fn average_delta(&self, start: &WheelPositions) -> f64 {
        let left = (self.left - start.left).abs();
        let right = (self.right - start.right).abs();
        (left + right) / 2.0
    }
}

/// Errors raised by the device boundary
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Motor {name} rejected velocity {value}")]
    InvalidVelocity { name: &'static str, value: f64 },

    #[error("Encoder {name} returned an invalid reading: {value}")]
    InvalidReading { name: &'static str, value: f64 },
}

/// A differential-drive robot hosted by a tick-driven simulator
pub trait Robot {
    /// Basic simulation timestep in milliseconds
    fn timestep_ms(&self) -> u32;

    /// Block until the next timestep; `Stop` once the simulator terminates
    fn step(&mut self) -> Step;

    /// Target angular velocity of the left wheel in rad/s
    fn set_left_velocity(&mut self, velocity: f64) -> Result<(), DeviceError>;

    /// Target angular velocity of the right wheel in rad/s
    fn set_right_velocity(&mut self, velocity: f64) -> Result<(), DeviceError>;

    fn set_wheel_velocities(&mut self, left: f64, right: f64) -> Result<(), DeviceError> {
        self.set_left_velocity(left)?;
        self.set_right_velocity(right)
    }

    /// Current encoder readings
    fn wheel_positions(&self) -> Result<WheelPositions, DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_delta_ignores_direction() {
        let start = WheelPositions::new(1.0, 1.0);
        let now = WheelPositions::new(3.0, -1.0);
        assert_eq!(now.average_delta(&start), 2.0);
    }

    #[test]
    fn test_average_delta_unequal_wheels() {
        let start = WheelPositions::default();
        let now = WheelPositions::new(1.0, -0.5);
        assert_eq!(now.average_delta(&start), 0.75);
    }
}
