// Differential-drive kinematics for in-place turns and tile moves
//
// An in-place turn by angle θ moves each wheel along an arc of θ·L where L
// is the axle length; the wheel rotation is that arc over the wheel radius.

use crate::config::WHEEL_RADIUS;

/// Wheel rotation and arc length needed for a turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnParams {
    pub wheel_rotation: f64, // radians
    pub arc_length: f64,     // meters
}

/// Compute the turn parameters for `degrees` with the given axle length
///
/// Caller must supply a positive axle length.
pub fn turn_params(axle_length: f64, degrees: f64) -> TurnParams {
    turn_params_with_radius(axle_length, degrees, WHEEL_RADIUS)
}

/// Same as [`turn_params`] with a custom wheel radius
pub fn turn_params_with_radius(axle_length: f64, degrees: f64, wheel_radius: f64) -> TurnParams {
    let arc_length = degrees.to_radians() * axle_length;
    TurnParams {
        wheel_rotation: arc_length / wheel_radius,
        arc_length,
    }
}

/// Body rotation in degrees implied by an average wheel rotation
pub fn measured_angle(avg_rotation: f64, axle_length: f64) -> f64 {
    let arc = avg_rotation * WHEEL_RADIUS;
    (arc / axle_length).to_degrees()
}

/// Wheel rotation needed to travel one tile
pub fn tile_rotation(tile_size: f64) -> f64 {
    tile_size / WHEEL_RADIUS
}

/// Open-loop duration (seconds) to cover `wheel_rotation` at `speed` rad/s
pub fn timed_turn_duration(wheel_rotation: f64, speed: f64) -> f64 {
    wheel_rotation / speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_turn_params_closed_form() {
        for &axle in &[0.05, 0.195, 0.2, 0.205, 1.0] {
            for &deg in &[1.0, 45.0, 90.0, 360.0, 720.0] {
                let params = turn_params(axle, deg);
                let radians = deg * PI / 180.0;
                assert_relative_eq!(params.arc_length, radians * axle, epsilon = 1e-12);
                assert_relative_eq!(
                    params.wheel_rotation,
                    radians * axle / WHEEL_RADIUS,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_quarter_turn_for_default_axle() {
        let params = turn_params(0.2, 90.0);
        assert_relative_eq!(params.arc_length, 0.314159, epsilon = 1e-6);
        assert_relative_eq!(params.wheel_rotation, 15.3248, epsilon = 1e-4);
    }

    #[test]
    fn test_measured_angle_inverts_turn_params() {
        let params = turn_params(0.195, 360.0);
        assert_relative_eq!(measured_angle(params.wheel_rotation, 0.195), 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tile_rotation_and_duration() {
        assert_relative_eq!(tile_rotation(0.0205), 1.0, epsilon = 1e-12);
        assert_relative_eq!(timed_turn_duration(12.56, 6.28), 2.0, epsilon = 1e-12);
    }
}
