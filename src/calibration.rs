// Axle-length calibration by encoder-bounded turns
//
// Each candidate axle length is used to compute the wheel rotation for a
// 360° turn and for four 90° turns. The turns are driven closed-loop on the
// encoders; the realized rotation is converted back to an angle with the same
// candidate, and the deviation from the requested angle is the error. Idle
// ticks separate trials so one measurement does not leak into the next.

use std::fmt::Write as _;

use tracing::{debug, info};

use crate::config::{
    BETWEEN_CANDIDATES_TICKS, BETWEEN_TESTS_TICKS, MAX_SPEED, SETTLE_TICKS, STABILIZE_TICKS,
    WARMUP_TICKS,
};
use crate::robot::kinematics::{measured_angle, timed_turn_duration, turn_params};
use crate::robot::{DeviceError, DiffDrive, Robot, Step, TurnDirection};

/// Where the sweep currently is, per candidate and per sub-test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Stabilizing,
    Turning,
    Measuring,
}

/// Errors of one candidate axle length
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub axle_length: f64,
    /// |360 - measured| for the single full turn
    pub error_360: f64,
    pub actual_360: f64,
    /// Sum of |90 - measured| over the four quarter turns
    pub error_4x90: f64,
    /// |360 - sum of the four measured quarter turns|
    pub drift_4x90: f64,
    pub avg_90: f64,
    pub total_error: f64,
}

/// Parameters derived from the best axle length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub axle_length: f64,
    pub wheel_rotation_90: f64,
    pub arc_length_90: f64,
    /// Open-loop duration of a 90° turn at max speed, seconds
    pub duration_90: f64,
}

impl Recommendation {
    pub fn for_axle(axle_length: f64) -> Self {
        let params = turn_params(axle_length, 90.0);
        Self {
            axle_length,
            wheel_rotation_90: params.wheel_rotation,
            arc_length_90: params.arc_length,
            duration_90: timed_turn_duration(params.wheel_rotation, MAX_SPEED),
        }
    }
}

/// Candidate with the lowest combined error
pub fn best(results: &[TrialResult]) -> Option<&TrialResult> {
    results
        .iter()
        .min_by(|a, b| a.total_error.total_cmp(&b.total_error))
}

/// Runs the turn trials against a driven robot
pub struct Calibrator<'a, R: Robot> {
    drive: &'a mut DiffDrive<R>,
    phase: Phase,
    speed: f64,
}

impl<'a, R: Robot> Calibrator<'a, R> {
    pub fn new(drive: &'a mut DiffDrive<R>) -> Self {
        Self {
            drive,
            phase: Phase::Idle,
            speed: MAX_SPEED,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("Calibration phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Idle for `ticks`; false once the simulator has stopped
    fn idle(&mut self, phase: Phase, ticks: u32) -> bool {
        self.enter(phase);
        self.drive.settle(ticks) == Step::Continue
    }

    /// One encoder-bounded clockwise turn, returning the measured angle
    fn measured_turn(&mut self, axle_length: f64, degrees: f64) -> Result<Option<f64>, DeviceError> {
        if !self.idle(Phase::Stabilizing, STABILIZE_TICKS) {
            return Ok(None);
        }

        self.enter(Phase::Turning);
        let outcome =
            self.drive
                .turn_degrees(TurnDirection::Clockwise, degrees, axle_length, self.speed)?;
        if outcome.is_interrupted() {
            return Ok(None);
        }

        self.enter(Phase::Measuring);
        Ok(Some(measured_angle(outcome.realized(), axle_length)))
    }

    /// Full 360° turn: (error, measured angle)
    pub fn full_rotation(&mut self, axle_length: f64) -> Result<Option<(f64, f64)>, DeviceError> {
        let target = turn_params(axle_length, 360.0).wheel_rotation;
        info!(
            "Testing axle length {:.4} m, target rotation {:.4} rad for 360°",
            axle_length, target
        );

        let Some(angle) = self.measured_turn(axle_length, 360.0)? else {
            return Ok(None);
        };
        let error = (360.0 - angle).abs();
        info!("Actual angle: {:.1}° (error: {:.1}°)", angle, error);

        if !self.idle(Phase::Idle, SETTLE_TICKS) {
            return Ok(None);
        }
        Ok(Some((error, angle)))
    }

    /// Four sequential 90° turns: (summed error, drift from 360°, mean angle)
    pub fn quarter_turns(&mut self, axle_length: f64) -> Result<Option<(f64, f64, f64)>, DeviceError> {
        info!("Testing 4x 90° turns...");

        let mut angles = [0.0f64; 4];
        for (i, slot) in angles.iter_mut().enumerate() {
            let Some(angle) = self.measured_turn(axle_length, 90.0)? else {
                return Ok(None);
            };
            info!("  Turn {}: {:.1}°", i + 1, angle);
            *slot = angle;
        }

        let total: f64 = angles.iter().sum();
        let error: f64 = angles.iter().map(|a| (90.0 - *a).abs()).sum();
        let drift = (360.0 - total).abs();
        info!("Total: {:.1}° (error: {:.1}°, drift: {:.1}°)", total, error, drift);

        if !self.idle(Phase::Idle, SETTLE_TICKS) {
            return Ok(None);
        }
        Ok(Some((error, drift, total / 4.0)))
    }

    /// Both tests for one candidate
    pub fn trial(&mut self, axle_length: f64) -> Result<Option<TrialResult>, DeviceError> {
        let Some((error_360, actual_360)) = self.full_rotation(axle_length)? else {
            return Ok(None);
        };
        if !self.idle(Phase::Idle, BETWEEN_TESTS_TICKS) {
            return Ok(None);
        }
        let Some((error_4x90, drift_4x90, avg_90)) = self.quarter_turns(axle_length)? else {
            return Ok(None);
        };

        let total_error = error_360 + error_4x90;
        info!("Total error: {:.1}°", total_error);
        Ok(Some(TrialResult {
            axle_length,
            error_360,
            actual_360,
            error_4x90,
            drift_4x90,
            avg_90,
            total_error,
        }))
    }

    /// Run every candidate in order
    ///
    /// Stops early, keeping completed results, if the simulator terminates.
    pub fn sweep(&mut self, candidates: &[f64]) -> Result<Vec<TrialResult>, DeviceError> {
        let mut results = Vec::with_capacity(candidates.len());
        if !self.idle(Phase::Idle, WARMUP_TICKS) {
            return Ok(results);
        }

        for &axle_length in candidates {
            match self.trial(axle_length)? {
                Some(result) => results.push(result),
                None => {
                    info!("Simulation stopped during calibration");
                    break;
                }
            }
            if !self.idle(Phase::Idle, BETWEEN_CANDIDATES_TICKS) {
                break;
            }
        }

        self.enter(Phase::Idle);
        Ok(results)
    }
}

/// Human-readable results table with the recommended constants
pub fn format_report(results: &[TrialResult]) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "CALIBRATION COMPLETE - RESULTS");
    let _ = writeln!(out, "{}", rule);

    let Some(best) = best(results) else {
        let _ = writeln!(out, "No calibration trials completed.");
        return out;
    };

    let _ = writeln!(
        out,
        "{:<12} {:<12} {:<12} {:<12}",
        "Axle (m)", "360° Err", "4x90° Err", "Total Err"
    );
    let _ = writeln!(out, "{}", "-".repeat(60));
    for r in results {
        let marker = if std::ptr::eq(r, best) { " <- BEST" } else { "" };
        let _ = writeln!(
            out,
            "{:<12.4} {:<12.1} {:<12.1} {:<12.1}{}",
            r.axle_length, r.error_360, r.error_4x90, r.total_error, marker
        );
    }
    let _ = writeln!(out, "{}", rule);

    let rec = Recommendation::for_axle(best.axle_length);
    let _ = writeln!(out, "AXLE_LENGTH = {:.4}", rec.axle_length);
    let _ = writeln!(out, "For 90° turns with this axle length:");
    let _ = writeln!(out, "  Wheel rotation: {:.4} rad", rec.wheel_rotation_90);
    let _ = writeln!(out, "  Arc length: {:.4} m", rec.arc_length_90);
    let _ = writeln!(out, "  Time: {:.3} seconds", rec.duration_90);
    let _ = writeln!(out, "For time-based instead of encoder-based turns:");
    let _ = writeln!(out, "  TURN_90_DURATION = {:.3}", rec.duration_90);
    let _ = writeln!(out, "{}", rule);
    out
}
