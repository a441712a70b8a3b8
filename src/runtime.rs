// Controller entry points: wire the simulator, the driver and the chat client
//
// Each controller runs on the single control thread until the simulator
// reports termination. Reports go to stdout; diagnostics go through tracing.

use std::io::{self, Write};

use tracing::info;

use crate::calibration::{Calibrator, format_report};
use crate::config::{DRIVE_SPEED, MAX_SPEED, WHEEL_RADIUS};
use crate::controller::{DirectionalController, LinePlanner};
use crate::llm::OllamaClient;
use crate::robot::{DiffDrive, Robot, SimulatedRobot, Step};

pub type RunResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Simulator settings shared by all controllers
#[derive(Debug, Clone, Copy, Default)]
pub struct SimOptions {
    pub max_ticks: Option<u64>,
}

impl SimOptions {
    fn robot(&self) -> SimulatedRobot {
        let sim = SimulatedRobot::new();
        match self.max_ticks {
            Some(max_ticks) => sim.with_max_ticks(max_ticks),
            None => sim,
        }
    }
}

/// Keep stepping with the wheels stopped until the simulator terminates
fn idle_until_stop<R: Robot>(drive: &mut DiffDrive<R>) -> RunResult {
    drive.stop()?;
    while drive.step() == Step::Continue {}
    info!("Simulation stopped");
    Ok(())
}

/// Sweep the candidate axle lengths and print the best one
pub fn calibrate(candidates: &[f64], sim: SimOptions) -> RunResult {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("AXLE LENGTH CALIBRATION");
    println!("{}", rule);
    println!("Wheel radius: {} m", WHEEL_RADIUS);
    println!("Max speed: {} rad/s", MAX_SPEED);
    println!("Testing {} different axle lengths...", candidates.len());
    println!("{}", rule);

    let mut drive = DiffDrive::new(sim.robot())?;
    let results = Calibrator::new(&mut drive).sweep(candidates)?;

    print!("{}", format_report(&results));
    println!("Calibration done! Robot stopping.");

    idle_until_stop(&mut drive)
}

/// Poll the model for a directional action every `interval` ticks
pub fn drive(model: &str, host: &str, interval: u32, sim: SimOptions) -> RunResult {
    let chat = OllamaClient::new(host)?;
    let mut drive = DiffDrive::new(sim.robot())?;
    let mut controller = DirectionalController::new(chat, model, interval, DRIVE_SPEED);
    controller.run(&mut drive)?;
    Ok(())
}

/// Ask the model once for a path from `start` to `goal` and drive it
pub fn plan(model: &str, host: &str, start: i32, goal: i32, sim: SimOptions) -> RunResult {
    let chat = OllamaClient::new(host)?;
    let mut drive = DiffDrive::new(sim.robot())?;
    let mut planner = LinePlanner::new(chat, model, DRIVE_SPEED, start, goal);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = planner.run(&mut drive, &mut out)?;
    out.flush()?;
    info!("Path execution finished: {:?}", report);

    idle_until_stop(&mut drive)
}
