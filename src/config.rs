// Robot geometry, speeds, tick budgets, LLM endpoint

// Wheel geometry (e-puck)
pub const WHEEL_RADIUS: f64 = 0.0205; // meters
pub const MAX_SPEED: f64 = 6.28; // rad/s, used for calibration turns
pub const DRIVE_SPEED: f64 = 6.0; // rad/s, used by the LLM controllers

// Candidate axle lengths swept by the calibration controller
pub const AXLE_CANDIDATES: [f64; 3] = [0.195, 0.2, 0.205];

// Length of one step on the 1-D line world
pub const TILE_SIZE: f64 = 0.25; // meters

// Settle budgets, in simulation ticks
pub const WARMUP_TICKS: u32 = 100; // before the first trial
pub const STABILIZE_TICKS: u32 = 20; // before each turn
pub const SETTLE_TICKS: u32 = 50; // after a trial
pub const BETWEEN_TESTS_TICKS: u32 = 100; // between the 360° and 4x90° tests
pub const BETWEEN_CANDIDATES_TICKS: u32 = 200;
pub const TILE_SETTLE_TICKS: u32 = 20; // after each tile move

// Ticks between two directional polls
pub const LLM_INTERVAL: u32 = 20;

// Ollama chat endpoint
pub const DEFAULT_MODEL: &str = "qwen2.5:3b";
pub const DEFAULT_LLM_HOST: &str = "http://localhost:11434";

// Built-in simulator
pub const SIM_TIMESTEP_MS: u32 = 32;
pub const SIM_TRUE_AXLE_LENGTH: f64 = 0.2; // meters
pub const SIM_MAX_ACCELERATION: f64 = 60.0; // rad/s^2
