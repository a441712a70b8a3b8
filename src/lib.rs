pub mod calibration;
pub mod config;
pub mod controller;
pub mod llm;
pub mod messages;
pub mod robot;
pub mod runtime;
