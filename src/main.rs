use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use llm_drive::config::{AXLE_CANDIDATES, DEFAULT_LLM_HOST, DEFAULT_MODEL, LLM_INTERVAL};
use llm_drive::runtime::{self, SimOptions};

/// Controllers for a simulated differential-drive robot
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Stop the simulation after this many ticks (runs forever if omitted)
    #[arg(long, global = true)]
    max_ticks: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the axle length with the lowest turn error
    Calibrate {
        /// Candidate axle length in meters (repeatable)
        #[arg(long = "axle")]
        axles: Vec<f64>,
    },
    /// Drive continuously on FORWARD/LEFT/RIGHT/BACK actions from the model
    Drive {
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
        #[arg(long, default_value = DEFAULT_LLM_HOST)]
        host: String,
        /// Ticks between two model polls
        #[arg(long, default_value_t = LLM_INTERVAL)]
        interval: u32,
    },
    /// Plan an F/B path on the line once and execute it
    Plan {
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
        #[arg(long, default_value = DEFAULT_LLM_HOST)]
        host: String,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        start: i32,
        #[arg(long, allow_hyphen_values = true)]
        goal: i32,
    },
}

fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let cli = Cli::parse();
    let sim = SimOptions {
        max_ticks: cli.max_ticks,
    };

    let result = match cli.command {
        Command::Calibrate { axles } => {
            let candidates = if axles.is_empty() {
                AXLE_CANDIDATES.to_vec()
            } else {
                axles
            };
            runtime::calibrate(&candidates, sim)
        }
        Command::Drive {
            model,
            host,
            interval,
        } => runtime::drive(&model, &host, interval, sim),
        Command::Plan {
            model,
            host,
            start,
            goal,
        } => runtime::plan(&model, &host, start, goal, sim),
    };

    if let Err(e) = result {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
