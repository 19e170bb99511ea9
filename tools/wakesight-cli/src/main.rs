//! Wakesight CLI: watch a camera for motion and report auto-wake events.
//!
//! Usage:
//!   wakesight watch [OPTIONS]      Run a live detection session until Ctrl+C
//!   wakesight check                Check camera capabilities
//!   wakesight simulate [OPTIONS]   Run detection against a synthetic source

use clap::{Parser, Subcommand};
use wakesight_common::config::AppConfig;
use wakesight_motion_model::Sensitivity;

mod commands;

#[derive(Parser)]
#[command(
    name = "wakesight",
    about = "Webcam motion detection with auto-wake events",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the camera until Ctrl+C
    Watch {
        /// Camera device (e.g. /dev/video2). Auto-detected when omitted
        #[arg(short, long)]
        device: Option<String>,

        /// Sensitivity: low, medium or high
        #[arg(short, long)]
        sensitivity: Option<Sensitivity>,

        /// Emit auto-wake events (overrides the config file)
        #[arg(long)]
        auto_wake: Option<bool>,

        /// Delay between samples in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },

    /// Check camera capabilities
    Check,

    /// Run detection against a synthetic moving block
    Simulate {
        /// Number of samples to take
        #[arg(short, long, default_value = "20")]
        frames: u64,

        /// Sensitivity: low, medium or high
        #[arg(short, long, default_value = "medium")]
        sensitivity: Sensitivity,

        /// Delay between samples in milliseconds
        #[arg(long, default_value = "50")]
        interval_ms: u64,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    wakesight_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Watch {
            device,
            sensitivity,
            auto_wake,
            interval_ms,
            json,
        } => {
            let overrides = commands::watch::Overrides {
                device,
                sensitivity,
                auto_wake,
                interval_ms,
            };
            commands::watch::run(&config, overrides, json).await
        }
        Commands::Check => commands::check::run(),
        Commands::Simulate {
            frames,
            sensitivity,
            interval_ms,
            json,
        } => commands::simulate::run(frames, sensitivity, interval_ms, json).await,
    }
}
