mod ephemeris;
mod executor;
mod passes;
mod scheduler;
mod visibility;
mod web;

use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;
use std::time::Duration as StdDuration;

use crate::ephemeris::EphemerisWindow;
use crate::passes::detect_passes;
use crate::web::Config;

#[derive(Parser)]
#[command(name = "satwatch")]
#[command(about = "Satellite pass prediction and recording scheduling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ground-station HTTP server
    Serve {
        #[arg(long, default_value = "satwatch.yaml")]
        config: String,
    },
    /// Predict passes over an ephemeris file and print them
    Passes {
        #[arg(long, default_value = "satwatch.yaml")]
        config: String,
        /// Ephemeris payload (JSON) to scan
        ephemeris: String,
        /// Minimum elevation override, in degrees
        #[arg(long)]
        min_elevation: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Passes {
            config,
            ephemeris,
            min_elevation,
        } => print_passes(&config, &ephemeris, min_elevation),
    }
}

async fn serve(config_path: &str) -> ExitCode {
    let config = match Config::from_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_passes(config_path: &str, ephemeris_path: &str, min_elevation: Option<f64>) -> ExitCode {
    let config = match Config::from_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let payload = match fs::read_to_string(ephemeris_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let (window, skipped) = match EphemerisWindow::from_json(&payload) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Invalid ephemeris: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if skipped > 0 {
        eprintln!("warning: {} malformed samples skipped", skipped);
    }

    let min_el = min_elevation.unwrap_or(config.tracking.min_elevation_deg);
    let passes = detect_passes(&window, &config.station_location(), min_el);

    if passes.is_empty() {
        println!("No passes in window");
        return ExitCode::SUCCESS;
    }

    for pass in &passes {
        let duration = StdDuration::from_secs(pass.duration_seconds().max(0) as u64);
        println!(
            "{}  {} ({})  {} - {}  max el {}°  min range {} km",
            humantime::format_duration(duration),
            pass.name,
            pass.sat_id,
            pass.start.format("%Y-%m-%d %H:%M:%S"),
            pass.end.format("%H:%M:%S"),
            pass.max_elevation_deg,
            pass.min_range_km
        );
    }
    ExitCode::SUCCESS
}
