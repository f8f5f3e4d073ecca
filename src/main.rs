use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};
use pitwall::{
    PitRequest, PitwallError, StrategyConfig, compare_compounds, evaluate_pit_recommendation,
    evaluate_tire_status,
    strategy::FuelModel,
    writer::{evaluate_requests, write_records, write_records_to_file},
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Strategy config file, defaults to the saved user config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wear status of the current tires
    Tires {
        #[arg(long)]
        compound: String,
        #[arg(long)]
        stint_laps: i64,
        #[arg(long, allow_negative_numbers = true)]
        track_temp: Option<f64>,
    },
    /// Whether and when to pit
    Recommend {
        #[arg(long)]
        current_lap: i64,
        #[arg(long)]
        total_laps: i64,
        #[arg(long)]
        position: i64,
        #[arg(long)]
        fuel: f64,
        #[arg(long)]
        compound: String,
        #[arg(long)]
        stint_laps: i64,
        #[arg(long, default_value_t = 0.)]
        gap_ahead: f64,
        #[arg(long, default_value_t = 0.)]
        gap_behind: f64,
        #[arg(long)]
        caution: bool,
        #[arg(long, allow_negative_numbers = true)]
        track_temp: Option<f64>,
        /// Liters per lap
        #[arg(long)]
        fuel_rate: Option<f64>,
        /// Fuel used on recent laps, averaged when no rate is given
        #[arg(long, value_delimiter = ',')]
        fuel_samples: Vec<f64>,
    },
    /// Rank single-compound strategies for the rest of the race
    Compare {
        #[arg(long)]
        total_laps: i64,
        #[arg(long)]
        current_lap: i64,
    },
    /// Evaluate every request in a JSON Lines file
    Batch {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save the active config as the user config
    SaveConfig,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PitwallError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| PitwallError::OutputSerializeError { source: e })?;
    println!("{}", rendered);
    Ok(())
}

fn run(cli: Args) -> Result<(), PitwallError> {
    let config = StrategyConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Tires {
            compound,
            stint_laps,
            track_temp,
        } => print_json(&evaluate_tire_status(
            &compound, stint_laps, track_temp, &config,
        )?),
        Commands::Recommend {
            current_lap,
            total_laps,
            position,
            fuel,
            compound,
            stint_laps,
            gap_ahead,
            gap_behind,
            caution,
            track_temp,
            fuel_rate,
            fuel_samples,
        } => {
            let request = PitRequest {
                current_lap,
                total_laps,
                current_position: position,
                fuel_remaining: fuel,
                tire_compound: compound,
                tire_stint_laps: stint_laps,
                gap_ahead,
                gap_behind,
                is_caution: caution,
                track_temp,
                fuel_consumption_rate: fuel_rate
                    .or_else(|| FuelModel::estimate_consumption_rate(&fuel_samples)),
            };
            print_json(&evaluate_pit_recommendation(&request, &config)?)
        }
        Commands::Compare {
            total_laps,
            current_lap,
        } => print_json(&compare_compounds(total_laps, current_lap, &config)?),
        Commands::Batch { input, output } => {
            let records = evaluate_requests(&input, &config)?;
            match output {
                Some(output_file) => write_records_to_file(&output_file, &records),
                None => write_records(io::stdout().lock(), &records),
            }
        }
        Commands::SaveConfig => config.save(),
    }
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = run(cli) {
        log::error!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(if e.is_validation() { 2 } else { 1 });
    }
}
