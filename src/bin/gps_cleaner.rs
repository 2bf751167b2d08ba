//! Command-line front-end: clean a JSON ping file.
//!
//! ```text
//! gps-cleaner --input raw.json --output processed.json \
//!     [--config thresholds.json] [--geojson map.geojson]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gps_cleaner::io::{run_pipeline, save_json, to_geojson};

#[derive(Parser, Debug)]
#[command(about = "GPS cleaner: jitter removal, smoothing, idling detection")]
struct Args {
    /// JSON file containing GPS pings
    #[arg(long)]
    input: PathBuf,

    /// Where to write the processed JSON
    #[arg(long)]
    output: PathBuf,

    /// JSON file with thresholds (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optional GeoJSON output for map display
    #[arg(long)]
    geojson: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let result = match run_pipeline(&args.input, &args.output, args.config.as_deref()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("gps-cleaner: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &args.geojson {
        if let Err(e) = save_json(path, &to_geojson(&result)) {
            eprintln!("gps-cleaner: {}", e);
            return ExitCode::FAILURE;
        }
    }

    println!(
        "{} pings, {} jitter, {} cleaned, {} idling intervals",
        result.raw_points.len(),
        result.jitter_point_ids.len(),
        result.cleaned_points.len(),
        result.idling_intervals.len()
    );
    ExitCode::SUCCESS
}
