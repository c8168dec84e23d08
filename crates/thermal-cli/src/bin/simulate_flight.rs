//! Write a synthetic glider track for one of the built-in scenarios.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thermal_cli::import::write_track;
use thermal_cli::init_tracing;
use thermal_cli::sim::{
    create_cross_country_scenario, create_final_glide_scenario, create_wave_climb_scenario,
};
use thermal_core::GeoPoint;
use tracing::info;

/// Available scenarios
#[derive(Debug, Clone, ValueEnum)]
enum ScenarioType {
    /// Two thermals separated by glides
    CrossCountry,
    /// Five minutes of straight climb in wave
    WaveClimb,
    /// Straight glide with no lift
    FinalGlide,
}

/// Synthetic glider track generator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scenario to simulate
    #[arg(long, value_enum, default_value = "cross-country")]
    scenario: ScenarioType,

    /// Track file to write
    #[arg(long, short)]
    output: PathBuf,

    /// Start latitude (default: Saint-Auban, France)
    #[arg(long, default_value_t = 44.0597)]
    lat: f64,

    /// Start longitude (default: Saint-Auban, France)
    #[arg(long, default_value_t = 5.9914)]
    lon: f64,

    /// Takeoff time, RFC 3339
    #[arg(long, default_value = "2017-07-08T11:00:00Z")]
    start: DateTime<Utc>,

    /// Seconds between fixes
    #[arg(long, default_value_t = 2.0)]
    interval: f64,

    /// Random position noise in meters
    #[arg(long, default_value_t = 0.0)]
    jitter: f64,

    /// Seed for the position noise
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    if args.interval <= 0.0 {
        anyhow::bail!("--interval must be positive");
    }

    let origin = GeoPoint::new(args.lat, args.lon);
    let scenario = match args.scenario {
        ScenarioType::CrossCountry => create_cross_country_scenario(origin),
        ScenarioType::WaveClimb => create_wave_climb_scenario(origin),
        ScenarioType::FinalGlide => create_final_glide_scenario(origin),
    };

    let flight = match args.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            scenario.sample_with_jitter(args.start, args.interval, &mut rng, args.jitter)
        }
        None => {
            let mut rng = rand::rng();
            scenario.sample_with_jitter(args.start, args.interval, &mut rng, args.jitter)
        }
    };

    write_track(&args.output, &flight)
        .with_context(|| format!("failed to write scenario '{}'", scenario.name))?;
    info!(
        scenario = %scenario.name,
        fixes = flight.num_fixes(),
        duration_s = scenario.duration(),
        path = %args.output.display(),
        "track written"
    );
    Ok(())
}
