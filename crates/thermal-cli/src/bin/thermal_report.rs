//! Detect thermals in JSON track files and print them grouped into categories.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use thermal_cli::config::parse_sort_fields;
use thermal_cli::{init_tracing, load_flight, Config};
use thermal_core::{
    CategoryReport, Categorizer, CountingTitles, Logbook, Thermal, ThermalDetector,
};
use tracing::{info, warn};

/// Thermal analysis over recorded glider flights
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Track files to analyse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Comma separated grouping fields, outermost first
    /// (year, month, glider, thermal-strength, thermal-climb)
    #[arg(long)]
    sort_by: Option<String>,

    /// Maximum ground speed over one minute while circling (m/s)
    #[arg(long)]
    max_speed: Option<f64>,

    /// Minimum altitude gain for a thermal (m)
    #[arg(long)]
    min_climb_distance: Option<f64>,

    /// Minimum climb over one minute of fixes
    #[arg(long)]
    min_climb_rate: Option<f64>,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(list) = &args.sort_by {
        let fields = parse_sort_fields(list).map_err(anyhow::Error::msg)?;
        config = config.with_sort_fields(fields);
    }
    if let Some(value) = args.max_speed {
        config.detection.max_speed_in_thermal_mps = value;
    }
    if let Some(value) = args.min_climb_distance {
        config.detection.min_thermal_climb_distance_m = value;
    }
    if let Some(value) = args.min_climb_rate {
        config.detection.min_thermal_climb_rate_mps = value;
    }

    let mut logbook = Logbook::new();
    for path in &args.files {
        match load_flight(path) {
            Ok(flight) => {
                logbook.add_flight(flight);
            }
            Err(err) => warn!(error = %err, "skipping track"),
        }
    }
    if logbook.is_empty() {
        anyhow::bail!("no readable track files");
    }

    let summary = logbook.detect_all(&ThermalDetector::new(config.detection.clone()));
    info!(
        analyzed = summary.flights_analyzed,
        skipped = summary.flights_skipped,
        thermals = summary.thermals_found,
        "detection finished"
    );

    let thermals: Vec<Thermal> = logbook.thermals().cloned().collect();
    let categorizer = Categorizer::new(config.categories.clone());
    let forest = categorizer.categorize(&logbook, thermals, &mut CountingTitles);
    let reports = CategoryReport::from_forest(&logbook, &forest)
        .context("failed to build category report")?;

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &reports).context("failed to write report")?;
    writeln!(writer)?;
    writer.flush()?;

    if let Some(path) = &args.output {
        info!(path = %path.display(), categories = forest.len(), "report written");
    }
    Ok(())
}
