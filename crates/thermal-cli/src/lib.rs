//! Thermal CLI - Command line tools for glider thermal analysis.
//!
//! This crate provides the CLI binaries:
//! - thermal-report: detect and categorize thermals in JSON track files
//! - simulate-flight: write a synthetic track for a named scenario

pub mod config;
pub mod import;
pub mod sim;

pub use config::Config;
pub use import::{load_flight, read_track, write_track, ImportError, TrackRecord};

/// Install the `tracing` subscriber shared by the binaries. Logs go to stderr.
pub fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("thermal_core=info".parse()?)
                .add_directive("thermal_cli=info".parse()?),
        )
        .init();
    Ok(())
}
