//! Error types for thermal analysis.

use thiserror::Error;

use crate::models::FlightId;

/// Recoverable failures raised while analysing a flight.
///
/// None of these are fatal to a batch: callers log them, skip the affected
/// flight or thermal, and continue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThermalError {
    #[error("not enough fixes to estimate the sampling rate: found {found}, need at least {required}")]
    InsufficientFixes { found: usize, required: usize },
    #[error("sampling probe fixes share a timestamp, cannot estimate fixes per minute")]
    DegenerateSampling,
    #[error("fix timestamps go backwards at index {index}")]
    NonMonotonicTimestamps { index: usize },
    #[error("thermal has no fixes")]
    EmptyThermal,
    #[error("thermal gains no altitude between its first and last fix, drift is undefined")]
    FlatThermal,
    #[error("no flight registered under {0}")]
    UnknownFlight(FlightId),
}

pub type Result<T> = std::result::Result<T, ThermalError>;
