//! Fixes-per-minute estimation.
//!
//! Loggers record at a fixed interval, so one local measurement in the
//! middle of the track stands in for the whole series.

use tracing::warn;

use crate::error::{Result, ThermalError};
use crate::models::Flight;

/// Fewest fixes for a trustworthy estimate.
pub const MIN_FIXES_FOR_RATE: usize = 21;
/// Distance, in fixes, between the two probe fixes.
const PROBE_SPAN: usize = 10;

impl Flight {
    /// Number of fixes recorded per minute, computed once per flight.
    ///
    /// Measures the time between the middle fix and the fix ten positions
    /// later. A rate of zero is possible for very sparse tracks.
    pub fn fixes_per_minute(&self) -> Result<u32> {
        if let Some(rate) = self.fixes_per_minute.get() {
            return Ok(*rate);
        }
        let rate = estimate_fixes_per_minute(self)?;
        Ok(*self.fixes_per_minute.get_or_init(|| rate))
    }
}

fn estimate_fixes_per_minute(flight: &Flight) -> Result<u32> {
    let fixes = flight.fixes();
    if fixes.len() < MIN_FIXES_FOR_RATE {
        warn!(
            pilot = %flight.pilot,
            fixes = fixes.len(),
            "not enough fixes for a reliable sampling rate"
        );
    }

    let mid = fixes.len() / 2;
    let (Some(start), Some(end)) = (fixes.get(mid), fixes.get(mid + PROBE_SPAN)) else {
        return Err(ThermalError::InsufficientFixes {
            found: fixes.len(),
            required: MIN_FIXES_FOR_RATE,
        });
    };

    let gap_minutes = end.seconds_since(start) / 60.0;
    if gap_minutes <= 0.0 {
        return Err(ThermalError::DegenerateSampling);
    }

    Ok((PROBE_SPAN as f64 / gap_minutes).round() as u32)
}
