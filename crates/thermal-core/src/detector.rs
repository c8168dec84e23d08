//! Thermal detection over a flight's fix series.
//!
//! A thermal is a contiguous run of fixes where every one-minute window
//! stays under the circling speed limit and climbs by more than the
//! one-minute gain threshold, and where the run as a whole gains more than
//! the minimum climb distance.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Fix, Flight, FlightId, Logbook, Thermal};
use crate::rules::DetectionRules;

/// Scans flights for thermals using a fixed set of [`DetectionRules`].
#[derive(Debug, Clone, Default)]
pub struct ThermalDetector {
    rules: DetectionRules,
}

impl ThermalDetector {
    pub fn new(rules: DetectionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &DetectionRules {
        &self.rules
    }

    /// Whether the one-minute window starting at `start` looks like circling
    /// in lift: slow enough over the ground and gaining enough height.
    ///
    /// `rate` is the flight's fixes per minute; the window ends at
    /// `start + rate`, which must be a valid index.
    pub fn window_holds(&self, fixes: &[Fix], start: usize, rate: usize) -> bool {
        let (Some(from), Some(to)) = (fixes.get(start), fixes.get(start + rate)) else {
            return false;
        };
        let speed = to.speed_since(from);
        let gain = to.altitude_m - from.altitude_m;
        speed < self.rules.max_speed_in_thermal_mps
            && gain > self.rules.one_minute_climb_gain_threshold_m()
    }

    /// Find every thermal in `flight`, in order of their first fix.
    ///
    /// Runs never overlap. A run still climbing when the scan runs out of
    /// full windows is closed at the last fix and ends the scan.
    pub fn detect(&self, id: FlightId, flight: &Flight) -> Result<Vec<Thermal>> {
        flight.validate()?;
        let rate = flight.fixes_per_minute()? as usize;
        let fixes = flight.fixes();

        if rate == 0 {
            warn!(%id, "sampling rate rounds to zero fixes per minute, skipping detection");
            return Ok(Vec::new());
        }
        if fixes.len() <= rate {
            return Ok(Vec::new());
        }

        let limit = fixes.len() - rate;
        let mut thermals = Vec::new();
        let mut i = 0;

        while i < limit {
            if !self.window_holds(fixes, i, rate) {
                i += 1;
                continue;
            }

            let start = i;
            i += 1;
            while i < limit && self.window_holds(fixes, i, rate) {
                i += 1;
            }

            let exhausted = i >= limit;
            // `end` is exclusive; the climb is measured to the fix closing
            // the first failing window, or to the last fix when exhausted.
            let (end, gain_index) = if exhausted {
                (fixes.len(), fixes.len() - 1)
            } else {
                (i + rate, i + rate)
            };
            let gain = fixes[gain_index].altitude_m - fixes[start].altitude_m;

            if gain > self.rules.min_thermal_climb_distance_m {
                debug!(
                    pilot = %flight.pilot,
                    glider = %flight.airplane_id,
                    start = %fixes[start].label(),
                    end = %fixes[gain_index].label(),
                    gain_m = gain,
                    "thermal found"
                );
                thermals.push(Thermal::new(id, start, fixes[start..end].to_vec()));
                i = end;
            } else {
                i += 1;
            }

            if exhausted {
                break;
            }
        }

        Ok(thermals)
    }
}

/// Outcome of running detection over a whole [`Logbook`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub flights_analyzed: usize,
    pub flights_skipped: usize,
    pub thermals_found: usize,
}

impl Logbook {
    /// Detect thermals for one flight and cache them on it.
    ///
    /// Returns the number of thermals found. Any previous result is replaced.
    pub fn detect_flight(&mut self, id: FlightId, detector: &ThermalDetector) -> Result<usize> {
        let thermals = detector.detect(id, self.flight(id)?)?;
        let count = thermals.len();
        self.flight_mut(id)?.set_thermals(thermals);
        Ok(count)
    }

    /// Detect thermals for every flight. Failing flights are logged and
    /// skipped; they keep no thermals.
    pub fn detect_all(&mut self, detector: &ThermalDetector) -> DetectionSummary {
        let mut summary = DetectionSummary::default();
        for index in 0..self.len() {
            let id = FlightId(index);
            match self.detect_flight(id, detector) {
                Ok(count) => {
                    if let Ok(flight) = self.flight(id) {
                        info!(
                            %id,
                            pilot = %flight.pilot,
                            glider = %flight.airplane_id,
                            thermals = count,
                            "flight analyzed"
                        );
                    }
                    summary.flights_analyzed += 1;
                    summary.thermals_found += count;
                }
                Err(err) => {
                    warn!(%id, error = %err, "skipping flight");
                    if let Ok(flight) = self.flight_mut(id) {
                        flight.set_thermals(Vec::new());
                    }
                    summary.flights_skipped += 1;
                }
            }
        }
        summary
    }
}
