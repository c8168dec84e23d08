//! Core data models: fixes, flights, thermals and the flight arena.

use std::cell::OnceCell;
use std::fmt;
use std::ops::Range;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThermalError};
use crate::metrics::ThermalMetrics;
use crate::spatial::{haversine_distance, GeoPoint};

/// One timestamped position and altitude sample along a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
    #[serde(alias = "alt")]
    pub altitude_m: f64,
    #[serde(alias = "time")]
    pub timestamp: DateTime<Utc>,
}

impl Fix {
    pub fn new(lat: f64, lon: f64, altitude_m: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            lat,
            lon,
            altitude_m,
            timestamp,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Seconds elapsed from `earlier` to this fix (negative if `earlier` is later).
    pub fn seconds_since(&self, earlier: &Fix) -> f64 {
        (self.timestamp - earlier.timestamp).num_milliseconds() as f64 / 1000.0
    }

    /// Average ground speed in m/s between `earlier` and this fix.
    ///
    /// Fixes sharing a timestamp yield a non-finite value, which fails any
    /// `speed < limit` comparison.
    pub fn speed_since(&self, earlier: &Fix) -> f64 {
        haversine_distance(self.lat, self.lon, earlier.lat, earlier.lon) / self.seconds_since(earlier)
    }

    /// Time of day as `H:MM:SS`.
    pub fn label(&self) -> String {
        self.timestamp.format("%-H:%M:%S").to_string()
    }
}

/// Index of a flight inside a [`Logbook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightId(pub usize);

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flight #{}", self.0)
    }
}

/// A single recorded flight.
#[derive(Debug, Clone)]
pub struct Flight {
    pub date: NaiveDate,
    pub pilot: String,
    pub airplane_id: String,
    fixes: Vec<Fix>,
    pub(crate) fixes_per_minute: OnceCell<u32>,
    thermals: Option<Vec<Thermal>>,
}

impl Flight {
    pub fn new(date: NaiveDate, pilot: impl Into<String>, airplane_id: impl Into<String>) -> Self {
        Self {
            date,
            pilot: pilot.into(),
            airplane_id: airplane_id.into(),
            fixes: Vec::new(),
            fixes_per_minute: OnceCell::new(),
            thermals: None,
        }
    }

    /// Replace the fix series.
    pub fn with_fixes(mut self, fixes: Vec<Fix>) -> Self {
        self.fixes = fixes;
        self.fixes_per_minute = OnceCell::new();
        self
    }

    pub fn push_fix(&mut self, fix: Fix) {
        self.fixes.push(fix);
        self.fixes_per_minute = OnceCell::new();
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    pub fn num_fixes(&self) -> usize {
        self.fixes.len()
    }

    /// Check that timestamps never go backwards.
    pub fn validate(&self) -> Result<()> {
        match self
            .fixes
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            Some(index) => Err(ThermalError::NonMonotonicTimestamps { index: index + 1 }),
            None => Ok(()),
        }
    }

    /// Thermals from the last detection run, empty if detection never ran.
    pub fn thermals(&self) -> &[Thermal] {
        self.thermals.as_deref().unwrap_or(&[])
    }

    pub fn thermals_detected(&self) -> bool {
        self.thermals.is_some()
    }

    /// Store a detection result, replacing any previous one.
    pub fn set_thermals(&mut self, thermals: Vec<Thermal>) {
        self.thermals = Some(thermals);
    }
}

/// Contiguous run of fixes copied out of a flight.
///
/// Holds its owning flight as a [`FlightId`] only; resolve it through the
/// [`Logbook`] that produced it.
#[derive(Debug, Clone)]
pub struct Thermal {
    flight: FlightId,
    fix_range: Range<usize>,
    fixes: Vec<Fix>,
    pub(crate) metrics: OnceCell<ThermalMetrics>,
}

impl Thermal {
    /// A thermal whose first fix sits at `start_index` in the flight.
    pub fn new(flight: FlightId, start_index: usize, fixes: Vec<Fix>) -> Self {
        Self {
            flight,
            fix_range: start_index..start_index + fixes.len(),
            fixes,
            metrics: OnceCell::new(),
        }
    }

    pub fn empty(flight: FlightId) -> Self {
        Self::new(flight, 0, Vec::new())
    }

    pub fn push_fix(&mut self, fix: Fix) {
        self.fixes.push(fix);
        self.fix_range.end += 1;
        self.metrics.take();
    }

    pub fn flight_id(&self) -> FlightId {
        self.flight
    }

    /// Indices of the copied fixes within the owning flight (end exclusive).
    pub fn fix_range(&self) -> Range<usize> {
        self.fix_range.clone()
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    pub fn first_fix(&self) -> Option<&Fix> {
        self.fixes.first()
    }

    pub fn last_fix(&self) -> Option<&Fix> {
        self.fixes.last()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.first_fix().map(|fix| fix.timestamp)
    }
}

/// Arena owning every flight of a batch.
#[derive(Debug, Clone, Default)]
pub struct Logbook {
    flights: Vec<Flight>,
}

impl Logbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_flight(&mut self, flight: Flight) -> FlightId {
        self.flights.push(flight);
        FlightId(self.flights.len() - 1)
    }

    pub fn flight(&self, id: FlightId) -> Result<&Flight> {
        self.flights.get(id.0).ok_or(ThermalError::UnknownFlight(id))
    }

    pub fn flight_mut(&mut self, id: FlightId) -> Result<&mut Flight> {
        self.flights.get_mut(id.0).ok_or(ThermalError::UnknownFlight(id))
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// All thermals detected so far, flight by flight.
    pub fn thermals(&self) -> impl Iterator<Item = &Thermal> {
        self.flights.iter().flat_map(|flight| flight.thermals())
    }

    pub fn thermal_count(&self) -> usize {
        self.flights.iter().map(|flight| flight.thermals().len()).sum()
    }
}
