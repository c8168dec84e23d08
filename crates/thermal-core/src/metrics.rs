//! Per-thermal metrics and the linear drift model.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThermalError};
use crate::models::{Fix, Thermal};
use crate::spatial::GeoPoint;

/// Values derived from a thermal's fixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalMetrics {
    /// Time of day of the first fix
    pub label: String,
    pub min_altitude_m: f64,
    pub max_altitude_m: f64,
    /// Height between the lowest and highest fix
    pub total_climb_m: f64,
    /// Height gained per second between the lowest and highest fix
    pub average_climb_rate_mps: f64,
}

impl ThermalMetrics {
    fn compute(fixes: &[Fix]) -> Result<Self> {
        let first = fixes.first().ok_or(ThermalError::EmptyThermal)?;

        let mut lowest = first;
        let mut highest = first;
        for fix in fixes {
            if fix.altitude_m < lowest.altitude_m {
                lowest = fix;
            }
            if fix.altitude_m > highest.altitude_m {
                highest = fix;
            }
        }

        let total_climb_m = highest.altitude_m - lowest.altitude_m;
        // unsigned: a run whose peak precedes its low point still reports a positive rate
        let elapsed_s = highest.seconds_since(lowest).abs();
        let average_climb_rate_mps = if elapsed_s > 0.0 {
            total_climb_m / elapsed_s
        } else {
            0.0
        };

        Ok(Self {
            label: first.label(),
            min_altitude_m: lowest.altitude_m,
            max_altitude_m: highest.altitude_m,
            total_climb_m,
            average_climb_rate_mps,
        })
    }
}

/// Lateral displacement of a thermal per meter of altitude gained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftVector {
    /// Meters of lateral drift per meter of altitude
    pub magnitude: f64,
    /// Direction of drift in degrees, `[0, 360)`
    pub heading_deg: f64,
}

impl DriftVector {
    /// Position on the thermal's axis at `altitude_m`, starting from `base`.
    pub fn extrapolate(&self, base: &Fix, altitude_m: f64) -> GeoPoint {
        let mut lateral_m = self.magnitude * (altitude_m - base.altitude_m);
        let mut heading_deg = self.heading_deg;
        if lateral_m < 0.0 {
            lateral_m = -lateral_m;
            heading_deg = (heading_deg + 180.0) % 360.0;
        }
        base.position().travel(heading_deg, lateral_m)
    }
}

impl Thermal {
    /// Derived metrics, computed on first use and kept until a fix is added.
    pub fn metrics(&self) -> Result<&ThermalMetrics> {
        if let Some(metrics) = self.metrics.get() {
            return Ok(metrics);
        }
        let computed = ThermalMetrics::compute(self.fixes())?;
        Ok(self.metrics.get_or_init(|| computed))
    }

    pub fn label(&self) -> Result<&str> {
        self.metrics().map(|m| m.label.as_str())
    }

    pub fn total_climb(&self) -> Result<f64> {
        self.metrics().map(|m| m.total_climb_m)
    }

    pub fn average_climb_rate(&self) -> Result<f64> {
        self.metrics().map(|m| m.average_climb_rate_mps)
    }

    /// Drift from the first to the last fix.
    ///
    /// Fails with [`ThermalError::FlatThermal`] when both fixes sit at the
    /// same altitude.
    pub fn drift(&self) -> Result<DriftVector> {
        let (first, last) = self.bounds()?;
        let altitude_delta = last.altitude_m - first.altitude_m;
        if altitude_delta.abs() <= f64::EPSILON {
            return Err(ThermalError::FlatThermal);
        }

        let (from, to) = (first.position(), last.position());
        Ok(DriftVector {
            magnitude: to.distance_to(&from) / altitude_delta,
            heading_deg: from.bearing_to(&to),
        })
    }

    /// Where the thermal's axis crosses `altitude_m`.
    pub fn extrapolate_to(&self, altitude_m: f64) -> Result<GeoPoint> {
        let drift = self.drift()?;
        let (first, _) = self.bounds()?;
        Ok(drift.extrapolate(first, altitude_m))
    }

    /// Where the thermal's axis meets sea level.
    pub fn ground_position(&self) -> Result<GeoPoint> {
        self.extrapolate_to(0.0)
    }

    /// Where the thermal's axis reaches the last fix's altitude.
    pub fn highest_point(&self) -> Result<GeoPoint> {
        let (_, last) = self.bounds()?;
        self.extrapolate_to(last.altitude_m)
    }

    fn bounds(&self) -> Result<(&Fix, &Fix)> {
        match (self.first_fix(), self.last_fix()) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(ThermalError::EmptyThermal),
        }
    }
}
