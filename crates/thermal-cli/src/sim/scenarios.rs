//! Pre-defined glider flights for testing.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thermal_core::{Fix, Flight, GeoPoint};

use super::paths::{GlidePath, ThermallingPath};
use super::FlightPath;

/// A named flight made of consecutive legs.
pub struct Scenario {
    pub name: String,
    pub pilot: String,
    pub glider: String,
    pub legs: Vec<Arc<dyn FlightPath>>,
}

impl Scenario {
    /// Total seconds across all legs.
    pub fn duration(&self) -> f64 {
        self.legs.iter().map(|leg| leg.duration()).sum()
    }

    /// Position `t` seconds after takeoff. Past the end, the last position.
    pub fn position_at(&self, t: f64) -> Option<(f64, f64, f64)> {
        let mut offset = 0.0;
        for leg in &self.legs {
            if t <= offset + leg.duration() {
                return Some(leg.get_position(t - offset));
            }
            offset += leg.duration();
        }
        self.legs.last().map(|leg| leg.get_position(leg.duration()))
    }

    /// Sample a fix every `interval_s` seconds, starting at `start`.
    pub fn sample(&self, start: DateTime<Utc>, interval_s: f64) -> Flight {
        self.sample_with(start, interval_s, |lat, lon| (lat, lon))
    }

    /// Like [`Scenario::sample`], moving each position up to `jitter_m`
    /// meters in a random direction.
    pub fn sample_with_jitter<R: Rng>(
        &self,
        start: DateTime<Utc>,
        interval_s: f64,
        rng: &mut R,
        jitter_m: f64,
    ) -> Flight {
        if jitter_m <= 0.0 {
            return self.sample(start, interval_s);
        }
        self.sample_with(start, interval_s, |lat, lon| {
            let moved = GeoPoint::new(lat, lon).travel(
                rng.random_range(0.0..360.0),
                rng.random_range(0.0..jitter_m),
            );
            (moved.lat, moved.lon)
        })
    }

    fn sample_with<F>(&self, start: DateTime<Utc>, interval_s: f64, mut place: F) -> Flight
    where
        F: FnMut(f64, f64) -> (f64, f64),
    {
        let flight = Flight::new(start.date_naive(), self.pilot.as_str(), self.glider.as_str());
        if interval_s <= 0.0 {
            return flight;
        }

        let count = (self.duration() / interval_s).floor() as usize + 1;
        let fixes = (0..count)
            .filter_map(|k| {
                let t = k as f64 * interval_s;
                let (lat, lon, alt) = self.position_at(t)?;
                let (lat, lon) = place(lat, lon);
                let timestamp = start + Duration::milliseconds((t * 1000.0).round() as i64);
                Some(Fix::new(lat, lon, alt, timestamp))
            })
            .collect();
        flight.with_fixes(fixes)
    }
}

/// Straight climb in wave lift: 1 m/s up at 5 m/s over the ground for five minutes.
pub fn create_wave_climb_scenario(start: GeoPoint) -> Scenario {
    let climb: Arc<dyn FlightPath> = Arc::new(GlidePath::new(start, 800.0, 90.0, 5.0, -1.0, 300.0));

    Scenario {
        name: "wave-climb".to_string(),
        pilot: "Sim Pilot".to_string(),
        glider: "Duo Discus".to_string(),
        legs: vec![climb],
    }
}

/// Glide, thermal, glide, thermal, glide, eastbound with a westerly wind.
///
/// - Thermal 1: 6 minutes at 2.5 m/s (900 m)
/// - Thermal 2: 5 minutes at 1.5 m/s (450 m)
pub fn create_cross_country_scenario(start: GeoPoint) -> Scenario {
    let heading = 90.0;
    let (wind_heading, wind_speed) = (90.0, 4.0);
    let mut legs: Vec<Arc<dyn FlightPath>> = Vec::new();

    let glide_1 = GlidePath::new(start, 1200.0, heading, 25.0, 1.0, 180.0);
    let (point, alt) = glide_1.end_position();
    legs.push(Arc::new(glide_1));

    let thermal_1 = ThermallingPath::new(point, alt, 80.0, 22.0, 2.5, wind_heading, wind_speed, 360.0);
    let (point, alt) = thermal_1.end_position();
    legs.push(Arc::new(thermal_1));

    let glide_2 = GlidePath::new(point, alt, heading, 25.0, 1.0, 240.0);
    let (point, alt) = glide_2.end_position();
    legs.push(Arc::new(glide_2));

    let thermal_2 = ThermallingPath::new(point, alt, 80.0, 22.0, 1.5, wind_heading, wind_speed, 300.0);
    let (point, alt) = thermal_2.end_position();
    legs.push(Arc::new(thermal_2));

    legs.push(Arc::new(GlidePath::new(point, alt, heading, 25.0, 1.0, 180.0)));

    Scenario {
        name: "cross-country".to_string(),
        pilot: "Sim Pilot".to_string(),
        glider: "LS4".to_string(),
        legs,
    }
}

/// Ten minute straight glide home, no lift.
pub fn create_final_glide_scenario(start: GeoPoint) -> Scenario {
    let glide: Arc<dyn FlightPath> = Arc::new(GlidePath::new(start, 1400.0, 225.0, 30.0, 1.2, 600.0));

    Scenario {
        name: "final-glide".to_string(),
        pilot: "Sim Pilot".to_string(),
        glider: "Ventus 2c".to_string(),
        legs: vec![glide],
    }
}
