//! Flight path implementations for synthetic glider tracks.

use thermal_core::spatial::normalize_heading_deg;
use thermal_core::GeoPoint;

/// Trait for flight path implementations.
pub trait FlightPath: Send + Sync {
    /// Get (lat, lon, altitude_m) at time t seconds from the start of this path.
    fn get_position(&self, t: f64) -> (f64, f64, f64);

    /// Seconds this path lasts.
    fn duration(&self) -> f64;

    /// Where the path leaves off, used to chain the next leg.
    fn end_position(&self) -> (GeoPoint, f64) {
        let (lat, lon, alt) = self.get_position(self.duration());
        (GeoPoint::new(lat, lon), alt)
    }
}

/// Circling climb whose center drifts downwind.
pub struct ThermallingPath {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub entry_altitude_m: f64,
    pub speed_mps: f64,
    pub climb_rate_mps: f64,
    pub wind_heading_deg: f64,
    pub wind_speed_mps: f64,
    pub clockwise: bool,
    duration: f64,
}

impl ThermallingPath {
    /// Create a thermalling path entered at `entry`.
    ///
    /// # Arguments
    /// * `entry` - Position where circling starts; the first circle is north of it
    /// * `entry_altitude_m` - Altitude at entry
    /// * `radius_m` - Circle radius in meters
    /// * `speed_mps` - Airspeed while circling
    /// * `climb_rate_mps` - Vertical speed, constant for the whole climb
    /// * `wind_heading_deg` - Direction the wind blows towards
    /// * `wind_speed_mps` - Drift speed of the circle center
    /// * `duration` - Seconds spent circling
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entry: GeoPoint,
        entry_altitude_m: f64,
        radius_m: f64,
        speed_mps: f64,
        climb_rate_mps: f64,
        wind_heading_deg: f64,
        wind_speed_mps: f64,
        duration: f64,
    ) -> Self {
        Self {
            center: entry.travel(0.0, radius_m),
            radius_m,
            entry_altitude_m,
            speed_mps,
            climb_rate_mps,
            wind_heading_deg,
            wind_speed_mps,
            clockwise: true,
            duration: duration.max(0.0),
        }
    }

    /// Seconds for one full circle.
    pub fn period(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius_m / self.speed_mps
    }
}

impl FlightPath for ThermallingPath {
    fn get_position(&self, t: f64) -> (f64, f64, f64) {
        let t = t.clamp(0.0, self.duration);
        let drifted = self
            .center
            .travel(self.wind_heading_deg, self.wind_speed_mps * t);

        let swept_deg = (self.speed_mps * t / self.radius_m).to_degrees();
        let bearing = if self.clockwise {
            180.0 + swept_deg
        } else {
            180.0 - swept_deg
        };
        let position = drifted.travel(normalize_heading_deg(bearing), self.radius_m);

        (
            position.lat,
            position.lon,
            self.entry_altitude_m + self.climb_rate_mps * t,
        )
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}

/// Straight glide at constant speed and sink.
///
/// A negative sink rate gives a straight climb, as in wave or ridge lift.
pub struct GlidePath {
    pub start: GeoPoint,
    pub start_altitude_m: f64,
    pub heading_deg: f64,
    pub speed_mps: f64,
    pub sink_rate_mps: f64,
    duration: f64,
}

impl GlidePath {
    pub fn new(
        start: GeoPoint,
        start_altitude_m: f64,
        heading_deg: f64,
        speed_mps: f64,
        sink_rate_mps: f64,
        duration: f64,
    ) -> Self {
        Self {
            start,
            start_altitude_m,
            heading_deg: normalize_heading_deg(heading_deg),
            speed_mps,
            sink_rate_mps,
            duration: duration.max(0.0),
        }
    }
}

impl FlightPath for GlidePath {
    fn get_position(&self, t: f64) -> (f64, f64, f64) {
        let t = t.clamp(0.0, self.duration);
        let position = self.start.travel(self.heading_deg, self.speed_mps * t);
        (
            position.lat,
            position.lon,
            self.start_altitude_m - self.sink_rate_mps * t,
        )
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glide_path_start_and_end() {
        let start = GeoPoint::new(45.5, 6.3);
        let path = GlidePath::new(start, 1500.0, 90.0, 25.0, 1.0, 120.0);

        let (lat, lon, alt) = path.get_position(0.0);
        assert!((lat - 45.5).abs() < 1e-9);
        assert!((lon - 6.3).abs() < 1e-9);
        assert!((alt - 1500.0).abs() < 1e-9);

        let (end, end_alt) = path.end_position();
        assert!((start.distance_to(&end) - 3000.0).abs() < 1.0);
        assert!((end_alt - 1380.0).abs() < 1e-9);
    }

    #[test]
    fn test_glide_path_clamps_past_end() {
        let path = GlidePath::new(GeoPoint::new(45.5, 6.3), 1500.0, 0.0, 25.0, 1.0, 60.0);
        assert_eq!(path.get_position(600.0), path.get_position(60.0));
    }

    #[test]
    fn test_thermalling_path_starts_at_entry() {
        let entry = GeoPoint::new(46.0, 7.0);
        let path = ThermallingPath::new(entry, 900.0, 80.0, 22.0, 2.5, 90.0, 4.0, 300.0);

        let (lat, lon, alt) = path.get_position(0.0);
        assert!(entry.distance_to(&GeoPoint::new(lat, lon)) < 0.01);
        assert!((alt - 900.0).abs() < 1e-9);
        assert!((path.center.distance_to(&entry) - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_thermalling_path_drifts_downwind() {
        let entry = GeoPoint::new(46.0, 7.0);
        let path = ThermallingPath::new(entry, 900.0, 80.0, 22.0, 2.5, 90.0, 4.0, 300.0);

        // after a whole number of circles the glider is back at the entry bearing
        let t = path.period() * 5.0;
        let (lat, lon, alt) = path.get_position(t);
        let position = GeoPoint::new(lat, lon);

        assert!((entry.distance_to(&position) - 4.0 * t).abs() < 1.0);
        assert!((entry.bearing_to(&position) - 90.0).abs() < 1.0);
        assert!((alt - (900.0 + 2.5 * t)).abs() < 1e-9);
    }

    #[test]
    fn test_thermalling_path_stays_on_circle() {
        let path = ThermallingPath::new(GeoPoint::new(46.0, 7.0), 900.0, 80.0, 22.0, 2.0, 0.0, 0.0, 120.0);
        for step in 0..24 {
            let (lat, lon, _) = path.get_position(step as f64 * 5.0);
            let radius = path.center.distance_to(&GeoPoint::new(lat, lon));
            assert!((radius - 80.0).abs() < 0.01);
        }
    }
}
