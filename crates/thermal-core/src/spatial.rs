//! Spherical-earth geodesy used by the detector and the drift model.

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.lat, self.lon, other.lat, other.lon)
    }

    /// Initial bearing towards `other`, degrees in `[0, 360)`.
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        normalize_heading_deg(bearing(self.lat, self.lon, other.lat, other.lon).to_degrees())
    }

    /// Travel `distance_m` along `heading_deg` on a great circle.
    pub fn travel(&self, heading_deg: f64, distance_m: f64) -> GeoPoint {
        let (lat, lon) = offset_by_bearing(self.lat, self.lon, distance_m, heading_deg.to_radians());
        GeoPoint { lat, lon }
    }
}

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Calculate bearing from point 1 to point 2 in radians.
/// Returns bearing in radians, 0 = north, π/2 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Wrap a heading in degrees into `[0, 360)`.
pub fn normalize_heading_deg(heading_deg: f64) -> f64 {
    let wrapped = heading_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_distance(46.5, 8.0, 46.5, 8.0);
        assert!(dist < 0.001);
    }

    #[test]
    fn bearing_to_is_normalized() {
        let origin = GeoPoint::new(46.0, 8.0);
        let west = GeoPoint::new(46.0, 7.9);
        let heading = origin.bearing_to(&west);
        assert!((heading - 270.0).abs() < 0.1, "got {heading}");

        let north = GeoPoint::new(46.1, 8.0);
        assert!(origin.bearing_to(&north) < 0.001);
    }

    #[test]
    fn travel_then_measure_round_trips() {
        let origin = GeoPoint::new(-33.9, 151.2);
        let dest = origin.travel(135.0, 2_500.0);
        assert!((origin.distance_to(&dest) - 2_500.0).abs() < 0.01);
        assert!((origin.bearing_to(&dest) - 135.0).abs() < 0.01);
    }

    #[test]
    fn normalize_heading_wraps_both_directions() {
        assert_eq!(normalize_heading_deg(-90.0), 270.0);
        assert_eq!(normalize_heading_deg(450.0), 90.0);
        assert_eq!(normalize_heading_deg(0.0), 0.0);
    }
}
