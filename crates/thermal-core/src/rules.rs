//! Thresholds and grouping rules for thermal analysis.

use serde::{Deserialize, Serialize};

use crate::sortable::SortingField;

/// Width, in m/s, of a thermal strength bucket.
pub const STRENGTH_BRACKET_INTERVAL: f64 = 0.5;
/// Width, in meters, of a total-climb bucket.
pub const CLIMB_BRACKET_INTERVAL: f64 = 200.0;

/// Configuration for thermal detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRules {
    /// Maximum ground speed over a one-minute window while circling (m/s)
    pub max_speed_in_thermal_mps: f64,
    /// Minimum altitude gained over a whole thermal (meters)
    pub min_thermal_climb_distance_m: f64,
    /// Minimum climb rate (m/s), see [`DetectionRules::one_minute_climb_gain_threshold_m`]
    pub min_thermal_climb_rate_mps: f64,
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self {
            max_speed_in_thermal_mps: 17.0,
            min_thermal_climb_distance_m: 300.0,
            min_thermal_climb_rate_mps: 2.0, // ~400 fpm
        }
    }
}

impl DetectionRules {
    /// Altitude gain a one-minute window must exceed to count as climbing.
    ///
    /// The configured climb *rate* is compared directly against the raw
    /// altitude gap across one estimated minute of fixes, so a value of 2
    /// means "more than 2 meters per minute". Keep every consumer of that
    /// comparison behind this accessor so the units can be corrected in
    /// one place.
    pub fn one_minute_climb_gain_threshold_m(&self) -> f64 {
        self.min_thermal_climb_rate_mps
    }
}

/// Configuration for grouping detected thermals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRules {
    /// Grouping levels, outermost first
    pub sorting_fields: Vec<SortingField>,
    /// Bucket width for [`SortingField::ThermalStrength`]
    pub strength_bracket: f64,
    /// Bucket width for [`SortingField::ThermalClimb`]
    pub climb_bracket: f64,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            sorting_fields: vec![SortingField::ThermalStrength, SortingField::Month],
            strength_bracket: STRENGTH_BRACKET_INTERVAL,
            climb_bracket: CLIMB_BRACKET_INTERVAL,
        }
    }
}

impl CategoryRules {
    pub fn with_fields(sorting_fields: Vec<SortingField>) -> Self {
        Self {
            sorting_fields,
            ..Self::default()
        }
    }
}
