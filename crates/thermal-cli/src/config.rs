//! Analysis configuration from environment.

use std::env;

use thermal_core::{CategoryRules, DetectionRules, SortingField};
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub detection: DetectionRules,
    pub categories: CategoryRules,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DetectionRules::default();
        let number = |key: &str, default: f64| {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        let detection = DetectionRules {
            max_speed_in_thermal_mps: number(
                "THERMAL_MAX_SPEED_MPS",
                defaults.max_speed_in_thermal_mps,
            ),
            min_thermal_climb_distance_m: number(
                "THERMAL_MIN_CLIMB_DISTANCE_M",
                defaults.min_thermal_climb_distance_m,
            ),
            min_thermal_climb_rate_mps: number(
                "THERMAL_MIN_CLIMB_RATE_MPS",
                defaults.min_thermal_climb_rate_mps,
            ),
        };

        let categories = match lookup("THERMAL_SORT_FIELDS").map(|s| parse_sort_fields(&s)) {
            Some(Ok(fields)) => CategoryRules::with_fields(fields),
            Some(Err(err)) => {
                warn!(error = %err, "ignoring THERMAL_SORT_FIELDS");
                CategoryRules::default()
            }
            None => CategoryRules::default(),
        };

        Self {
            detection,
            categories,
        }
    }

    /// Replace the sorting fields, e.g. from a command line flag.
    pub fn with_sort_fields(mut self, fields: Vec<SortingField>) -> Self {
        self.categories.sorting_fields = fields;
        self
    }
}

/// Parse a comma separated field list such as `year,month,thermal-strength`.
pub fn parse_sort_fields(list: &str) -> Result<Vec<SortingField>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<SortingField>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.detection.max_speed_in_thermal_mps, 17.0);
        assert_eq!(config.detection.min_thermal_climb_distance_m, 300.0);
        assert_eq!(config.detection.min_thermal_climb_rate_mps, 2.0);
        assert_eq!(
            config.categories.sorting_fields,
            vec![SortingField::ThermalStrength, SortingField::Month]
        );
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("THERMAL_MIN_CLIMB_DISTANCE_M", "150"),
            ("THERMAL_MAX_SPEED_MPS", "not a number"),
            ("THERMAL_SORT_FIELDS", "year, glider"),
        ]));
        assert_eq!(config.detection.min_thermal_climb_distance_m, 150.0);
        assert_eq!(config.detection.max_speed_in_thermal_mps, 17.0);
        assert_eq!(
            config.categories.sorting_fields,
            vec![SortingField::Year, SortingField::Glider]
        );
    }

    #[test]
    fn test_bad_sort_fields_keep_default() {
        let config = Config::from_lookup(lookup(&[("THERMAL_SORT_FIELDS", "year,altitude")]));
        assert_eq!(config.categories.sorting_fields.len(), 2);
        assert_eq!(config.categories.sorting_fields[0], SortingField::ThermalStrength);
    }

    #[test]
    fn test_parse_sort_fields_skips_blanks() {
        assert_eq!(
            parse_sort_fields("month,,thermal_climb"),
            Ok(vec![SortingField::Month, SortingField::ThermalClimb])
        );
    }
}
