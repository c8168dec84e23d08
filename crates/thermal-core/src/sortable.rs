//! Sort and grouping keys derived from thermals.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Month};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThermalError};
use crate::models::{Flight, Thermal};
use crate::rules::CategoryRules;

/// A field thermals can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortingField {
    /// Calendar year of the first fix
    Year,
    /// Month of the first fix, ordered chronologically
    Month,
    /// Airplane identifier of the owning flight
    Glider,
    /// Average climb rate, bracketed
    ThermalStrength,
    /// Total height climbed, bracketed
    ThermalClimb,
}

impl SortingField {
    pub const ALL: [SortingField; 5] = [
        SortingField::Year,
        SortingField::Month,
        SortingField::Glider,
        SortingField::ThermalStrength,
        SortingField::ThermalClimb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortingField::Year => "year",
            SortingField::Month => "month",
            SortingField::Glider => "glider",
            SortingField::ThermalStrength => "thermal-strength",
            SortingField::ThermalClimb => "thermal-climb",
        }
    }

    /// Key of `thermal` for this field. `flight` must be the thermal's owner.
    pub fn value_of(
        &self,
        thermal: &Thermal,
        flight: &Flight,
        rules: &CategoryRules,
    ) -> Result<SortableValue> {
        let start = thermal.start_time().ok_or(ThermalError::EmptyThermal)?;
        let value = match self {
            SortingField::Year => SortableValue::numeric(f64::from(start.year()), 1.0),
            SortingField::Month => {
                let name = u8::try_from(start.month())
                    .ok()
                    .and_then(|m| Month::try_from(m).ok())
                    .map(|m| m.name().to_string())
                    .unwrap_or_default();
                SortableValue::labeled(f64::from(start.month0()), name)
            }
            SortingField::Glider => SortableValue::Text(flight.airplane_id.clone()),
            SortingField::ThermalStrength => {
                SortableValue::numeric(thermal.average_climb_rate()?, rules.strength_bracket)
            }
            SortingField::ThermalClimb => {
                SortableValue::numeric(thermal.total_climb()?, rules.climb_bracket)
            }
        };
        Ok(value)
    }
}

impl fmt::Display for SortingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortingField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "year" => Ok(SortingField::Year),
            "month" => Ok(SortingField::Month),
            "glider" | "airplane" => Ok(SortingField::Glider),
            "thermal-strength" | "strength" => Ok(SortingField::ThermalStrength),
            "thermal-climb" | "climb" => Ok(SortingField::ThermalClimb),
            _ => Err(format!(
                "unknown sorting field '{s}', expected one of: year, month, glider, thermal-strength, thermal-climb"
            )),
        }
    }
}

/// A comparable key with a display title.
///
/// Two values belong to the same category exactly when their titles match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortableValue {
    /// Compared lexicographically
    Text(String),
    /// Compared by `value`; `title` is what gets displayed
    Numeric {
        value: f64,
        interval: f64,
        title: String,
    },
}

impl SortableValue {
    /// `raw` rounded to the nearest multiple of `interval`.
    pub fn numeric(raw: f64, interval: f64) -> Self {
        let value = bracket_round(raw, interval);
        Self::Numeric {
            value,
            interval,
            title: format_bracket(value, interval),
        }
    }

    /// A number ordered as is but shown under its own title, such as a month.
    pub fn labeled(value: f64, title: impl Into<String>) -> Self {
        Self::Numeric {
            value,
            interval: 1.0,
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SortableValue::Text(text) => text,
            SortableValue::Numeric { title, .. } => title,
        }
    }

    pub fn same_category(&self, other: &SortableValue) -> bool {
        self.title() == other.title()
    }

    /// Total order: numbers by value, text lexicographically, numbers before text.
    pub fn compare(&self, other: &SortableValue) -> Ordering {
        match (self, other) {
            (SortableValue::Text(a), SortableValue::Text(b)) => a.cmp(b),
            (SortableValue::Numeric { value: a, .. }, SortableValue::Numeric { value: b, .. }) => {
                a.total_cmp(b)
            }
            (SortableValue::Numeric { .. }, SortableValue::Text(_)) => Ordering::Less,
            (SortableValue::Text(_), SortableValue::Numeric { .. }) => Ordering::Greater,
        }
    }
}

/// Round `raw` to the nearest multiple of `interval` (halves away from zero).
pub fn bracket_round(raw: f64, interval: f64) -> f64 {
    if interval <= 0.0 || !interval.is_finite() {
        return raw;
    }
    (raw / interval).round() * interval
}

/// Render a bracketed value with as many decimals as the interval needs.
fn format_bracket(value: f64, interval: f64) -> String {
    let mut decimals: usize = 0;
    let mut scaled = interval.abs();
    while decimals < 6 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    format!("{value:.decimals$}")
}
