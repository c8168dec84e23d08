//! Serializable views of analysed thermals and category trees for exporters.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::categorize::{CategoryForest, CategoryId, ThermalCategory};
use crate::error::{Result, ThermalError};
use crate::metrics::DriftVector;
use crate::models::{Logbook, Thermal};
use crate::sortable::SortingField;
use crate::spatial::GeoPoint;

/// A point of the thermal's path, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

/// Everything an exporter needs about one thermal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalReport {
    pub label: String,
    pub pilot: String,
    pub glider: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub min_altitude_m: f64,
    pub max_altitude_m: f64,
    pub total_climb_m: f64,
    pub average_climb_rate_mps: f64,
    /// Absent for thermals whose first and last fix share an altitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift: Option<DriftVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_position: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_point: Option<GeoPoint>,
    pub path: Vec<PathPoint>,
}

impl ThermalReport {
    pub fn from_thermal(logbook: &Logbook, thermal: &Thermal) -> Result<Self> {
        let flight = logbook.flight(thermal.flight_id())?;
        let metrics = thermal.metrics()?;
        let start_time = thermal.start_time().ok_or(ThermalError::EmptyThermal)?;

        let (drift, ground_position, highest_point) = match thermal.drift() {
            Ok(drift) => (
                Some(drift),
                Some(thermal.ground_position()?),
                Some(thermal.highest_point()?),
            ),
            Err(ThermalError::FlatThermal) => {
                debug!(label = %metrics.label, "flat thermal, no drift axis");
                (None, None, None)
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            label: metrics.label.clone(),
            pilot: flight.pilot.clone(),
            glider: flight.airplane_id.clone(),
            date: flight.date,
            start_time,
            min_altitude_m: metrics.min_altitude_m,
            max_altitude_m: metrics.max_altitude_m,
            total_climb_m: metrics.total_climb_m,
            average_climb_rate_mps: metrics.average_climb_rate_mps,
            drift,
            ground_position,
            highest_point,
            path: thermal
                .fixes()
                .iter()
                .map(|fix| PathPoint {
                    lat: fix.lat,
                    lon: fix.lon,
                    altitude_m: fix.altitude_m,
                })
                .collect(),
        })
    }
}

/// One category with its thermals and sub-categories, ready to serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub field: SortingField,
    pub title: String,
    pub display_title: String,
    pub total_thermals: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub thermals: Vec<ThermalReport>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<CategoryReport>,
}

impl CategoryReport {
    /// Reports for every root of `forest`, using each handle as display title.
    pub fn from_forest<H: Display>(
        logbook: &Logbook,
        forest: &CategoryForest<H>,
    ) -> Result<Vec<CategoryReport>> {
        forest
            .roots()
            .iter()
            .filter_map(|root| forest.category(*root).map(|category| (*root, category)))
            .map(|(id, category)| Self::from_category(logbook, forest, id, category))
            .collect()
    }

    fn from_category<H: Display>(
        logbook: &Logbook,
        forest: &CategoryForest<H>,
        id: CategoryId,
        category: &ThermalCategory<H>,
    ) -> Result<CategoryReport> {
        Ok(CategoryReport {
            field: category.field,
            title: category.title.clone(),
            display_title: category.handle.to_string(),
            total_thermals: forest.total_thermals(id),
            thermals: category
                .thermals()
                .iter()
                .map(|thermal| ThermalReport::from_thermal(logbook, thermal))
                .collect::<Result<_>>()?,
            children: category
                .children()
                .iter()
                .filter_map(|child| forest.category(*child).map(|c| (*child, c)))
                .map(|(child, c)| Self::from_category(logbook, forest, child, c))
                .collect::<Result<_>>()?,
        })
    }
}
