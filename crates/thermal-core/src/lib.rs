pub mod categorize;
pub mod detector;
pub mod error;
pub mod metrics;
pub mod models;
pub mod report;
pub mod rules;
pub mod sampling;
pub mod sortable;
pub mod spatial;

pub use categorize::{
    compare_keyed, CategoryFactory, CategoryForest, CategoryId, Categorizer, CountingTitles,
    KeyedThermal, ThermalCategory,
};
pub use detector::{DetectionSummary, ThermalDetector};
pub use error::ThermalError;
pub use metrics::{DriftVector, ThermalMetrics};
pub use models::{Fix, Flight, FlightId, Logbook, Thermal};
pub use report::{CategoryReport, PathPoint, ThermalReport};
pub use rules::{CategoryRules, DetectionRules, CLIMB_BRACKET_INTERVAL, STRENGTH_BRACKET_INTERVAL};
pub use sortable::{bracket_round, SortableValue, SortingField};
pub use spatial::{haversine_distance, GeoPoint};
