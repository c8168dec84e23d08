//! Synthetic glider tracks for exercising the analysis end to end.

pub mod paths;
pub mod scenarios;

pub use paths::{FlightPath, GlidePath, ThermallingPath};
pub use scenarios::{
    create_cross_country_scenario, create_final_glide_scenario, create_wave_climb_scenario,
    Scenario,
};
