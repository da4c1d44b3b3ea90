//! Scenario setup: map, fleet, passengers and planner settings.

mod build;
mod params;

pub use build::{
    build_graph, build_world, default_taxi_map, random_destination, random_passengers,
    random_taxi_locations, DEFAULT_TAXI_MAP,
};
pub use params::{PassengerPlacement, ScenarioParams, DEFAULT_DEVIATION_BUDGET, DEFAULT_SEED};
