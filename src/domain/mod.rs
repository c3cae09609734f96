//! Domain records: fleet vehicles and scenario trajectories.

pub mod scenario;
pub mod vehicle;

use std::collections::BTreeMap;

pub use scenario::{ChargerRates, RESIDUAL_CURVE_LEN, ResidualCurve, Scenario, ScenarioSet, ScenarioYear};
pub use vehicle::{EXAMPLE_PLATE, ElectricityType, FuelType, Vehicle, VehicleCategory};

/// Fleet keyed by number plate.
pub type Fleet = BTreeMap<String, Vehicle>;
