//! Shared records for unit tests.

use crate::domain::{ElectricityType, Scenario, ScenarioYear, Vehicle, VehicleCategory};
use crate::presets;

/// Cooled diesel rigid truck bought in 2019 that drives in a future zone.
pub(crate) fn diesel_truck() -> Vehicle {
    Vehicle {
        is_cooled: true,
        expected_total_distance_traveled_in_km: 42_000.0,
        maximum_daily_distance_in_km: 220.0,
        amount_of_operational_days: 240,
        drives_in_future_ze_zone: true,
        electricity_type: ElectricityType::Green,
        ..presets::demo_vehicle("12-ABC-3", VehicleCategory::SmallRigidTruck, 2019)
    }
}

pub(crate) fn scenario_year(year: i32) -> ScenarioYear {
    presets::scenario_year(VehicleCategory::SmallRigidTruck, "midden", year)
}

pub(crate) fn scenario(category: VehicleCategory, first_year: i32, count: usize) -> Scenario {
    presets::demo_scenario("midden", category, first_year, count)
}
