//! Built-in demo data: a small mixed fleet and synthetic `laag`/`midden`/`hoog`
//! scenario trajectories for every vehicle category.
//!
//! The numbers are deterministic and chosen to exercise every strategy branch,
//! not to forecast anything.

use std::collections::BTreeMap;

use crate::domain::{
    ChargerRates, ElectricityType, EXAMPLE_PLATE, Fleet, FuelType, ResidualCurve, Scenario,
    ScenarioSet, ScenarioYear, Vehicle, VehicleCategory,
};
use crate::oracle::sheet::CategoryTables;

/// Scenario types, from least to most favourable for electric vehicles.
pub const SCENARIO_TYPES: [&str; 3] = ["laag", "midden", "hoog"];

pub const DEMO_FIRST_YEAR: i32 = 2024;

/// Years per demo trajectory; covers `year + lifespan` lookups of a full run.
pub const DEMO_YEARS: usize = 30;

/// A vehicle with category-typical usage and no zone restrictions.
///
/// # Examples
///
/// ```
/// use fleet_tco::domain::VehicleCategory;
/// use fleet_tco::presets::demo_vehicle;
///
/// let van = demo_vehicle("VN-01", VehicleCategory::SmallVan, 2021);
/// assert_eq!(van.technological_lifespan, 7);
/// ```
pub fn demo_vehicle(plate: &str, category: VehicleCategory, year_of_purchase: i32) -> Vehicle {
    let (yearly_km, daily_km) = match category {
        VehicleCategory::SmallVan | VehicleCategory::MediumVan => (25_000.0, 150.0),
        VehicleCategory::MediumLuxuryVan | VehicleCategory::LargeVan => (30_000.0, 180.0),
        VehicleCategory::SmallRigidTruck => (40_000.0, 200.0),
        VehicleCategory::LargeRigidTruck => (50_000.0, 250.0),
        VehicleCategory::TractorTrailer => (80_000.0, 400.0),
    };
    Vehicle {
        number_plate: plate.to_string(),
        category,
        fuel_type: FuelType::Diesel,
        euronorm: 6,
        year_of_purchase,
        is_cooled: false,
        pto_fuel_consumption: 0.0,
        expected_total_distance_traveled_in_km: yearly_km,
        maximum_daily_distance_in_km: daily_km,
        amount_of_operational_days: 250,
        drives_in_future_ze_zone: false,
        technological_lifespan: 7,
        loading_times: "nacht".to_string(),
        charging_time_depot: 10,
        charging_time_public: 1,
        electricity_type: ElectricityType::Grey,
    }
}

/// The demo fleet, keyed by number plate, including the template example row.
pub fn demo_fleet() -> Fleet {
    let vehicles = [
        demo_vehicle(EXAMPLE_PLATE, VehicleCategory::SmallVan, 2020),
        Vehicle {
            drives_in_future_ze_zone: true,
            is_cooled: true,
            ..demo_vehicle("12-ABC-3", VehicleCategory::SmallRigidTruck, 2019)
        },
        Vehicle {
            euronorm: 5,
            drives_in_future_ze_zone: true,
            ..demo_vehicle("VN-204-K", VehicleCategory::LargeVan, 2018)
        },
        Vehicle {
            fuel_type: FuelType::Lng,
            technological_lifespan: 8,
            ..demo_vehicle("BXL-55-T", VehicleCategory::TractorTrailer, 2018)
        },
        Vehicle {
            fuel_type: FuelType::Electric,
            electricity_type: ElectricityType::Green,
            ..demo_vehicle("EV-77-BB", VehicleCategory::MediumVan, 2023)
        },
        demo_vehicle("TR-908-X", VehicleCategory::LargeRigidTruck, 2017),
    ];
    vehicles
        .into_iter()
        .map(|v| (v.number_plate.clone(), v))
        .collect()
}

/// One synthetic scenario year for `category`.
///
/// Unknown scenario types fall back to `midden`.
pub fn scenario_year(category: VehicleCategory, scenario_type: &str, year: i32) -> ScenarioYear {
    let level = SCENARIO_TYPES
        .iter()
        .position(|t| *t == scenario_type)
        .unwrap_or(1) as f64;
    let t = f64::from((year - DEMO_FIRST_YEAR).max(0));
    let tables = CategoryTables::default();
    let i = category.index();
    let is_van = i < VehicleCategory::SmallRigidTruck.index();

    ScenarioYear {
        year,
        diesel_price_in_euro: tables.diesel_price[i] * 1.02_f64.powf(t),
        electric_price_in_euro: tables.ev_price[i] * (1.0 - (0.03 + 0.02 * level)).powf(t),
        capacity_in_kwh: tables.battery_capacity_kwh[i] * 1.03_f64.powf(t),
        repair_costs_ev_euro_per_year: (5000.0 - 150.0 * t).max(2500.0),
        maintenance_costs_ev_euro_per_km: 0.05,
        maintenance_costs_diesel_euro_per_km: 0.08,
        standstill_ev_in_days: (5.0 - 0.4 * t).max(1.0),
        subsidies_ev_in_euro: if year < 2030 { 5000.0 * (1.0 + level) } else { 0.0 },
        co2_price_in_euro_per_ton: 100.0 + 10.0 * t * (1.0 + level),
        efficiency_diesel_in_liter_per_km: tables.diesel_efficiency_l_per_km[i],
        efficiency_electricity_in_kwh_per_km: tables.ev_efficiency_kwh_per_km[i] * 0.99_f64.powf(t),
        electricity_price_private_in_euro_per_kwh: 0.22 - 0.005 * level,
        electricity_price_public_in_euro_per_kwh: (0.49 - 0.01 * t).max(0.35),
        gross_purchase_cost_charging_system_in_euro: if is_van { 3000.0 } else { 15000.0 },
        gross_installation_cost_charging_system_in_euro: if is_van { 1500.0 } else { 5000.0 },
        fuel_price_diesel_excluding_tax_in_euro_per_liter: 1.45 + 0.03 * t * (1.0 + level),
        change_in_excise_duty_diesel_in_percentage: 0.01 * level,
        vehicle_tax_diesel_in_euro_per_year: if is_van { 450.0 } else { 900.0 },
        vehicle_tax_electric_in_euro_per_year: if year < 2030 { 0.0 } else { 450.0 },
        mia_in_euro_per_lifespan: 8000.0,
        vamil_in_euro_per_lifespan: 3000.0,
        energy_subsidy_in_euro_per_kwh: 0.0,
        fixed_ze_vehicle_tax_in_euro_per_year: 3000.0 + 500.0 * level,
        difference_truck_toll_tax_in_euro_per_km: if is_van { 0.0 } else { 0.15 },
        subsidy_charging_system_installation_in_euro_per_installation: 1000.0,
        residual_value_ev: ResidualCurve::linear(0.75, 0.05),
        residual_value_diesel: ResidualCurve::linear(0.8, 0.05),
        charging_capacity_external_charging_pole: 150.0,
        charging_capacity_charging_pole_on_depot: if is_van { 11.0 } else { 44.0 },
        needed_charging_capacity_depot: if is_van { 11.0 } else { 44.0 },
        needed_charging_capacity_in_transit: 150.0,
        charger_rates: ChargerRates {
            ac37_at_home: 0.22,
            ac10_in_transit: 0.39,
            ac20_in_transit: 0.39,
            ac20_at_home: 0.22,
            fc50_in_transit: 0.59,
            fc50_at_home: 0.30,
            hpc150_in_transit: 0.69,
            hpc150_at_home: 0.35,
            hpc350_in_transit: 0.79,
            hpc350_at_home: 0.40,
        },
    }
}

/// A `count`-year trajectory for one scenario type and category.
pub fn demo_scenario(scenario_type: &str, category: VehicleCategory, first_year: i32, count: usize) -> Scenario {
    let years: BTreeMap<i32, ScenarioYear> = (first_year..)
        .take(count)
        .map(|year| (year, scenario_year(category, scenario_type, year)))
        .collect();
    Scenario {
        name: format!("{scenario_type} {}", category.scenario_key()),
        scenario_type: scenario_type.to_string(),
        vehicle_type: category.scenario_key(),
        years,
    }
}

/// All scenario types for all categories, starting in `first_year`.
pub fn demo_scenarios(first_year: i32) -> ScenarioSet {
    let mut set = ScenarioSet::new();
    for scenario_type in SCENARIO_TYPES {
        for category in VehicleCategory::ALL {
            set.insert(scenario_type, demo_scenario(scenario_type, category, first_year, DEMO_YEARS));
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scenarios_cover_every_category() {
        let set = demo_scenarios(DEMO_FIRST_YEAR);
        for scenario_type in SCENARIO_TYPES {
            for category in VehicleCategory::ALL {
                let s = set.get(scenario_type, category).unwrap();
                assert_eq!(s.years.len(), DEMO_YEARS);
            }
        }
        assert!(set.validate().is_empty());
    }

    #[test]
    fn demo_fleet_is_valid_and_holds_the_example_row() {
        let fleet = demo_fleet();
        assert!(fleet.contains_key(EXAMPLE_PLATE));
        for vehicle in fleet.values() {
            assert!(vehicle.validate(2026).is_empty(), "{}", vehicle.number_plate);
        }
    }

    #[test]
    fn higher_scenarios_make_electric_cheaper() {
        let laag = scenario_year(VehicleCategory::LargeVan, "laag", 2030);
        let hoog = scenario_year(VehicleCategory::LargeVan, "hoog", 2030);
        assert!(hoog.electric_price_in_euro < laag.electric_price_in_euro);
        assert!(hoog.fuel_price_diesel_excluding_tax_in_euro_per_liter > laag.fuel_price_diesel_excluding_tax_in_euro_per_liter);
    }
}
