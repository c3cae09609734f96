//! Macroeconomic scenarios: year-indexed parameter snapshots per vehicle category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TcoError;

use super::vehicle::VehicleCategory;

/// Number of ages covered by a residual-value curve.
pub const RESIDUAL_CURVE_LEN: usize = 15;

/// Residual value as a fraction of the purchase price, by vehicle age 1..=15.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidualCurve(pub [f64; RESIDUAL_CURVE_LEN]);

impl ResidualCurve {
    /// Fraction at `age` (1-based). `None` outside 1..=15.
    pub fn at(&self, age: u32) -> Option<f64> {
        let idx = usize::try_from(age).ok()?.checked_sub(1)?;
        self.0.get(idx).copied()
    }

    /// Straight-line curve from `first` at age 1 to `last` at age 15.
    pub fn linear(first: f64, last: f64) -> Self {
        let step = (first - last) / (RESIDUAL_CURVE_LEN - 1) as f64;
        let mut values = [0.0; RESIDUAL_CURVE_LEN];
        for (i, v) in values.iter_mut().enumerate() {
            *v = first - step * i as f64;
        }
        Self(values)
    }
}

/// One year of economic and technical parameters for one scenario and category.
///
/// Serialized names follow the scenario exchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioYear {
    pub year: i32,
    pub diesel_price_in_euro: f64,
    pub electric_price_in_euro: f64,
    #[serde(rename = "capacity_in_kWh")]
    pub capacity_in_kwh: f64,
    #[serde(rename = "repair_costs_EV_euro_per_year")]
    pub repair_costs_ev_euro_per_year: f64,
    #[serde(rename = "maintenance_costs_EV_euro_per_km")]
    pub maintenance_costs_ev_euro_per_km: f64,
    pub maintenance_costs_diesel_euro_per_km: f64,
    #[serde(rename = "standstil_EV_in_days")]
    pub standstill_ev_in_days: f64,
    #[serde(rename = "subsidies_EV_in_euro")]
    pub subsidies_ev_in_euro: f64,
    #[serde(rename = "CO2_price_in_euro_per_ton")]
    pub co2_price_in_euro_per_ton: f64,
    pub efficiency_diesel_in_liter_per_km: f64,
    #[serde(rename = "efficiency_electricity_in_kWh_per_km")]
    pub efficiency_electricity_in_kwh_per_km: f64,
    #[serde(rename = "electricity_price_private_excluding_tax_in_euro_per_kWh")]
    pub electricity_price_private_in_euro_per_kwh: f64,
    #[serde(rename = "electricity_price_public_excluding_tax_in_euro_per_kWh")]
    pub electricity_price_public_in_euro_per_kwh: f64,
    pub gross_purchase_cost_charging_system_in_euro: f64,
    pub gross_installation_cost_charging_system_in_euro: f64,
    pub fuel_price_diesel_excluding_tax_in_euro_per_liter: f64,
    pub change_in_excise_duty_diesel_in_percentage: f64,
    pub vehicle_tax_diesel_in_euro_per_year: f64,
    pub vehicle_tax_electric_in_euro_per_year: f64,
    #[serde(rename = "MIA_in_euro_per_lifespan")]
    pub mia_in_euro_per_lifespan: f64,
    #[serde(rename = "VAMIL_in_euro_per_lifespan")]
    pub vamil_in_euro_per_lifespan: f64,
    #[serde(rename = "energy_subsidy_in_euro_per_kWh")]
    pub energy_subsidy_in_euro_per_kwh: f64,
    #[serde(rename = "fixed_ZE_vehicle_tax_in_euro_per_year")]
    pub fixed_ze_vehicle_tax_in_euro_per_year: f64,
    pub difference_truck_toll_tax_in_euro_per_km: f64,
    pub subsidy_charging_system_installation_in_euro_per_installation: f64,
    #[serde(rename = "residual_value_EV_in_percentage")]
    pub residual_value_ev: ResidualCurve,
    #[serde(rename = "residual_value_diesel_in_percentage")]
    pub residual_value_diesel: ResidualCurve,
    pub charging_capacity_external_charging_pole: f64,
    pub charging_capacity_charging_pole_on_depot: f64,
    pub needed_charging_capacity_depot: f64,
    pub needed_charging_capacity_in_transit: f64,
    #[serde(flatten)]
    pub charger_rates: ChargerRates,
}

/// Cost rates per charger type, at the depot ("home") and in transit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargerRates {
    #[serde(rename = "AC37_at_home")]
    pub ac37_at_home: f64,
    #[serde(rename = "AC10_in_transit")]
    pub ac10_in_transit: f64,
    #[serde(rename = "AC20_in_transit")]
    pub ac20_in_transit: f64,
    #[serde(rename = "AC20_at_home")]
    pub ac20_at_home: f64,
    #[serde(rename = "FC50_in_transit")]
    pub fc50_in_transit: f64,
    #[serde(rename = "FC50_at_home")]
    pub fc50_at_home: f64,
    #[serde(rename = "HPC150_in_transit")]
    pub hpc150_in_transit: f64,
    #[serde(rename = "HPC150_at_home")]
    pub hpc150_at_home: f64,
    #[serde(rename = "HPC350_in_transit")]
    pub hpc350_in_transit: f64,
    #[serde(rename = "HPC350_at_home")]
    pub hpc350_at_home: f64,
}

impl ScenarioYear {
    fn scalar_fields(&self) -> [(&'static str, f64); 33] {
        let r = &self.charger_rates;
        [
            ("diesel_price_in_euro", self.diesel_price_in_euro),
            ("electric_price_in_euro", self.electric_price_in_euro),
            ("capacity_in_kWh", self.capacity_in_kwh),
            ("repair_costs_EV_euro_per_year", self.repair_costs_ev_euro_per_year),
            ("maintenance_costs_EV_euro_per_km", self.maintenance_costs_ev_euro_per_km),
            ("maintenance_costs_diesel_euro_per_km", self.maintenance_costs_diesel_euro_per_km),
            ("standstil_EV_in_days", self.standstill_ev_in_days),
            ("subsidies_EV_in_euro", self.subsidies_ev_in_euro),
            ("CO2_price_in_euro_per_ton", self.co2_price_in_euro_per_ton),
            ("efficiency_diesel_in_liter_per_km", self.efficiency_diesel_in_liter_per_km),
            ("efficiency_electricity_in_kWh_per_km", self.efficiency_electricity_in_kwh_per_km),
            ("electricity_price_private", self.electricity_price_private_in_euro_per_kwh),
            ("electricity_price_public", self.electricity_price_public_in_euro_per_kwh),
            ("gross_purchase_cost_charging_system_in_euro", self.gross_purchase_cost_charging_system_in_euro),
            ("gross_installation_cost_charging_system_in_euro", self.gross_installation_cost_charging_system_in_euro),
            ("fuel_price_diesel_excluding_tax_in_euro_per_liter", self.fuel_price_diesel_excluding_tax_in_euro_per_liter),
            ("change_in_excise_duty_diesel_in_percentage", self.change_in_excise_duty_diesel_in_percentage),
            ("vehicle_tax_diesel_in_euro_per_year", self.vehicle_tax_diesel_in_euro_per_year),
            ("vehicle_tax_electric_in_euro_per_year", self.vehicle_tax_electric_in_euro_per_year),
            ("MIA_in_euro_per_lifespan", self.mia_in_euro_per_lifespan),
            ("VAMIL_in_euro_per_lifespan", self.vamil_in_euro_per_lifespan),
            ("energy_subsidy_in_euro_per_kWh", self.energy_subsidy_in_euro_per_kwh),
            ("fixed_ZE_vehicle_tax_in_euro_per_year", self.fixed_ze_vehicle_tax_in_euro_per_year),
            ("difference_truck_toll_tax_in_euro_per_km", self.difference_truck_toll_tax_in_euro_per_km),
            ("subsidy_charging_system_installation", self.subsidy_charging_system_installation_in_euro_per_installation),
            ("charging_capacity_external_charging_pole", self.charging_capacity_external_charging_pole),
            ("charging_capacity_charging_pole_on_depot", self.charging_capacity_charging_pole_on_depot),
            ("needed_charging_capacity_depot", self.needed_charging_capacity_depot),
            ("needed_charging_capacity_in_transit", self.needed_charging_capacity_in_transit),
            ("AC37_at_home", r.ac37_at_home),
            ("AC10_in_transit", r.ac10_in_transit),
            ("FC50_in_transit", r.fc50_in_transit),
            ("HPC350_in_transit", r.hpc350_in_transit),
        ]
    }

    /// Returns one reason per non-finite or out-of-range value.
    pub fn validate(&self) -> Vec<String> {
        let mut reasons: Vec<String> = self
            .scalar_fields()
            .iter()
            .filter(|(_, v)| !v.is_finite())
            .map(|(name, v)| format!("{}: {name} is not a finite number ({v})", self.year))
            .collect();
        for (name, curve) in [
            ("residual_value_EV", &self.residual_value_ev),
            ("residual_value_diesel", &self.residual_value_diesel),
        ] {
            if curve.0.iter().any(|v| !v.is_finite() || *v < 0.0) {
                reasons.push(format!(
                    "{}: {name} must hold {RESIDUAL_CURVE_LEN} non-negative fractions",
                    self.year
                ));
            }
        }
        reasons
    }
}

/// A named trajectory for one vehicle category, ordered by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario type plus category, e.g. `"hoog N1"`.
    pub name: String,
    pub scenario_type: String,
    /// Category key (`index + 1`) this trajectory belongs to.
    pub vehicle_type: String,
    pub years: BTreeMap<i32, ScenarioYear>,
}

impl Scenario {
    /// Data for `year`, else the latest year before it, else the first year.
    ///
    /// # Errors
    ///
    /// [`TcoError::ComputationFailed`] when the scenario holds no years at all.
    pub fn at_or_nearest(&self, year: i32) -> Result<&ScenarioYear, TcoError> {
        self.years
            .range(..=year)
            .next_back()
            .or_else(|| self.years.iter().next())
            .map(|(_, data)| data)
            .ok_or_else(|| TcoError::ComputationFailed(format!("scenario {} has no years", self.name)))
    }

    /// The first `count` years in ascending order.
    pub fn first_years(&self, count: usize) -> impl Iterator<Item = (i32, &ScenarioYear)> {
        self.years.iter().take(count).map(|(y, data)| (*y, data))
    }

    pub fn validate(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        for (year, data) in &self.years {
            if *year != data.year {
                reasons.push(format!(
                    "{}: year key {year} does not match record year {}",
                    self.name, data.year
                ));
            }
            reasons.extend(data.validate().into_iter().map(|r| format!("{}: {r}", self.name)));
        }
        reasons
    }
}

/// All scenarios of a request: scenario name -> category key -> trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioSet {
    scenarios: BTreeMap<String, BTreeMap<String, Scenario>>,
}

impl ScenarioSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the trajectory of `scenario_name` for its category.
    pub fn insert(&mut self, scenario_name: &str, scenario: Scenario) {
        self.scenarios
            .entry(scenario_name.to_string())
            .or_default()
            .insert(scenario.vehicle_type.clone(), scenario);
    }

    pub fn contains(&self, scenario_name: &str) -> bool {
        self.scenarios.contains_key(scenario_name)
    }

    /// Scenario names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Looks up the trajectory of `scenario_name` for `category`.
    ///
    /// # Errors
    ///
    /// [`TcoError::NotFound`] when the scenario has no trajectory for the category.
    pub fn get(&self, scenario_name: &str, category: VehicleCategory) -> Result<&Scenario, TcoError> {
        let key = category.scenario_key();
        self.scenarios
            .get(scenario_name)
            .and_then(|by_category| by_category.get(&key))
            .ok_or_else(|| {
                TcoError::NotFound(format!(
                    "scenario \"{scenario_name}\" has no data for vehicle type {key} ({category})"
                ))
            })
    }

    pub fn validate(&self) -> Vec<String> {
        self.scenarios
            .values()
            .flat_map(|by_category| by_category.values())
            .flat_map(Scenario::validate)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn residual_curve_is_one_based() {
        let curve = ResidualCurve::linear(0.9, 0.2);
        assert_eq!(curve.at(0), None);
        assert!((curve.at(1).unwrap() - 0.9).abs() < 1e-12);
        assert!((curve.at(15).unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(curve.at(16), None);
    }

    #[test]
    fn first_years_is_a_hard_slice() {
        let scenario = fixtures::scenario(VehicleCategory::SmallRigidTruck, 2024, 20);
        let years: Vec<i32> = scenario.first_years(10).map(|(y, _)| y).collect();
        assert_eq!(years, (2024..2034).collect::<Vec<_>>());
    }

    #[test]
    fn nearest_year_clamps_to_available_data() {
        let scenario = fixtures::scenario(VehicleCategory::SmallRigidTruck, 2024, 5);
        assert_eq!(scenario.at_or_nearest(2026).unwrap().year, 2026);
        assert_eq!(scenario.at_or_nearest(2040).unwrap().year, 2028);
        assert_eq!(scenario.at_or_nearest(2010).unwrap().year, 2024);

        let empty = Scenario {
            years: BTreeMap::new(),
            ..scenario
        };
        assert!(matches!(empty.at_or_nearest(2024), Err(TcoError::ComputationFailed(_))));
    }

    #[test]
    fn set_lookup_uses_category_key() {
        let mut set = ScenarioSet::new();
        set.insert("midden", fixtures::scenario(VehicleCategory::SmallRigidTruck, 2024, 12));
        assert!(set.get("midden", VehicleCategory::SmallRigidTruck).is_ok());
        let err = set.get("midden", VehicleCategory::TractorTrailer).unwrap_err();
        assert!(matches!(err, TcoError::NotFound(_)));
        assert!(set.get("hoog", VehicleCategory::SmallRigidTruck).is_err());
    }

    #[test]
    fn validation_catches_nan_and_mismatched_year() {
        let mut scenario = fixtures::scenario(VehicleCategory::LargeVan, 2024, 3);
        if let Some(y) = scenario.years.get_mut(&2025) {
            y.diesel_price_in_euro = f64::NAN;
            y.year = 2031;
        }
        assert_eq!(scenario.validate().len(), 2);
    }

    #[test]
    fn json_round_trip_keeps_exchange_names() {
        let year = fixtures::scenario_year(2026);
        let json = serde_json::to_value(&year).unwrap();
        assert!(json.get("CO2_price_in_euro_per_ton").is_some());
        assert!(json.get("HPC350_at_home").is_some());
        assert_eq!(json["residual_value_EV_in_percentage"].as_array().map(Vec::len), Some(15));
        let back: ScenarioYear = serde_json::from_value(json).unwrap();
        assert_eq!(back, year);
    }
}
