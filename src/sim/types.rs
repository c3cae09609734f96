//! Core simulation types: constants, per-year result records and series.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Number of scenario years every strategy simulates.
pub const SIMULATED_YEARS: usize = 10;

/// Constants shared by every strategy run of one request.
///
/// # Examples
///
/// ```
/// use fleet_tco::sim::types::SimConstants;
///
/// let c = SimConstants::for_year(2026);
/// assert_eq!(c.final_year, 2036);
/// assert_eq!(c.maintenance_factor(9, 7), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConstants {
    /// Years a fossil vehicle may be kept past its lifespan by waiting strategies.
    pub extra_years_after_lifespan: u32,
    /// Yearly multiplier on repair costs and downtime once past lifespan.
    pub increase_factor_after_lifespan: f64,
    /// Relative margin within which electric counts as cost-competitive.
    pub transition_margin: f64,
    /// Corporate tax rate applied to investment deductions.
    pub tax_percentage: f64,
    pub current_year: i32,
    pub final_year: i32,
}

impl SimConstants {
    /// Default constants with the horizon starting at `current_year`.
    pub fn for_year(current_year: i32) -> Self {
        Self {
            extra_years_after_lifespan: 3,
            increase_factor_after_lifespan: 2.0,
            transition_margin: 0.03,
            tax_percentage: 0.25,
            current_year,
            final_year: current_year + SIMULATED_YEARS as i32,
        }
    }

    /// Maintenance multiplier for a vehicle kept `age - lifespan` years past end of life.
    pub fn maintenance_factor(&self, age: i32, lifespan: i32) -> f64 {
        self.increase_factor_after_lifespan.powi(age - lifespan)
    }
}

/// Cost and emission figures of one vehicle in one simulated year.
///
/// Cost fields are whole euros, truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YearResult {
    pub tco: i64,
    pub fixed_vehicle_costs: i64,
    pub variable_vehicle_costs: i64,
    pub write_off_costs_vehicle: i64,
    pub write_off_costs_charging_system: i64,
    pub driver_costs: i64,
    pub costs_public_charging: i64,
    #[serde(rename = "CO2_emissions")]
    pub co2_emissions: f64,
    pub particulate_matter_emissions: f64,
    pub nitrogen_oxide_emissions: f64,
    #[serde(rename = "kWh_charged_on_depot")]
    pub kwh_charged_on_depot: f64,
    #[serde(rename = "kWh_charged_in_public")]
    pub kwh_charged_in_public: f64,
    pub charging_time_depot: f64,
    pub charging_time_public: f64,
    /// 0 until the vehicle has become electric, then the year it did.
    pub transition_year: i32,
}

impl YearResult {
    /// Field names in record order, matching the serialized form.
    pub const FIELDS: [&'static str; 15] = [
        "tco",
        "fixed_vehicle_costs",
        "variable_vehicle_costs",
        "write_off_costs_vehicle",
        "write_off_costs_charging_system",
        "driver_costs",
        "costs_public_charging",
        "CO2_emissions",
        "particulate_matter_emissions",
        "nitrogen_oxide_emissions",
        "kWh_charged_on_depot",
        "kWh_charged_in_public",
        "charging_time_depot",
        "charging_time_public",
        "transition_year",
    ];

    /// Values in [`Self::FIELDS`] order, widened to `f64`.
    pub fn values(&self) -> [f64; 15] {
        [
            self.tco as f64,
            self.fixed_vehicle_costs as f64,
            self.variable_vehicle_costs as f64,
            self.write_off_costs_vehicle as f64,
            self.write_off_costs_charging_system as f64,
            self.driver_costs as f64,
            self.costs_public_charging as f64,
            self.co2_emissions,
            self.particulate_matter_emissions,
            self.nitrogen_oxide_emissions,
            self.kwh_charged_on_depot,
            self.kwh_charged_in_public,
            self.charging_time_depot,
            self.charging_time_public,
            f64::from(self.transition_year),
        ]
    }

    pub fn has_transitioned(&self) -> bool {
        self.transition_year != 0
    }
}

impl AddAssign<&YearResult> for YearResult {
    fn add_assign(&mut self, rhs: &YearResult) {
        self.tco += rhs.tco;
        self.fixed_vehicle_costs += rhs.fixed_vehicle_costs;
        self.variable_vehicle_costs += rhs.variable_vehicle_costs;
        self.write_off_costs_vehicle += rhs.write_off_costs_vehicle;
        self.write_off_costs_charging_system += rhs.write_off_costs_charging_system;
        self.driver_costs += rhs.driver_costs;
        self.costs_public_charging += rhs.costs_public_charging;
        self.co2_emissions += rhs.co2_emissions;
        self.particulate_matter_emissions += rhs.particulate_matter_emissions;
        self.nitrogen_oxide_emissions += rhs.nitrogen_oxide_emissions;
        self.kwh_charged_on_depot += rhs.kwh_charged_on_depot;
        self.kwh_charged_in_public += rhs.kwh_charged_in_public;
        self.charging_time_depot += rhs.charging_time_depot;
        self.charging_time_public += rhs.charging_time_public;
        self.transition_year += rhs.transition_year;
    }
}

impl fmt::Display for YearResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tco={:>8} fixed={:>7} var={:>7} wo_veh={:>7} wo_chg={:>6} driver={:>7} \
             public={:>5} co2={:>9.1} kwh_depot={:>8.0} kwh_public={:>7.0} transition={}",
            self.tco,
            self.fixed_vehicle_costs,
            self.variable_vehicle_costs,
            self.write_off_costs_vehicle,
            self.write_off_costs_charging_system,
            self.driver_costs,
            self.costs_public_charging,
            self.co2_emissions,
            self.kwh_charged_on_depot,
            self.kwh_charged_in_public,
            self.transition_year,
        )
    }
}

/// Year-indexed results of one (vehicle, scenario, strategy) run.
pub type YearSeries = BTreeMap<i32, YearResult>;
