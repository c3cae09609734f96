//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use fleet_tco::domain::{FuelType, Scenario, ScenarioSet, ScenarioYear, Vehicle, VehicleCategory};
use fleet_tco::error::TcoError;
use fleet_tco::oracle::{FinancialOracle, Lifespans};
use fleet_tco::presets;
use fleet_tco::sim::types::{SimConstants, YearResult};

/// First simulated year of the fixtures.
pub const FIRST_YEAR: i32 = 2026;

/// Yearly TCO the scripted oracle reports for a diesel year.
pub const DIESEL_TCO: i64 = 10_000;
/// Yearly TCO the scripted oracle reports for an electric year.
pub const ELECTRIC_TCO: i64 = 9_000;
/// Extra yearly TCO while zone costs are active.
pub const ZE_SURCHARGE: i64 = 2_500;
/// Extra yearly TCO of an electric record asked for depot-only charging.
pub const DEPOT_ONLY_SURCHARGE: i64 = 700;

/// Every oracle interaction, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reset,
    VehicleData(String),
    Fixed { lifespan: u32, current: i32, future: i32 },
    Variable(i32),
    ZeSet(i32),
    ZeReset,
    Maintenance(FuelType, f64),
    DepreciationDecrease(FuelType, i32),
    DepreciationReset,
    DebtAdded(i64),
}

/// Oracle with scripted feasibility and totals that records every call.
///
/// `reset` restores lifespans and line items but keeps the script.
#[derive(Debug, Clone)]
pub struct ScriptedOracle {
    pub optimal_mix_valid: bool,
    pub depot_valid: bool,
    pub total_diesel: Option<f64>,
    pub total_mix: Option<f64>,
    pub total_depot: Option<f64>,
    /// Debt reported by `calculate_residual_debt` per remaining lifespan year.
    pub debt_per_year: i64,
    pub calls: Vec<Call>,
    defaults: Lifespans,
    lifespans: Lifespans,
    ze_active: bool,
    debt: i64,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        let defaults = Lifespans { electric: 7, diesel: 7 };
        Self {
            optimal_mix_valid: true,
            depot_valid: true,
            total_diesel: Some(100_000.0),
            total_mix: Some(120_000.0),
            total_depot: Some(125_000.0),
            debt_per_year: 4_000,
            calls: Vec::new(),
            defaults,
            lifespans: defaults,
            ze_active: false,
            debt: 0,
        }
    }
}

impl ScriptedOracle {
    /// Oracle in which electric is cheaper than diesel every year.
    pub fn at_parity() -> Self {
        Self {
            total_mix: Some(95_000.0),
            total_depot: Some(96_000.0),
            ..Self::default()
        }
    }

    /// Oracle in which no charging mix is ever feasible.
    pub fn infeasible() -> Self {
        Self {
            optimal_mix_valid: false,
            depot_valid: false,
            ..Self::default()
        }
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl FinancialOracle for ScriptedOracle {
    fn reset(&mut self) {
        self.lifespans = self.defaults;
        self.ze_active = false;
        self.debt = 0;
        self.calls.push(Call::Reset);
    }

    fn input_vehicle_data(&mut self, vehicle: &Vehicle) {
        self.lifespans = Lifespans {
            electric: vehicle.technological_lifespan,
            diesel: vehicle.technological_lifespan,
        };
        self.calls.push(Call::VehicleData(vehicle.number_plate.clone()));
    }

    fn update_fixed_parameters(
        &mut self,
        lifespan: u32,
        _category_index: usize,
        _charging_time_depot: u32,
        _charging_time_public: u32,
        _tax_percentage: f64,
        current: &ScenarioYear,
        future: &ScenarioYear,
    ) -> Result<(), TcoError> {
        if lifespan > 15 {
            return Err(TcoError::ComputationFailed(format!("no residual value for lifespan {lifespan}")));
        }
        self.debt = 0;
        self.calls.push(Call::Fixed {
            lifespan,
            current: current.year,
            future: future.year,
        });
        Ok(())
    }

    fn update_variable_parameters(&mut self, year: &ScenarioYear) {
        self.debt = 0;
        self.calls.push(Call::Variable(year.year));
    }

    fn technological_lifespan(&self) -> Lifespans {
        self.lifespans
    }

    fn reset_technological_lifespan(&mut self) {
        self.lifespans = self.defaults;
    }

    fn set_ze_costs(&mut self, year: &ScenarioYear) {
        self.ze_active = true;
        self.calls.push(Call::ZeSet(year.year));
    }

    fn reset_ze_costs(&mut self) {
        self.ze_active = false;
        self.calls.push(Call::ZeReset);
    }

    fn increase_maintenance_factor(&mut self, fuel: FuelType, factor: f64) {
        self.calls.push(Call::Maintenance(fuel, factor));
    }

    fn decrease_yearly_depreciation_costs(&mut self, fuel: FuelType, vehicle_age: i32) {
        self.calls.push(Call::DepreciationDecrease(fuel, vehicle_age));
    }

    fn reset_yearly_depreciation_costs(&mut self) {
        self.calls.push(Call::DepreciationReset);
    }

    fn calculate_residual_debt(&self, lifespan: u32, vehicle_age: i32) -> i64 {
        (i64::from(lifespan) - i64::from(vehicle_age)).max(0) * self.debt_per_year
    }

    fn add_residual_debt(&mut self, amount: i64) {
        self.debt += amount;
        self.calls.push(Call::DebtAdded(amount));
    }

    fn is_optimal_mix_valid(&self) -> bool {
        self.optimal_mix_valid
    }

    fn is_exclusive_home_loading_valid(&self) -> bool {
        self.depot_valid
    }

    fn total_tco_depot_charging(&self) -> Option<f64> {
        self.total_depot
    }

    fn total_tco_optimal_mix(&self) -> Option<f64> {
        self.total_mix
    }

    fn total_tco_diesel(&self) -> Option<f64> {
        self.total_diesel
    }

    fn tco_diesel(&self, transition_year: i32) -> Result<YearResult, TcoError> {
        Ok(YearResult {
            tco: DIESEL_TCO + if self.ze_active { ZE_SURCHARGE } else { 0 },
            co2_emissions: 30_000.0,
            transition_year,
            ..YearResult::default()
        })
    }

    fn tco_electric(&self, depot_exclusive: bool, transition_year: i32) -> Result<YearResult, TcoError> {
        Ok(YearResult {
            tco: ELECTRIC_TCO + self.debt + if depot_exclusive { DEPOT_ONLY_SURCHARGE } else { 0 },
            kwh_charged_on_depot: 20_000.0,
            kwh_charged_in_public: 2_000.0,
            transition_year,
            ..YearResult::default()
        })
    }
}

/// Constants with the horizon starting at [`FIRST_YEAR`].
pub fn constants() -> SimConstants {
    SimConstants::for_year(FIRST_YEAR)
}

/// Diesel medium van bought `age` years before [`FIRST_YEAR`], lifespan 7.
pub fn diesel_van(plate: &str, age: i32) -> Vehicle {
    presets::demo_vehicle(plate, VehicleCategory::MediumVan, FIRST_YEAR - age)
}

/// `midden` trajectory for `category` covering 15 years from [`FIRST_YEAR`].
pub fn scenario(category: VehicleCategory) -> Scenario {
    presets::demo_scenario("midden", category, FIRST_YEAR, 15)
}

/// Demo scenario set starting at [`FIRST_YEAR`].
pub fn scenarios() -> ScenarioSet {
    presets::demo_scenarios(FIRST_YEAR)
}
