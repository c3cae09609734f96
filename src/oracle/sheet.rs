//! Parameter sheet value object and the oracle that writes into it.

use serde::Serialize;
use tracing::trace;

use crate::domain::{ElectricityType, FuelType, ResidualCurve, ScenarioYear, Vehicle, VehicleCategory};
use crate::error::TcoError;
use crate::sim::types::YearResult;

use super::model::{BranchOutputs, CostModel, ReferenceCostModel};
use super::{FinancialOracle, Lifespans};

const CATEGORIES: usize = VehicleCategory::ALL.len();

/// Hours a vehicle is productive per operational day.
const HOURS_PER_OPERATIONAL_DAY: f64 = 10.0;

/// Yearly subscription for public fast charging, added to mixed-charging records.
pub const PUBLIC_CHARGING_SUBSCRIPTION: i64 = 144;

/// Per-category reference tables of the cost model, indexed by category index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTables {
    pub ev_price: [f64; CATEGORIES],
    pub battery_capacity_kwh: [f64; CATEGORIES],
    pub diesel_price: [f64; CATEGORIES],
    pub ev_efficiency_kwh_per_km: [f64; CATEGORIES],
    pub diesel_efficiency_l_per_km: [f64; CATEGORIES],
    pub toll_per_year: [f64; CATEGORIES],
}

impl Default for CategoryTables {
    fn default() -> Self {
        Self {
            ev_price: [30000.0, 36000.0, 68000.0, 66380.0, 157000.0, 267500.0, 300000.0],
            battery_capacity_kwh: [40.0, 60.0, 90.0, 70.0, 82.8, 250.0, 275.0],
            diesel_price: [11760.0, 17195.0, 24042.0, 23620.0, 62500.0, 115000.0, 144500.0],
            ev_efficiency_kwh_per_km: [0.15, 0.21, 0.25, 0.31, 0.75, 0.9, 1.25],
            diesel_efficiency_l_per_km: [0.057, 0.077, 0.084, 0.12, 0.102, 0.209, 0.318],
            toll_per_year: [100.0, 100.0, 100.0, 100.0, 750.0, 750.0, 1250.0],
        }
    }
}

/// Every named input the cost model reads.
///
/// `None` marks a parameter that has not been written since the last reset;
/// the cost model cannot evaluate a branch that depends on one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSheet {
    // vehicle
    pub category_index: usize,
    pub is_cooled: bool,
    pub yearly_mileage_km: f64,
    pub productive_hours: f64,
    pub operational_days: f64,
    pub driving_range_per_day_km: Option<f64>,
    pub electricity_type: ElectricityType,
    pub lifespan_electric: u32,
    pub lifespan_diesel: u32,

    // energy
    pub diesel_fuel_price: Option<f64>,
    pub electricity_price_private: Option<f64>,
    pub electricity_price_public: Option<f64>,
    pub excise_change_diesel: Option<f64>,
    pub co2_price_per_ton: Option<f64>,

    // purchase, subsidy and write-off
    pub ev_subsidy: Option<f64>,
    pub investment_deduction: Option<f64>,
    pub residual_value_electric: Option<f64>,
    pub residual_value_diesel: Option<f64>,
    pub residual_curve_diesel: ResidualCurve,
    pub residual_debt_active: bool,
    pub depreciation_override_diesel: Option<f64>,
    pub carried_residual_debt: f64,

    // upkeep
    pub repair_costs_electric: f64,
    pub repair_costs_diesel: f64,
    pub standstill_days_electric: f64,
    pub standstill_days_diesel: f64,
    pub maintenance_electric_per_km: Option<f64>,
    pub maintenance_diesel_per_km: Option<f64>,

    // charging
    pub depot_pole_capacity_kw: Option<f64>,
    pub external_pole_capacity_kw: f64,
    pub charging_time_depot: Option<f64>,
    pub charging_time_public: Option<f64>,
    pub charging_system_purchase: Option<f64>,
    pub charging_system_installation: Option<f64>,

    // taxes
    pub ze_costs: Option<f64>,
    pub vehicle_tax_electric: f64,
    pub vehicle_tax_diesel: f64,

    // model constants
    pub tables: CategoryTables,
    pub driver_wage_per_hour: f64,
    pub downtime_cost_per_day: f64,
}

impl Default for ParameterSheet {
    fn default() -> Self {
        Self {
            category_index: 0,
            is_cooled: false,
            yearly_mileage_km: 35000.0,
            productive_hours: 26000.0,
            operational_days: 260.0,
            driving_range_per_day_km: None,
            electricity_type: ElectricityType::Grey,
            lifespan_electric: 7,
            lifespan_diesel: 7,
            diesel_fuel_price: None,
            electricity_price_private: None,
            electricity_price_public: None,
            excise_change_diesel: None,
            co2_price_per_ton: None,
            ev_subsidy: None,
            investment_deduction: None,
            residual_value_electric: None,
            residual_value_diesel: None,
            residual_curve_diesel: ResidualCurve::linear(0.85, 0.05),
            residual_debt_active: false,
            depreciation_override_diesel: None,
            carried_residual_debt: 0.0,
            repair_costs_electric: 5000.0,
            repair_costs_diesel: 1500.0,
            standstill_days_electric: 5.0,
            standstill_days_diesel: 1.0,
            maintenance_electric_per_km: None,
            maintenance_diesel_per_km: None,
            depot_pole_capacity_kw: None,
            external_pole_capacity_kw: 150.0,
            charging_time_depot: None,
            charging_time_public: None,
            charging_system_purchase: None,
            charging_system_installation: None,
            ze_costs: None,
            vehicle_tax_electric: 0.0,
            vehicle_tax_diesel: 0.0,
            tables: CategoryTables::default(),
            driver_wage_per_hour: 35.0,
            downtime_cost_per_day: 250.0,
        }
    }
}

impl ParameterSheet {
    /// Residual fraction of the diesel curve at `age`, with a new vehicle worth its full price.
    fn diesel_fraction(&self, age: i32) -> Option<f64> {
        if age == 0 {
            return Some(1.0);
        }
        self.residual_curve_diesel.at(u32::try_from(age).ok()?)
    }

    /// Purchase price of the diesel vehicle in the active category.
    pub fn diesel_purchase_price(&self) -> f64 {
        self.tables.diesel_price[self.category_index]
    }
}

/// Oracle backed by a [`ParameterSheet`] and an evaluating [`CostModel`].
#[derive(Debug, Clone)]
pub struct SheetOracle<M: CostModel = ReferenceCostModel> {
    sheet: ParameterSheet,
    model: M,
    default_lifespans: Lifespans,
}

impl SheetOracle<ReferenceCostModel> {
    /// Oracle with default sheet values and the reference cost model.
    pub fn new() -> Self {
        Self::with_model(ReferenceCostModel)
    }
}

impl Default for SheetOracle<ReferenceCostModel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: CostModel> SheetOracle<M> {
    pub fn with_model(model: M) -> Self {
        let sheet = ParameterSheet::default();
        let default_lifespans = Lifespans {
            electric: sheet.lifespan_electric,
            diesel: sheet.lifespan_diesel,
        };
        Self {
            sheet,
            model,
            default_lifespans,
        }
    }

    /// Current parameter values.
    pub fn sheet(&self) -> &ParameterSheet {
        &self.sheet
    }

    fn branch(&self, pick: fn(&super::SheetOutputs) -> Option<BranchOutputs>, name: &str) -> Result<BranchOutputs, TcoError> {
        pick(&self.model.evaluate(&self.sheet)).ok_or_else(|| {
            TcoError::ComputationFailed(format!(
                "{name} branch cannot be evaluated: required parameters are missing"
            ))
        })
    }
}

impl<M: CostModel> FinancialOracle for SheetOracle<M> {
    fn reset(&mut self) {
        self.sheet = ParameterSheet::default();
    }

    fn input_vehicle_data(&mut self, vehicle: &Vehicle) {
        let s = &mut self.sheet;
        s.category_index = vehicle.category.index();
        s.is_cooled = vehicle.is_cooled;
        s.yearly_mileage_km = vehicle.expected_total_distance_traveled_in_km;
        s.operational_days = f64::from(vehicle.amount_of_operational_days);
        s.productive_hours = s.operational_days * HOURS_PER_OPERATIONAL_DAY;
        s.lifespan_electric = vehicle.technological_lifespan;
        s.lifespan_diesel = vehicle.technological_lifespan;
        s.electricity_type = vehicle.electricity_type;
        let expected_daily = if s.operational_days > 0.0 {
            vehicle.expected_total_distance_traveled_in_km / s.operational_days
        } else {
            0.0
        };
        s.driving_range_per_day_km = Some(expected_daily.max(vehicle.maximum_daily_distance_in_km));
    }

    fn update_fixed_parameters(
        &mut self,
        lifespan: u32,
        category_index: usize,
        charging_time_depot: u32,
        charging_time_public: u32,
        tax_percentage: f64,
        current: &ScenarioYear,
        future: &ScenarioYear,
    ) -> Result<(), TcoError> {
        let residual_pct = |curve: &ResidualCurve, which: &str| {
            curve.at(lifespan).ok_or_else(|| {
                TcoError::ComputationFailed(format!(
                    "{} has no {which} residual value for a lifespan of {lifespan} years",
                    future.year
                ))
            })
        };
        let residual_electric = residual_pct(&future.residual_value_ev, "EV")?;
        let residual_diesel = residual_pct(&future.residual_value_diesel, "diesel")?;
        let idx = category_index.min(CATEGORIES - 1);

        let s = &mut self.sheet;
        s.category_index = idx;
        s.tables.ev_price[idx] = current.electric_price_in_euro;
        s.tables.diesel_price[idx] = current.diesel_price_in_euro;
        s.tables.battery_capacity_kwh[idx] = current.capacity_in_kwh;
        s.tables.ev_efficiency_kwh_per_km[idx] = current.efficiency_electricity_in_kwh_per_km;
        s.tables.diesel_efficiency_l_per_km[idx] = current.efficiency_diesel_in_liter_per_km;

        s.ev_subsidy = Some(current.subsidies_ev_in_euro);
        s.investment_deduction =
            Some(tax_percentage * (current.mia_in_euro_per_lifespan + current.vamil_in_euro_per_lifespan));

        s.residual_debt_active = false;
        s.depreciation_override_diesel = None;
        s.residual_value_electric = Some(current.electric_price_in_euro * residual_electric);
        s.residual_value_diesel = Some(current.diesel_price_in_euro * residual_diesel);
        s.residual_curve_diesel = current.residual_value_diesel;

        s.charging_system_purchase = Some(current.gross_purchase_cost_charging_system_in_euro);
        s.charging_system_installation = Some(current.gross_installation_cost_charging_system_in_euro);
        s.depot_pole_capacity_kw = Some(current.charging_capacity_charging_pole_on_depot);
        s.charging_time_depot = Some(f64::from(charging_time_depot));
        s.charging_time_public = Some(f64::from(charging_time_public));

        s.standstill_days_electric = current.standstill_ev_in_days;
        s.standstill_days_diesel = 1.0;
        trace!(lifespan, category_index = idx, year = current.year, future_year = future.year, "fixed parameters written");
        Ok(())
    }

    fn update_variable_parameters(&mut self, year: &ScenarioYear) {
        let s = &mut self.sheet;
        s.repair_costs_electric = year.repair_costs_ev_euro_per_year;
        s.repair_costs_diesel = 1500.0;
        s.maintenance_electric_per_km = Some(year.maintenance_costs_ev_euro_per_km);
        s.maintenance_diesel_per_km = Some(year.maintenance_costs_diesel_euro_per_km);
        s.co2_price_per_ton = Some(year.co2_price_in_euro_per_ton);
        s.diesel_fuel_price = Some(year.fuel_price_diesel_excluding_tax_in_euro_per_liter);
        s.electricity_price_private = Some(year.electricity_price_private_in_euro_per_kwh);
        s.electricity_price_public = Some(year.electricity_price_public_in_euro_per_kwh);
        s.excise_change_diesel = Some(year.change_in_excise_duty_diesel_in_percentage);
        s.vehicle_tax_electric = year.vehicle_tax_electric_in_euro_per_year;
        s.external_pole_capacity_kw = year.charging_capacity_external_charging_pole;
        s.carried_residual_debt = 0.0;
    }

    fn technological_lifespan(&self) -> Lifespans {
        Lifespans {
            electric: self.sheet.lifespan_electric,
            diesel: self.sheet.lifespan_diesel,
        }
    }

    fn reset_technological_lifespan(&mut self) {
        self.sheet.lifespan_electric = self.default_lifespans.electric;
        self.sheet.lifespan_diesel = self.default_lifespans.diesel;
    }

    fn set_ze_costs(&mut self, year: &ScenarioYear) {
        self.sheet.ze_costs = Some(year.fixed_ze_vehicle_tax_in_euro_per_year);
    }

    fn reset_ze_costs(&mut self) {
        self.sheet.ze_costs = Some(0.0);
    }

    fn increase_maintenance_factor(&mut self, fuel: FuelType, factor: f64) {
        let s = &mut self.sheet;
        if fuel.is_fossil() {
            s.repair_costs_diesel = s.repair_costs_diesel.trunc() * factor;
            s.standstill_days_diesel *= factor;
        } else {
            s.repair_costs_electric = s.repair_costs_electric.trunc() * factor;
            s.standstill_days_electric *= factor;
        }
    }

    fn decrease_yearly_depreciation_costs(&mut self, fuel: FuelType, vehicle_age: i32) {
        // Only diesel write-off is replaced, and only where the curve covers both ages.
        if !fuel.is_fossil() || !(1..=15).contains(&vehicle_age) {
            return;
        }
        let (Some(old), Some(new)) = (
            self.sheet.diesel_fraction(vehicle_age - 1),
            self.sheet.diesel_fraction(vehicle_age),
        ) else {
            return;
        };
        let difference = self.sheet.diesel_purchase_price() * (old - new);
        self.sheet.residual_debt_active = true;
        self.sheet.depreciation_override_diesel = Some(difference);
    }

    fn reset_yearly_depreciation_costs(&mut self) {
        self.sheet.residual_debt_active = false;
        self.sheet.depreciation_override_diesel = None;
    }

    fn calculate_residual_debt(&self, lifespan: u32, vehicle_age: i32) -> i64 {
        let Ok(lifespan_age) = i32::try_from(lifespan) else {
            return 0;
        };
        if lifespan == 0 || !(0..=15).contains(&vehicle_age) || lifespan > 15 {
            return 0;
        }
        let (Some(at_lifespan), Some(now)) = (
            self.sheet.diesel_fraction(lifespan_age),
            self.sheet.diesel_fraction(vehicle_age),
        ) else {
            return 0;
        };
        let price = self.sheet.diesel_purchase_price();
        let written_off = (price - price * at_lifespan) / f64::from(lifespan) * f64::from(vehicle_age);
        let debt = price - price * now - written_off;
        (debt.trunc() as i64).max(0)
    }

    fn add_residual_debt(&mut self, amount: i64) {
        self.sheet.carried_residual_debt += amount as f64;
    }

    fn is_optimal_mix_valid(&self) -> bool {
        self.model.evaluate(&self.sheet).optimal_mix_valid
    }

    fn is_exclusive_home_loading_valid(&self) -> bool {
        self.model.evaluate(&self.sheet).depot_exclusive_valid
    }

    fn total_tco_depot_charging(&self) -> Option<f64> {
        self.model.evaluate(&self.sheet).depot.map(|b| b.tco)
    }

    fn total_tco_optimal_mix(&self) -> Option<f64> {
        self.model.evaluate(&self.sheet).mix.map(|b| b.tco)
    }

    fn total_tco_diesel(&self) -> Option<f64> {
        self.model.evaluate(&self.sheet).diesel.map(|b| b.tco)
    }

    fn tco_diesel(&self, transition_year: i32) -> Result<YearResult, TcoError> {
        let b = self.branch(|o| o.diesel, "diesel")?;
        Ok(YearResult {
            kwh_charged_on_depot: 0.0,
            kwh_charged_in_public: 0.0,
            charging_time_depot: 0.0,
            charging_time_public: 0.0,
            costs_public_charging: 0,
            ..b.to_record(transition_year)
        })
    }

    fn tco_electric(&self, depot_exclusive: bool, transition_year: i32) -> Result<YearResult, TcoError> {
        if depot_exclusive {
            let b = self.branch(|o| o.depot, "depot charging")?;
            return Ok(YearResult {
                kwh_charged_in_public: 0.0,
                charging_time_public: 0.0,
                costs_public_charging: 0,
                ..b.to_record(transition_year)
            });
        }
        let mix = self.branch(|o| o.mix, "optimal mix")?;
        let depot = self.branch(|o| o.depot, "depot charging")?;
        let mut record = mix.to_record(transition_year);
        let depot_driver = depot.driver.trunc() as i64;
        record.costs_public_charging =
            (record.driver_costs - depot_driver).max(0) + PUBLIC_CHARGING_SUBSCRIPTION;
        Ok(record)
    }
}
