//! Cost models evaluating a parameter sheet into branch totals.

use serde::Serialize;

use crate::domain::ElectricityType;
use crate::sim::types::YearResult;

use super::sheet::ParameterSheet;

/// Evaluates the current parameter values into per-branch outputs.
///
/// Implementations are pure: the same sheet always yields the same outputs.
pub trait CostModel {
    fn evaluate(&self, sheet: &ParameterSheet) -> SheetOutputs;
}

/// Yearly figures of one branch (diesel, depot charging or optimal mix).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BranchOutputs {
    pub tco: f64,
    pub fixed: f64,
    pub variable: f64,
    pub write_off_vehicle: f64,
    pub write_off_charging: f64,
    pub driver: f64,
    pub co2_kg: f64,
    pub pm_kg: f64,
    pub nox_kg: f64,
    pub kwh_depot: f64,
    pub kwh_public: f64,
    pub hours_depot: f64,
    pub hours_public: f64,
}

impl BranchOutputs {
    /// Converts to a year record, truncating costs to whole euros.
    pub fn to_record(&self, transition_year: i32) -> YearResult {
        YearResult {
            tco: self.tco.trunc() as i64,
            fixed_vehicle_costs: self.fixed.trunc() as i64,
            variable_vehicle_costs: self.variable.trunc() as i64,
            write_off_costs_vehicle: self.write_off_vehicle.trunc() as i64,
            write_off_costs_charging_system: self.write_off_charging.trunc() as i64,
            driver_costs: self.driver.trunc() as i64,
            costs_public_charging: 0,
            co2_emissions: self.co2_kg,
            particulate_matter_emissions: self.pm_kg,
            nitrogen_oxide_emissions: self.nox_kg,
            kwh_charged_on_depot: self.kwh_depot,
            kwh_charged_in_public: self.kwh_public,
            charging_time_depot: self.hours_depot,
            charging_time_public: self.hours_public,
            transition_year,
        }
    }
}

/// Everything a model derives from one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SheetOutputs {
    pub diesel: Option<BranchOutputs>,
    pub depot: Option<BranchOutputs>,
    pub mix: Option<BranchOutputs>,
    pub depot_exclusive_valid: bool,
    pub optimal_mix_valid: bool,
}

/// Diesel tailpipe emission factors, kg per litre.
const CO2_KG_PER_LITRE: f64 = 2.64;
const PM_KG_PER_LITRE: f64 = 0.000_1;
const NOX_KG_PER_LITRE: f64 = 0.004;

/// Grid CO2 intensity of grey electricity, kg per kWh.
const GREY_GRID_KG_PER_KWH: f64 = 0.4;

/// Extra energy drawn by a refrigerated body.
const COOLING_UPLIFT: f64 = 1.1;

/// Transparent first-order yearly cost model.
///
/// Straight-line write-off between purchase price and residual value, energy
/// and upkeep proportional to mileage, driver hours at a flat wage. Electric
/// branches split the daily energy need over depot and public charging.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCostModel;

struct Common {
    km: f64,
    daily_km: f64,
    cooling: f64,
    driver: f64,
    co2_price_per_kg: f64,
}

impl ReferenceCostModel {
    fn common(s: &ParameterSheet) -> Common {
        let days = if s.operational_days > 0.0 { s.operational_days } else { 1.0 };
        Common {
            km: s.yearly_mileage_km,
            daily_km: s.driving_range_per_day_km.unwrap_or(s.yearly_mileage_km / days),
            cooling: if s.is_cooled { COOLING_UPLIFT } else { 1.0 },
            driver: s.productive_hours * s.driver_wage_per_hour,
            co2_price_per_kg: s.co2_price_per_ton.unwrap_or(0.0) / 1000.0,
        }
    }

    fn diesel(s: &ParameterSheet, c: &Common) -> Option<BranchOutputs> {
        let idx = s.category_index;
        let fuel_price = s.diesel_fuel_price? * (1.0 + s.excise_change_diesel.unwrap_or(0.0));
        let residual = s.residual_value_diesel?;
        let purchase = s.tables.diesel_price[idx];
        let lifespan = f64::from(s.lifespan_diesel.max(1));

        let write_off_vehicle = match (s.residual_debt_active, s.depreciation_override_diesel) {
            (true, Some(actual_loss)) => actual_loss,
            _ => (purchase - residual) / lifespan,
        };
        let litres = c.km * s.tables.diesel_efficiency_l_per_km[idx] * c.cooling;
        let co2_kg = litres * CO2_KG_PER_LITRE;
        let variable = litres * fuel_price
            + c.km * s.maintenance_diesel_per_km.unwrap_or(0.0)
            + s.repair_costs_diesel
            + s.standstill_days_diesel * s.downtime_cost_per_day
            + co2_kg * c.co2_price_per_kg;
        let fixed = s.tables.toll_per_year[idx] + s.vehicle_tax_diesel + s.ze_costs.unwrap_or(0.0);

        Some(BranchOutputs {
            tco: fixed + variable + write_off_vehicle + c.driver,
            fixed,
            variable,
            write_off_vehicle,
            write_off_charging: 0.0,
            driver: c.driver,
            co2_kg,
            pm_kg: litres * PM_KG_PER_LITRE,
            nox_kg: litres * NOX_KG_PER_LITRE,
            ..BranchOutputs::default()
        })
    }

    /// Shared electric cost items for a given split of yearly energy.
    fn electric(s: &ParameterSheet, c: &Common, kwh_depot: f64, kwh_public: f64) -> Option<BranchOutputs> {
        let idx = s.category_index;
        let private_price = s.electricity_price_private?;
        let residual = s.residual_value_electric?;
        let depot_kw = s.depot_pole_capacity_kw.filter(|kw| *kw > 0.0)?;
        let lifespan = f64::from(s.lifespan_electric.max(1));

        let net_purchase = s.tables.ev_price[idx]
            - s.ev_subsidy.unwrap_or(0.0)
            - s.investment_deduction.unwrap_or(0.0);
        let write_off_vehicle = (net_purchase - residual) / lifespan;
        let write_off_charging = (s.charging_system_purchase.unwrap_or(0.0)
            + s.charging_system_installation.unwrap_or(0.0))
            / lifespan;

        let public_cost = if kwh_public > 0.0 {
            kwh_public * s.electricity_price_public?
        } else {
            0.0
        };
        let hours_public = if kwh_public > 0.0 {
            kwh_public / s.external_pole_capacity_kw.max(1.0)
        } else {
            0.0
        };
        let co2_kg = match s.electricity_type {
            ElectricityType::Grey => (kwh_depot + kwh_public) * GREY_GRID_KG_PER_KWH,
            ElectricityType::Green => 0.0,
        };
        let variable = kwh_depot * private_price
            + public_cost
            + c.km * s.maintenance_electric_per_km.unwrap_or(0.0)
            + s.repair_costs_electric
            + s.standstill_days_electric * s.downtime_cost_per_day
            + co2_kg * c.co2_price_per_kg
            + s.carried_residual_debt;
        let fixed = s.tables.toll_per_year[idx] + s.vehicle_tax_electric;
        let driver = c.driver + hours_public * s.driver_wage_per_hour;

        Some(BranchOutputs {
            tco: fixed + variable + write_off_vehicle + write_off_charging + driver,
            fixed,
            variable,
            write_off_vehicle,
            write_off_charging,
            driver,
            co2_kg,
            pm_kg: 0.0,
            nox_kg: 0.0,
            kwh_depot,
            kwh_public,
            hours_depot: kwh_depot / depot_kw,
            hours_public,
        })
    }
}

impl CostModel for ReferenceCostModel {
    fn evaluate(&self, s: &ParameterSheet) -> SheetOutputs {
        let c = Self::common(s);
        let idx = s.category_index;
        let kwh_per_km = s.tables.ev_efficiency_kwh_per_km[idx] * c.cooling;
        let yearly_kwh = c.km * kwh_per_km;
        let daily_kwh = c.daily_km * kwh_per_km;

        let depot_daily_kwh = match (s.depot_pole_capacity_kw, s.charging_time_depot) {
            (Some(kw), Some(hours)) => kw * hours,
            _ => 0.0,
        };
        let public_daily_kwh = s.external_pole_capacity_kw * s.charging_time_public.unwrap_or(0.0);
        let battery = s.tables.battery_capacity_kwh[idx];

        let depot = Self::electric(s, &c, yearly_kwh, 0.0);
        let depot_share = if daily_kwh > 0.0 {
            (depot_daily_kwh / daily_kwh).min(1.0)
        } else {
            1.0
        };
        let mix = Self::electric(
            s,
            &c,
            yearly_kwh * depot_share,
            yearly_kwh * (1.0 - depot_share),
        );

        let depot_exclusive_valid =
            depot.is_some() && daily_kwh <= depot_daily_kwh && daily_kwh <= battery;
        let optimal_mix_valid =
            mix.is_some() && daily_kwh <= depot_daily_kwh + public_daily_kwh;

        SheetOutputs {
            diesel: Self::diesel(s, &c),
            depot,
            mix,
            depot_exclusive_valid,
            optimal_mix_valid,
        }
    }
}
