//! Financial oracle: the cost model a strategy drives year by year.
//!
//! A strategy never computes costs itself. It writes fixed and variable
//! parameters into an oracle, adjusts a few line items (maintenance, depreciation,
//! zero-emission zone costs) and reads the resulting record back. One oracle
//! instance belongs to one (vehicle, scenario, strategy) run at a time and is
//! reset in between.

pub mod model;
pub mod sheet;

use serde::Serialize;

use crate::domain::{FuelType, ScenarioYear, Vehicle};
use crate::error::TcoError;
use crate::sim::types::YearResult;

pub use model::{BranchOutputs, CostModel, ReferenceCostModel, SheetOutputs};
pub use sheet::{ParameterSheet, SheetOracle};

/// Technological lifespans currently configured in the oracle, in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lifespans {
    pub electric: u32,
    pub diesel: u32,
}

impl Lifespans {
    /// Lifespan applying to a vehicle running on `fuel`.
    pub fn for_fuel(&self, fuel: FuelType) -> u32 {
        if fuel.is_fossil() {
            self.diesel
        } else {
            self.electric
        }
    }
}

/// Contract between the strategy engine and a cost model.
///
/// Totals return `None` when the model cannot produce a number; callers must
/// treat that as undetermined, never as zero. Record getters fail instead, since
/// a simulated year without a record has no safe continuation.
pub trait FinancialOracle {
    /// Restores every parameter to its default.
    fn reset(&mut self);

    /// Writes the vehicle-invariant inputs.
    fn input_vehicle_data(&mut self, vehicle: &Vehicle);

    /// Writes the parameters that hold for the vehicle's whole lifespan.
    ///
    /// # Errors
    ///
    /// [`TcoError::ComputationFailed`] when `future` has no residual value for `lifespan`.
    #[expect(clippy::too_many_arguments)]
    fn update_fixed_parameters(
        &mut self,
        lifespan: u32,
        category_index: usize,
        charging_time_depot: u32,
        charging_time_public: u32,
        tax_percentage: f64,
        current: &ScenarioYear,
        future: &ScenarioYear,
    ) -> Result<(), TcoError>;

    /// Writes the parameters that change every year.
    fn update_variable_parameters(&mut self, year: &ScenarioYear);

    fn technological_lifespan(&self) -> Lifespans;

    fn reset_technological_lifespan(&mut self);

    /// Applies the yearly zero-emission zone tax of `year`.
    fn set_ze_costs(&mut self, year: &ScenarioYear);

    fn reset_ze_costs(&mut self);

    /// Multiplies repair costs and downtime of the `fuel` line items by `factor`.
    fn increase_maintenance_factor(&mut self, fuel: FuelType, factor: f64);

    /// Replaces the straight-line write-off of a paid-off vehicle by its actual
    /// value loss at `vehicle_age`.
    fn decrease_yearly_depreciation_costs(&mut self, fuel: FuelType, vehicle_age: i32);

    fn reset_yearly_depreciation_costs(&mut self);

    /// Open debt of a vehicle of `vehicle_age` replaced before its `lifespan` ended.
    fn calculate_residual_debt(&self, lifespan: u32, vehicle_age: i32) -> i64;

    /// Charges `amount` on top of this year's electric costs.
    fn add_residual_debt(&mut self, amount: i64);

    /// Whether a mix of depot and public charging covers the daily energy need.
    fn is_optimal_mix_valid(&self) -> bool;

    /// Whether depot charging alone covers the daily energy need.
    fn is_exclusive_home_loading_valid(&self) -> bool;

    fn total_tco_depot_charging(&self) -> Option<f64>;

    fn total_tco_optimal_mix(&self) -> Option<f64>;

    fn total_tco_diesel(&self) -> Option<f64>;

    /// Year record of the diesel branch.
    ///
    /// # Errors
    ///
    /// [`TcoError::ComputationFailed`] when the branch cannot be evaluated.
    fn tco_diesel(&self, transition_year: i32) -> Result<YearResult, TcoError>;

    /// Year record of the electric branch, depot-only or mixed charging.
    ///
    /// # Errors
    ///
    /// [`TcoError::ComputationFailed`] when the branch cannot be evaluated.
    fn tco_electric(&self, depot_exclusive: bool, transition_year: i32) -> Result<YearResult, TcoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifespan_follows_fuel_group() {
        let l = Lifespans {
            electric: 8,
            diesel: 6,
        };
        assert_eq!(l.for_fuel(FuelType::Cng), 6);
        assert_eq!(l.for_fuel(FuelType::Electric), 8);
    }
}
