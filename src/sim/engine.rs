//! Year loop shared by every replacement strategy.

use tracing::debug;

use crate::domain::{FuelType, Scenario, Vehicle};
use crate::error::TcoError;
use crate::oracle::FinancialOracle;

use super::strategy::{DecisionContext, Replacement, Strategy, transition_year_reached};
use super::types::{SIMULATED_YEARS, SimConstants, YearResult, YearSeries};
use super::zone::is_allowed_in_zone;

/// Mutable vehicle state carried across simulated years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleState {
    pub fuel: FuelType,
    pub age: i32,
    pub lifespan: i32,
    /// Year the vehicle was replaced by an electric one, if it was.
    pub transitioned_in: Option<i32>,
}

/// Runs one strategy for one vehicle and scenario against an oracle.
///
/// Generic over the policy `P` for static dispatch. The oracle is borrowed
/// exclusively for the run, since every step mutates its parameters.
pub struct Engine<'a, P: Strategy, O: FinancialOracle + ?Sized> {
    policy: &'a P,
    scenario: &'a Scenario,
    vehicle: &'a Vehicle,
    oracle: &'a mut O,
    constants: &'a SimConstants,
    state: VehicleState,
    first_year: i32,
}

impl<'a, P: Strategy, O: FinancialOracle + ?Sized> Engine<'a, P, O> {
    /// Creates the engine and pushes the starting parameters into the oracle.
    ///
    /// # Errors
    ///
    /// [`TcoError::ComputationFailed`] when the scenario has no data or the oracle
    /// rejects the starting lifespan.
    pub fn new(
        policy: &'a P,
        scenario: &'a Scenario,
        vehicle: &'a Vehicle,
        oracle: &'a mut O,
        constants: &'a SimConstants,
    ) -> Result<Self, TcoError> {
        let lifespans = oracle.technological_lifespan();
        let state = VehicleState {
            fuel: vehicle.fuel_type,
            age: vehicle.age_in(constants.current_year),
            lifespan: lifespans.for_fuel(vehicle.fuel_type) as i32,
            transitioned_in: None,
        };
        let first_year = scenario
            .first_years(1)
            .next()
            .map_or(constants.current_year, |(year, _)| year);

        let mut engine = Self {
            policy,
            scenario,
            vehicle,
            oracle,
            constants,
            state,
            first_year,
        };
        engine.push_fixed(constants.current_year)?;
        let current = scenario.at_or_nearest(constants.current_year)?;
        engine.oracle.update_variable_parameters(current);
        engine.oracle.input_vehicle_data(vehicle);
        Ok(engine)
    }

    /// Simulates the first [`SIMULATED_YEARS`] scenario years.
    ///
    /// # Errors
    ///
    /// Propagates the first failing [`Engine::step`].
    pub fn run(mut self) -> Result<YearSeries, TcoError> {
        let scenario = self.scenario;
        let mut series = YearSeries::new();
        for (year, _) in scenario.first_years(SIMULATED_YEARS) {
            let record = self.step(year)?;
            series.insert(year, record);
        }
        Ok(series)
    }

    /// Executes one simulated year and returns its record.
    ///
    /// # Errors
    ///
    /// [`TcoError::ComputationFailed`] when parameters cannot be pushed or the
    /// oracle produces no record.
    pub fn step(&mut self, year: i32) -> Result<YearResult, TcoError> {
        let scenario = self.scenario;
        let data = scenario.at_or_nearest(year)?;

        // 1. Yearly economics
        self.oracle.update_variable_parameters(data);
        let optimal_mix_valid = self.oracle.is_optimal_mix_valid();
        let transition_reached = transition_year_reached(&*self.oracle, self.constants.transition_margin);

        // 2. Replacement decision
        let ctx = DecisionContext {
            year,
            fuel: self.state.fuel,
            age: self.state.age,
            lifespan: self.state.lifespan,
            optimal_mix_valid,
            transition_reached,
            extra_years_after_lifespan: self.constants.extra_years_after_lifespan as i32,
        };
        let decision = self.policy.decide(&ctx);
        self.apply(decision, year)?;

        // 3. Kept past end of life
        let state = self.state;
        if state.age > state.lifespan {
            let factor = self.constants.maintenance_factor(state.age, state.lifespan);
            self.oracle.increase_maintenance_factor(state.fuel, factor);
            self.oracle.decrease_yearly_depreciation_costs(state.fuel, state.age);
        } else {
            self.oracle.reset_yearly_depreciation_costs();
        }

        // 4. Zero-emission zone
        if state.fuel == FuelType::Diesel
            && self.vehicle.drives_in_future_ze_zone
            && !is_allowed_in_zone(self.vehicle, state.age, year)
        {
            self.oracle.set_ze_costs(data);
        } else {
            self.oracle.reset_ze_costs();
        }

        // 5. Depot-only charging stays disabled whatever the oracle reports.
        let depot_feasible = self.oracle.is_exclusive_home_loading_valid();
        let depot_exclusive = false;

        // 6. Record
        let record = if state.fuel.is_fossil() {
            self.oracle.tco_diesel(0)?
        } else {
            let marker = state.transitioned_in.unwrap_or(self.first_year);
            self.oracle.tco_electric(depot_exclusive, marker)?
        };
        debug!(
            plate = %self.vehicle.number_plate,
            year,
            fuel = state.fuel.label(),
            age = state.age,
            ?decision,
            depot_feasible,
            tco = record.tco,
            "year simulated"
        );

        self.state.age += 1;
        Ok(record)
    }

    fn apply(&mut self, decision: Replacement, year: i32) -> Result<(), TcoError> {
        let lifespans = self.oracle.technological_lifespan();
        match decision {
            Replacement::Keep => {}
            Replacement::SwitchToElectric => {
                let debt = if self.state.age < self.state.lifespan {
                    self.oracle
                        .calculate_residual_debt(self.state.lifespan as u32, self.state.age)
                } else {
                    0
                };
                self.state = VehicleState {
                    fuel: FuelType::Electric,
                    age: 0,
                    lifespan: lifespans.electric as i32,
                    transitioned_in: Some(year),
                };
                self.push_fixed(year)?;
                if debt > 0 {
                    self.oracle.add_residual_debt(debt);
                }
            }
            Replacement::RenewSameFuel => {
                self.state.age = 0;
                self.state.lifespan = lifespans.for_fuel(self.state.fuel) as i32;
                self.push_fixed(year)?;
            }
        }
        Ok(())
    }

    fn push_fixed(&mut self, year: i32) -> Result<(), TcoError> {
        let lifespan = u32::try_from(self.state.lifespan)
            .map_err(|_| TcoError::ComputationFailed(format!("negative lifespan {}", self.state.lifespan)))?;
        let scenario = self.scenario;
        let current = scenario.at_or_nearest(year)?;
        let end_of_life = year.checked_add(self.state.lifespan).ok_or_else(|| {
            TcoError::ComputationFailed(format!("lifespan {} overflows from {year}", self.state.lifespan))
        })?;
        let future = scenario.at_or_nearest(end_of_life)?;
        self.oracle.update_fixed_parameters(
            lifespan,
            self.vehicle.category.index(),
            self.vehicle.charging_time_depot,
            self.vehicle.charging_time_public,
            self.constants.tax_percentage,
            current,
            future,
        )
    }
}
