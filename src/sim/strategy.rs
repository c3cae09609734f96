//! Replacement strategies: the per-year decision that distinguishes them.
//!
//! Every strategy shares the bookkeeping in [`Engine`]; a strategy only answers
//! what happens to the vehicle at the decision point of a simulated year.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{FuelType, Scenario, Vehicle};
use crate::error::TcoError;
use crate::oracle::FinancialOracle;

use super::engine::Engine;
use super::types::{SimConstants, YearSeries};

/// Outcome of the replacement decision for one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// Keep the current vehicle in operation.
    Keep,
    /// Replace by a new electric vehicle.
    SwitchToElectric,
    /// Replace by a new vehicle of the current fuel type.
    RenewSameFuel,
}

/// What a strategy knows when deciding about one simulated year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionContext {
    pub year: i32,
    pub fuel: FuelType,
    pub age: i32,
    pub lifespan: i32,
    /// Oracle reports a feasible mix of depot and public charging.
    pub optimal_mix_valid: bool,
    /// Electric is within the transition margin of diesel this year.
    pub transition_reached: bool,
    pub extra_years_after_lifespan: i32,
}

impl DecisionContext {
    pub fn end_of_life(&self) -> bool {
        self.age >= self.lifespan
    }
}

/// A replacement policy over {scenario, vehicle, oracle, constants}.
pub trait Strategy {
    fn decide(&self, ctx: &DecisionContext) -> Replacement;

    /// Simulates the first scenario years and returns one record per year.
    ///
    /// # Errors
    ///
    /// [`TcoError::ComputationFailed`] when the oracle cannot produce a year record
    /// or the scenario has no data to push.
    fn calculate_tco<O: FinancialOracle + ?Sized>(
        &self,
        scenario: &Scenario,
        vehicle: &Vehicle,
        oracle: &mut O,
        constants: &SimConstants,
    ) -> Result<YearSeries, TcoError>
    where
        Self: Sized,
    {
        Engine::new(self, scenario, vehicle, oracle, constants)?.run()
    }
}

/// Diesel is replaced by electric at end of life as soon as charging is
/// feasible; no new diesel is ever bought.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElectricAtEndOfLife;

impl Strategy for ElectricAtEndOfLife {
    fn decide(&self, ctx: &DecisionContext) -> Replacement {
        if !ctx.end_of_life() {
            return Replacement::Keep;
        }
        if ctx.fuel.is_fossil() && ctx.optimal_mix_valid {
            Replacement::SwitchToElectric
        } else if ctx.fuel.is_electric() {
            Replacement::RenewSameFuel
        } else {
            Replacement::Keep
        }
    }
}

/// Every vehicle is replaced at end of life by one with the same fuel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LikeForLike;

impl Strategy for LikeForLike {
    fn decide(&self, ctx: &DecisionContext) -> Replacement {
        if ctx.end_of_life() {
            Replacement::RenewSameFuel
        } else {
            Replacement::Keep
        }
    }
}

/// At end of life, go electric only when it is cost-competitive; otherwise buy
/// a new vehicle of the same fuel.
#[derive(Debug, Default, Clone, Copy)]
pub struct CostParityAtEndOfLife;

impl Strategy for CostParityAtEndOfLife {
    fn decide(&self, ctx: &DecisionContext) -> Replacement {
        if !ctx.end_of_life() {
            return Replacement::Keep;
        }
        if ctx.fuel.is_fossil() && ctx.transition_reached {
            Replacement::SwitchToElectric
        } else {
            Replacement::RenewSameFuel
        }
    }
}

/// Switch to electric in the first cost-competitive year, even before end of
/// life; otherwise renew at end of life.
#[derive(Debug, Default, Clone, Copy)]
pub struct EarlyParity;

impl Strategy for EarlyParity {
    fn decide(&self, ctx: &DecisionContext) -> Replacement {
        if ctx.fuel.is_fossil() && ctx.transition_reached {
            Replacement::SwitchToElectric
        } else if ctx.end_of_life() {
            Replacement::RenewSameFuel
        } else {
            Replacement::Keep
        }
    }
}

/// Keep a fossil vehicle past end of life while waiting for cost parity, up to
/// `extra_years_after_lifespan`; then take whatever is feasible.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtendedLife;

impl Strategy for ExtendedLife {
    fn decide(&self, ctx: &DecisionContext) -> Replacement {
        if !ctx.end_of_life() {
            return Replacement::Keep;
        }
        if ctx.fuel.is_electric() {
            return Replacement::RenewSameFuel;
        }
        if ctx.optimal_mix_valid && ctx.transition_reached {
            return Replacement::SwitchToElectric;
        }
        if ctx.age - ctx.lifespan < ctx.extra_years_after_lifespan {
            Replacement::Keep
        } else if ctx.optimal_mix_valid {
            Replacement::SwitchToElectric
        } else {
            Replacement::RenewSameFuel
        }
    }
}

/// Closed set of strategies, addressed by name at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "strategy_1")]
    ElectricAtEndOfLife,
    #[serde(rename = "strategy_2")]
    LikeForLike,
    #[serde(rename = "strategy_3")]
    CostParityAtEndOfLife,
    #[serde(rename = "strategy_4")]
    EarlyParity,
    #[serde(rename = "strategy_5")]
    ExtendedLife,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::ElectricAtEndOfLife,
        Self::LikeForLike,
        Self::CostParityAtEndOfLife,
        Self::EarlyParity,
        Self::ExtendedLife,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ElectricAtEndOfLife => "strategy_1",
            Self::LikeForLike => "strategy_2",
            Self::CostParityAtEndOfLife => "strategy_3",
            Self::EarlyParity => "strategy_4",
            Self::ExtendedLife => "strategy_5",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ElectricAtEndOfLife => "switch to electric at end of life when charging is feasible",
            Self::LikeForLike => "replace with the same fuel type at end of life",
            Self::CostParityAtEndOfLife => "switch at end of life only when electric is cost-competitive",
            Self::EarlyParity => "switch in the first cost-competitive year, even before end of life",
            Self::ExtendedLife => "keep past end of life while waiting for cost parity",
        }
    }

    /// Runs this strategy for one vehicle and scenario.
    ///
    /// # Errors
    ///
    /// Propagates [`Strategy::calculate_tco`] failures.
    pub fn calculate_tco<O: FinancialOracle + ?Sized>(
        self,
        scenario: &Scenario,
        vehicle: &Vehicle,
        oracle: &mut O,
        constants: &SimConstants,
    ) -> Result<YearSeries, TcoError> {
        match self {
            Self::ElectricAtEndOfLife => ElectricAtEndOfLife.calculate_tco(scenario, vehicle, oracle, constants),
            Self::LikeForLike => LikeForLike.calculate_tco(scenario, vehicle, oracle, constants),
            Self::CostParityAtEndOfLife => CostParityAtEndOfLife.calculate_tco(scenario, vehicle, oracle, constants),
            Self::EarlyParity => EarlyParity.calculate_tco(scenario, vehicle, oracle, constants),
            Self::ExtendedLife => ExtendedLife.calculate_tco(scenario, vehicle, oracle, constants),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = TcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| TcoError::invalid_strategy(s))
    }
}

/// Whether electric is cost-competitive with diesel under the current oracle state.
///
/// A branch counts as within margin only when both its total and the diesel total
/// are determined and non-zero, and it exceeds diesel by less than
/// `margin * trunc(diesel)`.
pub fn transition_year_reached<O: FinancialOracle + ?Sized>(oracle: &O, margin: f64) -> bool {
    let scenario_valid = oracle.is_optimal_mix_valid();
    let depot_possible = oracle.is_exclusive_home_loading_valid();
    let diesel = oracle.total_tco_diesel().filter(|v| *v != 0.0);
    let threshold = margin * diesel.map_or(0.0, f64::trunc);

    let within_margin = |branch: Option<f64>| match (branch.filter(|v| *v != 0.0), diesel) {
        (Some(b), Some(d)) => b - d < threshold,
        _ => false,
    };

    if !scenario_valid {
        false
    } else if depot_possible {
        within_margin(oracle.total_tco_depot_charging())
    } else {
        within_margin(oracle.total_tco_optimal_mix())
    }
}
