//! Fleet-level orchestration: runs every (vehicle, scenario, strategy)
//! combination, folds the fleet sum and derives transition years.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Fleet, ScenarioSet, Vehicle};
use crate::error::TcoError;
use crate::oracle::FinancialOracle;

use super::strategy::StrategyKind;
use super::types::{SimConstants, YearSeries};

/// Pseudo-plate under which the fleet sum is stored next to real vehicles.
pub const SUM_KEY: &str = "sum";

pub type StrategyResults = BTreeMap<StrategyKind, YearSeries>;
pub type ScenarioResults = BTreeMap<String, StrategyResults>;
/// Plate (or [`SUM_KEY`]) to scenario to strategy to year.
pub type FleetResults = BTreeMap<String, ScenarioResults>;
pub type TransitionYears = BTreeMap<String, BTreeMap<String, BTreeMap<StrategyKind, TransitionYear>>>;

/// Which axis a request compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Several strategies against one scenario.
    #[default]
    Strategies,
    /// One strategy against several scenarios.
    Scenarios,
}

impl std::str::FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strategies" => Ok(Self::Strategies),
            "scenarios" => Ok(Self::Scenarios),
            other => Err(format!("unknown comparison \"{other}\" (expected strategies or scenarios)")),
        }
    }
}

/// Resolved combinations of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub scenarios: Vec<String>,
    pub strategies: Vec<StrategyKind>,
}

impl Selection {
    fn combinations(&self) -> usize {
        self.scenarios.len() * self.strategies.len()
    }
}

/// First year in which a vehicle runs electric after a replacement, or the
/// `">"`-prefixed last horizon year when it never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransitionYear {
    Year(i32),
    Beyond(String),
}

impl TransitionYear {
    pub fn beyond(final_year: i32) -> Self {
        Self::Beyond(format!(">{}", final_year - 1))
    }
}

impl fmt::Display for TransitionYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(y) => write!(f, "{y}"),
            Self::Beyond(s) => f.write_str(s),
        }
    }
}

/// Outcome of one comparison request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetTco {
    /// Per-vehicle results plus the fleet sum under [`SUM_KEY`].
    pub results: FleetResults,
    pub transition_year: TransitionYears,
}

impl FleetTco {
    pub fn sum(&self) -> Option<&ScenarioResults> {
        self.results.get(SUM_KEY)
    }
}

/// TCO model over one fleet and scenario set, driving one owned oracle.
pub struct TcoModel<O: FinancialOracle> {
    fleet: Fleet,
    scenarios: ScenarioSet,
    constants: SimConstants,
    oracle: O,
}

impl<O: FinancialOracle> TcoModel<O> {
    pub fn new(fleet: Fleet, scenarios: ScenarioSet, constants: SimConstants, oracle: O) -> Self {
        Self {
            fleet,
            scenarios,
            constants,
            oracle,
        }
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn scenarios(&self) -> &ScenarioSet {
        &self.scenarios
    }

    pub fn constants(&self) -> &SimConstants {
        &self.constants
    }

    /// Oracle used by sequential runs.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Resolves a strategy comparison against `scenario_name`; an empty
    /// `strategy_names` selects every strategy.
    ///
    /// # Errors
    ///
    /// [`TcoError::InvalidSelection`] for an unknown scenario or strategy name.
    pub fn select_strategies(&self, scenario_name: &str, strategy_names: &[String]) -> Result<Selection, TcoError> {
        if !self.scenarios.contains(scenario_name) {
            return Err(TcoError::invalid_scenario(scenario_name));
        }
        let strategies = if strategy_names.is_empty() {
            StrategyKind::ALL.to_vec()
        } else {
            let mut kinds = strategy_names
                .iter()
                .map(|name| name.parse::<StrategyKind>())
                .collect::<Result<Vec<_>, _>>()?;
            kinds.sort();
            kinds.dedup();
            kinds
        };
        Ok(Selection {
            scenarios: vec![scenario_name.to_string()],
            strategies,
        })
    }

    /// Resolves a scenario comparison for `strategy_name` (default `strategy_1`);
    /// an empty `scenario_names` selects every scenario in the set.
    ///
    /// # Errors
    ///
    /// [`TcoError::InvalidSelection`] for an unknown scenario or strategy name.
    pub fn select_scenarios(&self, strategy_name: Option<&str>, scenario_names: &[String]) -> Result<Selection, TcoError> {
        let strategy = match strategy_name.filter(|s| !s.trim().is_empty()) {
            Some(name) => name.parse::<StrategyKind>()?,
            None => StrategyKind::ElectricAtEndOfLife,
        };
        let scenarios = if scenario_names.is_empty() {
            self.scenarios.names().map(str::to_string).collect()
        } else {
            let mut names = Vec::with_capacity(scenario_names.len());
            for name in scenario_names {
                if !self.scenarios.contains(name) {
                    return Err(TcoError::invalid_scenario(name));
                }
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            names
        };
        Ok(Selection {
            scenarios,
            strategies: vec![strategy],
        })
    }

    /// Runs the selected strategies for one scenario over the whole fleet.
    ///
    /// # Errors
    ///
    /// Selection errors, or the first failing combination.
    pub fn compare_strategies(&mut self, scenario_name: &str, strategy_names: &[String]) -> Result<FleetTco, TcoError> {
        let selection = self.select_strategies(scenario_name, strategy_names)?;
        self.run(&selection)
    }

    /// Runs one strategy for the selected scenarios over the whole fleet.
    ///
    /// # Errors
    ///
    /// Selection errors, or the first failing combination.
    pub fn compare_scenarios(&mut self, strategy_name: Option<&str>, scenario_names: &[String]) -> Result<FleetTco, TcoError> {
        let selection = self.select_scenarios(strategy_name, scenario_names)?;
        self.run(&selection)
    }

    /// Runs `selection` sequentially on the owned oracle.
    ///
    /// # Errors
    ///
    /// The first failing combination.
    pub fn run(&mut self, selection: &Selection) -> Result<FleetTco, TcoError> {
        info!(
            vehicles = self.fleet.len(),
            combinations = selection.combinations(),
            "starting TCO sweep"
        );
        let mut results = FleetResults::new();
        for (plate, vehicle) in &self.fleet {
            let vehicle_results =
                calculate_tco(vehicle, &self.scenarios, selection, &mut self.oracle, &self.constants)?;
            results.insert(plate.clone(), vehicle_results);
        }
        Ok(self.finish(results))
    }

    /// Runs `selection` on a pool of `workers` threads, partitioned by vehicle.
    ///
    /// Each worker owns an oracle built by `make_oracle`. Results are keyed by
    /// plate, so the outcome equals [`Self::run`].
    ///
    /// # Errors
    ///
    /// [`TcoError::ComputationFailed`] when the pool cannot start, otherwise a
    /// failing combination of any worker.
    pub fn run_parallel<F>(&self, selection: &Selection, workers: usize, make_oracle: F) -> Result<FleetTco, TcoError>
    where
        F: Fn() -> O + Sync + Send,
    {
        let workers = workers.clamp(1, self.fleet.len().max(1));
        info!(
            vehicles = self.fleet.len(),
            combinations = selection.combinations(),
            workers,
            "starting parallel TCO sweep"
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| TcoError::ComputationFailed(format!("worker pool: {e}")))?;

        let fleet = &self.fleet;
        let scenarios = &self.scenarios;
        let constants = &self.constants;
        let results = pool.install(|| {
            fleet
                .par_iter()
                .map_init(&make_oracle, |oracle, (plate, vehicle)| {
                    calculate_tco(vehicle, scenarios, selection, oracle, constants).map(|r| (plate.clone(), r))
                })
                .collect::<Result<FleetResults, TcoError>>()
        })?;
        Ok(self.finish(results))
    }

    fn finish(&self, mut results: FleetResults) -> FleetTco {
        let sum = calculate_fleet_sum(&results);
        results.insert(SUM_KEY.to_string(), sum);
        let transition_year = calculate_transition_year(&results, self.constants.final_year);
        FleetTco {
            results,
            transition_year,
        }
    }
}

/// Runs every selected combination for one vehicle.
///
/// The oracle is reset and loaded with the vehicle before, and its lifespans
/// reset after, every combination.
///
/// # Errors
///
/// [`TcoError::NotFound`] when a scenario lacks the vehicle's category, or the
/// combination's computation error.
pub fn calculate_tco<O: FinancialOracle + ?Sized>(
    vehicle: &Vehicle,
    scenarios: &ScenarioSet,
    selection: &Selection,
    oracle: &mut O,
    constants: &SimConstants,
) -> Result<ScenarioResults, TcoError> {
    let mut results = ScenarioResults::new();
    for scenario_name in &selection.scenarios {
        let scenario = scenarios.get(scenario_name, vehicle.category)?;
        let per_strategy = results.entry(scenario_name.clone()).or_default();
        for kind in &selection.strategies {
            oracle.reset();
            oracle.input_vehicle_data(vehicle);
            let series = kind.calculate_tco(scenario, vehicle, oracle, constants)?;
            oracle.reset_technological_lifespan();
            debug!(
                plate = %vehicle.number_plate,
                scenario = %scenario_name,
                strategy = %kind,
                years = series.len(),
                "combination done"
            );
            per_strategy.insert(*kind, series);
        }
    }
    Ok(results)
}

/// Element-wise sum over all real vehicles, scenario by strategy by year.
///
/// Keys are created when first seen, so the sum only holds combinations some
/// vehicle produced. The example row and an existing sum are skipped.
pub fn calculate_fleet_sum(results: &FleetResults) -> ScenarioResults {
    let mut sums = ScenarioResults::new();
    for (plate, scenarios) in results {
        if is_pseudo_entry(plate) {
            continue;
        }
        for (scenario, strategies) in scenarios {
            let scenario_sum = sums.entry(scenario.clone()).or_default();
            for (strategy, years) in strategies {
                let strategy_sum = scenario_sum.entry(*strategy).or_default();
                for (year, record) in years {
                    strategy_sum
                        .entry(*year)
                        .and_modify(|acc| *acc += record)
                        .or_insert(*record);
                }
            }
        }
    }
    sums
}

/// First year with a non-zero transition marker per vehicle, scenario and strategy.
pub fn calculate_transition_year(results: &FleetResults, final_year: i32) -> TransitionYears {
    let mut out = TransitionYears::new();
    for (plate, scenarios) in results {
        if is_pseudo_entry(plate) {
            continue;
        }
        let per_vehicle = out.entry(plate.clone()).or_default();
        for (scenario, strategies) in scenarios {
            let per_scenario = per_vehicle.entry(scenario.clone()).or_default();
            for (strategy, years) in strategies {
                let year = years
                    .iter()
                    .find(|(_, record)| record.has_transitioned())
                    .map_or_else(|| TransitionYear::beyond(final_year), |(y, _)| TransitionYear::Year(*y));
                per_scenario.insert(*strategy, year);
            }
        }
    }
    out
}

fn is_pseudo_entry(plate: &str) -> bool {
    plate == SUM_KEY || crate::domain::vehicle::is_example_plate(plate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EXAMPLE_PLATE;
    use crate::sim::types::YearResult;

    fn series(markers: &[(i32, i32)]) -> YearSeries {
        markers
            .iter()
            .map(|(year, marker)| {
                (
                    *year,
                    YearResult {
                        tco: 1000,
                        co2_emissions: 2.5,
                        transition_year: *marker,
                        ..YearResult::default()
                    },
                )
            })
            .collect()
    }

    fn results(entries: &[(&str, YearSeries)]) -> FleetResults {
        entries
            .iter()
            .map(|(plate, s)| {
                let mut strategies = StrategyResults::new();
                strategies.insert(StrategyKind::ElectricAtEndOfLife, s.clone());
                let mut scenarios = ScenarioResults::new();
                scenarios.insert("midden".to_string(), strategies);
                (plate.to_string(), scenarios)
            })
            .collect()
    }

    #[test]
    fn transition_year_is_first_non_zero_marker() {
        let r = results(&[("AB-12", series(&[(2024, 0), (2025, 0), (2026, 5)]))]);
        let t = calculate_transition_year(&r, 2034);
        assert_eq!(
            t["AB-12"]["midden"][&StrategyKind::ElectricAtEndOfLife],
            TransitionYear::Year(2026)
        );
    }

    #[test]
    fn transition_year_sentinel_when_never_electric() {
        let r = results(&[("AB-12", series(&[(2024, 0), (2025, 0)]))]);
        let t = calculate_transition_year(&r, 2034);
        let year = &t["AB-12"]["midden"][&StrategyKind::ElectricAtEndOfLife];
        assert_eq!(year, &TransitionYear::Beyond(">2033".to_string()));
        assert_eq!(serde_json::to_string(year).unwrap(), "\">2033\"");
    }

    #[test]
    fn fleet_sum_skips_example_and_sum() {
        let r = results(&[
            ("AB-12", series(&[(2024, 0), (2025, 0)])),
            ("CD-34", series(&[(2024, 0), (2026, 0)])),
            (EXAMPLE_PLATE, series(&[(2024, 0)])),
            (SUM_KEY, series(&[(2024, 0)])),
        ]);
        let sum = calculate_fleet_sum(&r);
        let years = &sum["midden"][&StrategyKind::ElectricAtEndOfLife];
        assert_eq!(years[&2024].tco, 2000);
        assert!((years[&2024].co2_emissions - 5.0).abs() < 1e-9);
        assert_eq!(years[&2025].tco, 1000);
        assert_eq!(years[&2026].tco, 1000);
    }

    #[test]
    fn transition_year_skips_pseudo_entries() {
        let r = results(&[
            (EXAMPLE_PLATE, series(&[(2024, 2024)])),
            (SUM_KEY, series(&[(2024, 2024)])),
        ]);
        assert!(calculate_transition_year(&r, 2034).is_empty());
    }

    #[test]
    fn compare_mode_parses_case_insensitively() {
        assert_eq!("Scenarios".parse::<CompareMode>().unwrap(), CompareMode::Scenarios);
        assert!("fleets".parse::<CompareMode>().is_err());
    }
}
