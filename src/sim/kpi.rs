//! Fleet KPIs derived post-hoc from a completed comparison.

use std::fmt;

use serde::Serialize;

use super::orchestrator::{FleetTco, ScenarioResults, TransitionYear};
use super::strategy::StrategyKind;
use super::types::YearSeries;

/// Horizon totals of the fleet sum for one scenario and strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRow {
    pub scenario: String,
    pub strategy: StrategyKind,
    /// Sum of yearly TCO over the simulated horizon (euro).
    pub cumulative_tco: i64,
    /// Sum of yearly CO2 emissions (kg).
    pub cumulative_co2_kg: f64,
    /// Total kWh charged at the depot and in public.
    pub energy_charged_kwh: f64,
    /// Real vehicles that ended up electric within the horizon.
    pub vehicles_transitioned: usize,
}

/// One [`KpiRow`] per scenario and strategy of the fleet sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub rows: Vec<KpiRow>,
    pub vehicle_count: usize,
}

impl KpiReport {
    /// Computes the report from the fleet sum and transition years of `tco`.
    pub fn from_fleet(tco: &FleetTco) -> Self {
        let empty = ScenarioResults::new();
        let sum = tco.sum().unwrap_or(&empty);
        let mut rows = Vec::new();
        for (scenario, strategies) in sum {
            for (strategy, years) in strategies {
                let vehicles_transitioned = tco
                    .transition_year
                    .values()
                    .filter_map(|per_scenario| per_scenario.get(scenario)?.get(strategy))
                    .filter(|year| matches!(year, TransitionYear::Year(_)))
                    .count();
                rows.push(row(scenario, *strategy, years, vehicles_transitioned));
            }
        }
        Self {
            rows,
            vehicle_count: tco.transition_year.len(),
        }
    }

    /// Row with the lowest cumulative TCO, if any.
    pub fn cheapest(&self) -> Option<&KpiRow> {
        self.rows.iter().min_by_key(|r| r.cumulative_tco)
    }
}

fn row(scenario: &str, strategy: StrategyKind, years: &YearSeries, vehicles_transitioned: usize) -> KpiRow {
    let mut cumulative_tco = 0_i64;
    let mut co2 = 0.0;
    let mut energy = 0.0;
    for r in years.values() {
        cumulative_tco += r.tco;
        co2 += r.co2_emissions;
        energy += r.kwh_charged_on_depot + r.kwh_charged_in_public;
    }
    KpiRow {
        scenario: scenario.to_string(),
        strategy,
        cumulative_tco,
        cumulative_co2_kg: co2,
        energy_charged_kwh: energy,
        vehicles_transitioned,
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Fleet KPI Report ({} vehicles) ---", self.vehicle_count)?;
        writeln!(
            f,
            "{:<10} {:<11} {:>14} {:>14} {:>14} {:>8}",
            "scenario", "strategy", "TCO (EUR)", "CO2 (t)", "charged (MWh)", "electric"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<10} {:<11} {:>14} {:>14.1} {:>14.1} {:>8}",
                r.scenario,
                r.strategy.name(),
                r.cumulative_tco,
                r.cumulative_co2_kg / 1000.0,
                r.energy_charged_kwh / 1000.0,
                r.vehicles_transitioned
            )?;
        }
        match self.cheapest() {
            Some(best) => write!(
                f,
                "Cheapest: {} / {} ({})",
                best.scenario,
                best.strategy,
                best.strategy.description()
            ),
            None => write!(f, "Cheapest: n/a"),
        }
    }
}
