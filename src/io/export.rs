//! CSV export of per-vehicle year records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::orchestrator::FleetResults;
use crate::sim::types::YearResult;

/// Key columns preceding the [`YearResult::FIELDS`] columns.
const KEY_HEADER: [&str; 4] = ["number_plate", "scenario", "strategy", "year"];

/// Exports fleet results to a CSV file at the given path.
///
/// One row per vehicle, scenario, strategy and year, in key order, so
/// identical inputs produce identical files. The fleet sum is exported under
/// its `sum` pseudo-plate.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &FleetResults, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes fleet results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &FleetResults, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(KEY_HEADER.iter().chain(YearResult::FIELDS.iter()))?;

    for (plate, scenarios) in results {
        for (scenario, strategies) in scenarios {
            for (strategy, years) in strategies {
                for (year, r) in years {
                    wtr.write_record(&[
                        plate.clone(),
                        scenario.clone(),
                        strategy.name().to_string(),
                        year.to_string(),
                        r.tco.to_string(),
                        r.fixed_vehicle_costs.to_string(),
                        r.variable_vehicle_costs.to_string(),
                        r.write_off_costs_vehicle.to_string(),
                        r.write_off_costs_charging_system.to_string(),
                        r.driver_costs.to_string(),
                        r.costs_public_charging.to_string(),
                        format!("{:.3}", r.co2_emissions),
                        format!("{:.5}", r.particulate_matter_emissions),
                        format!("{:.5}", r.nitrogen_oxide_emissions),
                        format!("{:.2}", r.kwh_charged_on_depot),
                        format!("{:.2}", r.kwh_charged_in_public),
                        format!("{:.2}", r.charging_time_depot),
                        format!("{:.2}", r.charging_time_public),
                        r.transition_year.to_string(),
                    ])?;
                }
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::orchestrator::{ScenarioResults, StrategyResults};
    use crate::sim::strategy::StrategyKind;
    use crate::sim::types::YearSeries;

    fn results(years: i32) -> FleetResults {
        let series: YearSeries = (0..years)
            .map(|i| {
                (
                    2024 + i,
                    YearResult {
                        tco: 1000 + i64::from(i),
                        ..YearResult::default()
                    },
                )
            })
            .collect();
        let mut strategies = StrategyResults::new();
        strategies.insert(StrategyKind::LikeForLike, series);
        let mut scenarios = ScenarioResults::new();
        scenarios.insert("hoog".to_string(), strategies);
        let mut fleet = FleetResults::new();
        fleet.insert("AB-12".to_string(), scenarios);
        fleet
    }

    fn render(results: &FleetResults) -> String {
        let mut buf = Vec::new();
        write_csv(results, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_lists_keys_then_record_fields() {
        let output = render(&results(1));
        let first_line = output.lines().next().unwrap_or("");
        assert!(first_line.starts_with("number_plate,scenario,strategy,year,tco,"));
        assert!(first_line.ends_with(",transition_year"));
        assert_eq!(first_line.split(',').count(), 4 + YearResult::FIELDS.len());
    }

    #[test]
    fn one_row_per_year() {
        let output = render(&results(10));
        assert_eq!(output.lines().count(), 11);
        assert!(output.lines().nth(1).unwrap().starts_with("AB-12,hoog,strategy_2,2024,1000,"));
    }

    #[test]
    fn deterministic_output() {
        assert_eq!(render(&results(5)), render(&results(5)));
    }
}
