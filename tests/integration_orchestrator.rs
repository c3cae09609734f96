//! Integration tests for fleet comparisons: sums, transition years, selections.

mod common;

use common::{Call, DIESEL_TCO, FIRST_YEAR, ScriptedOracle};
use fleet_tco::domain::{EXAMPLE_PLATE, Fleet, FuelType, Vehicle};
use fleet_tco::error::TcoError;
use fleet_tco::io::report::{OutputSection, format_data, parse_sections};
use fleet_tco::oracle::SheetOracle;
use fleet_tco::presets;
use fleet_tco::sim::kpi::KpiReport;
use fleet_tco::sim::orchestrator::{SUM_KEY, TcoModel, TransitionYear};
use fleet_tco::sim::strategy::StrategyKind;
use fleet_tco::sim::types::SimConstants;

fn fleet(vehicles: Vec<Vehicle>) -> Fleet {
    vehicles.into_iter().map(|v| (v.number_plate.clone(), v)).collect()
}

fn model(vehicles: Vec<Vehicle>, oracle: ScriptedOracle) -> TcoModel<ScriptedOracle> {
    TcoModel::new(fleet(vehicles), common::scenarios(), common::constants(), oracle)
}

fn two_vans_and_example() -> Vec<Vehicle> {
    vec![
        common::diesel_van("AA-01-BB", 5),
        common::diesel_van("AA-02-BB", 1),
        common::diesel_van(EXAMPLE_PLATE, 2),
    ]
}

#[test]
fn strategy_comparison_covers_every_vehicle_and_strategy() {
    let mut m = model(two_vans_and_example(), ScriptedOracle::default());
    let tco = m.compare_strategies("midden", &[]).unwrap();

    assert_eq!(tco.results.len(), 4);
    for (plate, scenarios) in &tco.results {
        let strategies = &scenarios["midden"];
        assert_eq!(strategies.len(), StrategyKind::ALL.len(), "{plate}");
    }
}

#[test]
fn fleet_sum_excludes_example_row() {
    let mut m = model(two_vans_and_example(), ScriptedOracle::default());
    let tco = m.compare_strategies("midden", &["strategy_2".to_string()]).unwrap();

    let sum = &tco.results[SUM_KEY]["midden"][&StrategyKind::LikeForLike];
    assert_eq!(sum.len(), 10);
    assert!(sum.values().all(|r| r.tco == 2 * DIESEL_TCO));
}

#[test]
fn transition_years_per_vehicle() {
    let mut m = model(two_vans_and_example(), ScriptedOracle::default());
    let tco = m.compare_strategies("midden", &["strategy_1".to_string()]).unwrap();

    let year = |plate: &str| tco.transition_year[plate]["midden"][&StrategyKind::ElectricAtEndOfLife].clone();
    assert_eq!(year("AA-01-BB"), TransitionYear::Year(2028));
    assert_eq!(year("AA-02-BB"), TransitionYear::Year(2032));
    assert!(!tco.transition_year.contains_key(EXAMPLE_PLATE));
    assert!(!tco.transition_year.contains_key(SUM_KEY));
}

#[test]
fn vehicle_that_never_switches_gets_sentinel() {
    let mut m = model(vec![common::diesel_van("AA-01-BB", 7)], ScriptedOracle::infeasible());
    let tco = m.compare_strategies("midden", &["strategy_1".to_string()]).unwrap();
    let year = &tco.transition_year["AA-01-BB"]["midden"][&StrategyKind::ElectricAtEndOfLife];
    assert_eq!(year, &TransitionYear::Beyond(format!(">{}", FIRST_YEAR + 9)));
    assert_eq!(serde_json::to_value(year).unwrap(), serde_json::json!(">2035"));
}

#[test]
fn oracle_is_reset_before_every_combination() {
    let mut m = model(two_vans_and_example(), ScriptedOracle::default());
    m.compare_strategies("midden", &["strategy_1".to_string(), "strategy_3".to_string()])
        .unwrap();
    let oracle = m.oracle();
    assert_eq!(oracle.count(|c| matches!(c, Call::Reset)), 3 * 2);
    assert_eq!(oracle.count(|c| matches!(c, Call::VehicleData(_))), 3 * 2);
}

#[test]
fn scenario_comparison_defaults_to_first_strategy_and_all_scenarios() {
    let mut m = model(vec![common::diesel_van("AA-01-BB", 5)], ScriptedOracle::default());
    let tco = m.compare_scenarios(None, &[]).unwrap();
    let per_scenario = &tco.results["AA-01-BB"];
    let names: Vec<&str> = per_scenario.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["hoog", "laag", "midden"]);
    assert!(per_scenario
        .values()
        .all(|s| s.keys().copied().collect::<Vec<_>>() == vec![StrategyKind::ElectricAtEndOfLife]));
}

#[test]
fn unknown_names_are_invalid_selections() {
    let mut m = model(two_vans_and_example(), ScriptedOracle::default());
    let err = m.compare_strategies("extreem", &[]).unwrap_err();
    assert!(matches!(err, TcoError::InvalidSelection { kind: "scenario", .. }));

    let err = m
        .compare_strategies("midden", &["strategy_9".to_string()])
        .unwrap_err();
    assert!(matches!(err, TcoError::InvalidSelection { kind: "strategy", .. }));

    let err = m
        .compare_scenarios(Some("strategy_2"), &["laag".to_string(), "extreem".to_string()])
        .unwrap_err();
    assert!(err.is_user_error());
}

#[test]
fn parallel_run_matches_sequential_run() {
    let vehicles = vec![
        common::diesel_van("AA-01-BB", 5),
        common::diesel_van("AA-02-BB", 1),
        common::diesel_van("AA-03-BB", 7),
        Vehicle {
            fuel_type: FuelType::Electric,
            ..common::diesel_van("EV-01-BB", 3)
        },
        common::diesel_van(EXAMPLE_PLATE, 2),
    ];
    let mut m = model(vehicles, ScriptedOracle::at_parity());
    let selection = m.select_strategies("midden", &[]).unwrap();
    let sequential = m.run(&selection).unwrap();
    for workers in [1, 2, 3, 16] {
        let parallel = m.run_parallel(&selection, workers, ScriptedOracle::at_parity).unwrap();
        assert_eq!(parallel, sequential, "workers={workers}");
    }
}

#[test]
fn missing_category_in_scenario_is_not_found() {
    let mut scenarios = fleet_tco::domain::ScenarioSet::new();
    scenarios.insert(
        "midden",
        presets::demo_scenario("midden", fleet_tco::domain::VehicleCategory::SmallVan, FIRST_YEAR, 10),
    );
    let mut m = TcoModel::new(
        fleet(vec![common::diesel_van("AA-01-BB", 5)]),
        scenarios,
        common::constants(),
        ScriptedOracle::default(),
    );
    let err = m.compare_strategies("midden", &[]).unwrap_err();
    assert!(matches!(err, TcoError::NotFound(_)));
}

#[test]
fn unsupported_output_is_rejected() {
    let mut m = model(two_vans_and_example(), ScriptedOracle::default());
    let tco = m.compare_strategies("midden", &[]).unwrap();
    let err = format_data(&parse_sections(&["pdf"]), &tco, m.fleet(), m.scenarios()).unwrap_err();
    assert!(matches!(err, TcoError::OutputNotSupported));

    let out = format_data(&[OutputSection::Results], &tco, m.fleet(), m.scenarios()).unwrap();
    assert_eq!(out["transition_year"]["AA-01-BB"]["midden"]["strategy_1"], 2028);
    assert!(out["results"][SUM_KEY]["midden"]["strategy_2"]["2026"]["tco"].is_i64());
}

#[test]
fn demo_fleet_runs_end_to_end_on_sheet_oracle() {
    let constants = SimConstants::for_year(FIRST_YEAR);
    let mut m = TcoModel::new(
        presets::demo_fleet(),
        presets::demo_scenarios(FIRST_YEAR),
        constants,
        SheetOracle::new(),
    );
    let tco = m.compare_strategies("midden", &[]).unwrap();

    let sum = tco.sum().unwrap();
    for (strategy, years) in &sum["midden"] {
        assert_eq!(years.len(), 10, "{strategy}");
        assert!(years.values().all(|r| r.tco > 0), "{strategy}");
    }
    // the electric van starts electric
    let ev = &tco.transition_year["EV-77-BB"]["midden"][&StrategyKind::LikeForLike];
    assert_eq!(ev, &TransitionYear::Year(FIRST_YEAR));

    let kpi = KpiReport::from_fleet(&tco);
    assert_eq!(kpi.rows.len(), StrategyKind::ALL.len());
    assert_eq!(kpi.vehicle_count, 5);
    assert!(kpi.cheapest().is_some());
}

#[test]
fn parallel_run_surfaces_failing_vehicle() {
    let vehicles = vec![
        common::diesel_van("AA-01-BB", 5),
        Vehicle {
            technological_lifespan: 16,
            ..common::diesel_van("AA-02-BB", 2)
        },
        common::diesel_van("AA-03-BB", 1),
    ];
    let m = model(vehicles, ScriptedOracle::default());
    let selection = m.select_strategies("midden", &[]).unwrap();
    for workers in [1, 2, 3] {
        let err = m.run_parallel(&selection, workers, ScriptedOracle::default).unwrap_err();
        assert!(matches!(err, TcoError::ComputationFailed(_)), "workers={workers}: {err}");
    }
}
