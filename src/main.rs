//! Fleet TCO entry point: CLI wiring and config-driven model construction.

use std::fs;
use std::process;

use clap::Parser;
use tracing::info;

use fleet_tco::cli::Cli;
use fleet_tco::config::RunConfig;
use fleet_tco::domain::{Fleet, ScenarioSet};
use fleet_tco::error::TcoError;
use fleet_tco::io::export::export_csv;
use fleet_tco::io::fleet::load_fleet;
use fleet_tco::io::report::format_data;
use fleet_tco::io::scenarios::load_scenarios;
use fleet_tco::logging;
use fleet_tco::oracle::SheetOracle;
use fleet_tco::presets;
use fleet_tco::sim::kpi::KpiReport;
use fleet_tco::sim::orchestrator::{CompareMode, FleetTco, TcoModel};
use fleet_tco::sim::types::SimConstants;

/// Loads the configured fleet and scenario set, or the demo data.
fn load_inputs(cfg: &RunConfig, constants: &SimConstants) -> Result<(Fleet, ScenarioSet), TcoError> {
    match (&cfg.input.fleet, &cfg.input.scenarios) {
        (Some(fleet_path), Some(scenario_path)) => {
            let load = load_fleet(fleet_path, constants.current_year)?;
            for e in &load.errors {
                eprintln!("warning: skipped fleet {e}");
            }
            let scenarios = load_scenarios(scenario_path)?;
            Ok((load.fleet, scenarios))
        }
        _ => {
            info!("no input files configured, using demo fleet and scenarios");
            Ok((presets::demo_fleet(), presets::demo_scenarios(constants.current_year)))
        }
    }
}

/// Runs the configured comparison and returns the model with its result.
fn run_comparison(cfg: &RunConfig) -> Result<(TcoModel<SheetOracle>, FleetTco), TcoError> {
    let constants = cfg.constants();
    let (fleet, scenarios) = load_inputs(cfg, &constants)?;
    let mut model = TcoModel::new(fleet, scenarios, constants, SheetOracle::new());

    let r = &cfg.run;
    let selection = match r.compare {
        CompareMode::Strategies => model.select_strategies(&r.scenario, &r.strategies)?,
        CompareMode::Scenarios => model.select_scenarios(r.strategy.as_deref(), &r.scenario_names)?,
    };
    let tco = if r.parallel > 1 {
        model.run_parallel(&selection, r.parallel, SheetOracle::new)?
    } else {
        model.run(&selection)?
    };
    Ok((model, tco))
}

fn write_outputs(cli: &Cli, cfg: &RunConfig, model: &TcoModel<SheetOracle>, tco: &FleetTco) -> Result<(), TcoError> {
    let data = format_data(&cfg.output_sections(), tco, model.fleet(), model.scenarios())?;
    let json = serde_json::to_string_pretty(&data)?;
    match &cli.json_out {
        Some(path) => {
            fs::write(path, json)?;
            info!(path = %path.display(), "response written");
        }
        None => println!("{json}"),
    }

    if let Some(path) = &cli.csv_out {
        export_csv(&tco.results, path)?;
        info!(path = %path.display(), "yearly results exported");
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Config: --config, then --preset, then demo; flags on top
    let cfg = match cli.resolve() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Validate
    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Build and run
    let (model, tco) = match run_comparison(&cfg) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = write_outputs(&cli, &cfg, &model, &tco) {
        eprintln!("error: {e}");
        process::exit(1);
    }

    // KPI report goes to stderr so stdout stays valid JSON
    eprintln!("\n{}", KpiReport::from_fleet(&tco));
}
