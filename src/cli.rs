//! CLI argument definitions and their overlay onto [`RunConfig`].

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, RunConfig};
use crate::sim::orchestrator::CompareMode;

#[derive(Debug, Parser)]
#[command(name = "fleet-tco")]
#[command(version, about = "Fleet electrification total-cost-of-ownership comparison")]
#[command(
    long_about = "Simulates the yearly total cost of ownership of every vehicle in a fleet\n\
    under replacement strategies and cost scenarios, and reports when each\n\
    vehicle switches to electric.\n\
    \nExamples:\n  \
    fleet-tco                                          # demo fleet, all strategies, midden\n  \
    fleet-tco --compare scenarios --strategy strategy_3\n  \
    fleet-tco --fleet fleet.csv --scenarios scenarios.json --csv-out results.csv"
)]
pub struct Cli {
    /// TOML run configuration
    #[arg(long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in preset (demo, demo_scenarios, demo_parity)
    #[arg(long)]
    pub preset: Option<String>,

    /// Fleet file (.csv or .json)
    #[arg(long, requires = "scenarios")]
    pub fleet: Option<PathBuf>,

    /// Scenario set file (.json)
    #[arg(long, requires = "fleet")]
    pub scenarios: Option<PathBuf>,

    /// What to compare: strategies or scenarios
    #[arg(long)]
    pub compare: Option<CompareMode>,

    /// Scenario of a strategy comparison
    #[arg(long)]
    pub scenario: Option<String>,

    /// Strategies of a strategy comparison (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub strategies: Vec<String>,

    /// Strategy of a scenario comparison
    #[arg(long)]
    pub strategy: Option<String>,

    /// Scenarios of a scenario comparison (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub scenario_names: Vec<String>,

    /// Output sections: graphs, input, results (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub output: Vec<String>,

    /// Write the JSON response here instead of stdout
    #[arg(long)]
    pub json_out: Option<PathBuf>,

    /// Export yearly results as CSV
    #[arg(long)]
    pub csv_out: Option<PathBuf>,

    /// Worker threads for the fleet run
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolves the run configuration: file or preset first, flags on top.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unreadable file or unknown preset.
    pub fn resolve(&self) -> Result<RunConfig, ConfigError> {
        let mut cfg = match (&self.config, &self.preset) {
            (Some(path), _) => RunConfig::from_toml_file(path)?,
            (None, Some(name)) => RunConfig::from_preset(name)?,
            (None, None) => RunConfig::demo(),
        };
        self.apply(&mut cfg);
        Ok(cfg)
    }

    fn apply(&self, cfg: &mut RunConfig) {
        if self.fleet.is_some() {
            cfg.input.fleet.clone_from(&self.fleet);
        }
        if self.scenarios.is_some() {
            cfg.input.scenarios.clone_from(&self.scenarios);
        }
        let run = &mut cfg.run;
        if let Some(mode) = self.compare {
            run.compare = mode;
        }
        if let Some(scenario) = &self.scenario {
            run.scenario.clone_from(scenario);
        }
        if !self.strategies.is_empty() {
            run.strategies.clone_from(&self.strategies);
        }
        if self.strategy.is_some() {
            run.strategy.clone_from(&self.strategy);
        }
        if !self.scenario_names.is_empty() {
            run.scenario_names.clone_from(&self.scenario_names);
        }
        if !self.output.is_empty() {
            run.output.clone_from(&self.output);
        }
        if let Some(workers) = self.parallel {
            run.parallel = workers;
        }
    }
}
