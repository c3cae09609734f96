//! TOML-based run configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::Deserialize;
use thiserror::Error;

use crate::io::report::{OutputSection, parse_sections};
use crate::sim::orchestrator::CompareMode;
use crate::sim::strategy::StrategyKind;
use crate::sim::types::{SIMULATED_YEARS, SimConstants};

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults matching the `demo` preset. Load from TOML with
/// [`RunConfig::from_toml_file`] or pick a preset with [`RunConfig::from_preset`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Simulation constants.
    #[serde(default)]
    pub model: ModelConfig,
    /// What to compare and what to produce.
    #[serde(default)]
    pub run: RunSection,
    /// Where fleet and scenario data come from.
    #[serde(default)]
    pub input: InputConfig,
}

/// Simulation constants shared by every strategy run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Years a fossil vehicle may be kept past its lifespan while waiting for parity.
    pub extra_years_after_lifespan: u32,
    /// Yearly multiplier on maintenance once past lifespan (must be > 0).
    pub increase_factor_after_lifespan: f64,
    /// Relative margin for cost parity (0.0-1.0).
    pub transition_margin: f64,
    /// Corporate tax rate for investment deductions (0.0-1.0).
    pub tax_percentage: f64,
    /// First simulated year; defaults to the current calendar year.
    pub current_year: Option<i32>,
    /// End of the horizon; defaults to `current_year + 10`.
    pub final_year: Option<i32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            extra_years_after_lifespan: 3,
            increase_factor_after_lifespan: 2.0,
            transition_margin: 0.03,
            tax_percentage: 0.25,
            current_year: None,
            final_year: None,
        }
    }
}

/// Comparison request and outputs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// `"strategies"` or `"scenarios"`.
    pub compare: CompareMode,
    /// Scenario of a strategy comparison.
    pub scenario: String,
    /// Strategies of a strategy comparison; empty means all.
    pub strategies: Vec<String>,
    /// Strategy of a scenario comparison; `None` means `strategy_1`.
    pub strategy: Option<String>,
    /// Scenarios of a scenario comparison; empty means all.
    pub scenario_names: Vec<String>,
    /// Output sections: `graphs`, `input`, `results`.
    pub output: Vec<String>,
    /// Worker threads; 0 or 1 runs sequentially.
    pub parallel: usize,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            compare: CompareMode::Strategies,
            scenario: "midden".to_string(),
            strategies: Vec::new(),
            strategy: None,
            scenario_names: Vec::new(),
            output: vec!["graphs".to_string(), "results".to_string()],
            parallel: 0,
        }
    }
}

/// Data sources. Without files the built-in demo fleet and scenarios are used.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Fleet file (`.csv` or `.json`).
    pub fleet: Option<PathBuf>,
    /// Scenario set file (`.json`).
    pub scenarios: Option<PathBuf>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"model.tax_percentage"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl RunConfig {
    /// Returns the demo preset: all strategies against `midden` on the demo data.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Returns the scenario-sweep preset: `strategy_1` against every demo scenario.
    pub fn demo_scenarios() -> Self {
        Self {
            run: RunSection {
                compare: CompareMode::Scenarios,
                strategy: Some(StrategyKind::ElectricAtEndOfLife.name().to_string()),
                ..RunSection::default()
            },
            ..Self::default()
        }
    }

    /// Returns the parity preset: cost-parity strategies under the `hoog`
    /// scenario with a wider margin.
    pub fn demo_parity() -> Self {
        Self {
            model: ModelConfig {
                transition_margin: 0.10,
                ..ModelConfig::default()
            },
            run: RunSection {
                scenario: "hoog".to_string(),
                strategies: [StrategyKind::CostParityAtEndOfLife, StrategyKind::EarlyParity, StrategyKind::ExtendedLife]
                    .iter()
                    .map(|k| k.name().to_string())
                    .collect(),
                ..RunSection::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "demo_scenarios", "demo_parity"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "demo_scenarios" => Ok(Self::demo_scenarios()),
            "demo_parity" => Ok(Self::demo_parity()),
            _ => Err(ConfigError::new(
                "preset",
                format!("unknown preset \"{name}\", available: {}", Self::PRESETS.join(", ")),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Simulation constants, resolving the default years against today.
    pub fn constants(&self) -> SimConstants {
        let m = &self.model;
        let current_year = m.current_year.unwrap_or_else(|| chrono::Local::now().year());
        SimConstants {
            extra_years_after_lifespan: m.extra_years_after_lifespan,
            increase_factor_after_lifespan: m.increase_factor_after_lifespan,
            transition_margin: m.transition_margin,
            tax_percentage: m.tax_percentage,
            current_year,
            final_year: m.final_year.unwrap_or(current_year + SIMULATED_YEARS as i32),
        }
    }

    /// Requested output sections, unsupported names dropped.
    pub fn output_sections(&self) -> Vec<OutputSection> {
        parse_sections(&self.run.output)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let m = &self.model;

        if !(m.increase_factor_after_lifespan.is_finite() && m.increase_factor_after_lifespan > 0.0) {
            errors.push(ConfigError::new("model.increase_factor_after_lifespan", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&m.transition_margin) {
            errors.push(ConfigError::new("model.transition_margin", "must be in [0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&m.tax_percentage) {
            errors.push(ConfigError::new("model.tax_percentage", "must be in [0.0, 1.0]"));
        }
        let c = self.constants();
        if c.final_year <= c.current_year {
            errors.push(ConfigError::new("model.final_year", "must be > model.current_year"));
        }

        let r = &self.run;
        match r.compare {
            CompareMode::Strategies => {
                if r.scenario.trim().is_empty() {
                    errors.push(ConfigError::new("run.scenario", "must name a scenario"));
                }
            }
            CompareMode::Scenarios => {
                if r.scenario_names.iter().any(|s| s.trim().is_empty()) {
                    errors.push(ConfigError::new("run.scenario_names", "must not contain empty names"));
                }
            }
        }
        for name in r.strategies.iter().chain(r.strategy.iter()) {
            if name.parse::<StrategyKind>().is_err() {
                errors.push(ConfigError::new(
                    "run.strategies",
                    format!("unknown strategy \"{name}\", expected strategy_1..strategy_5"),
                ));
            }
        }
        if self.output_sections().is_empty() {
            errors.push(ConfigError::new(
                "run.output",
                "must contain at least one of \"graphs\", \"input\", \"results\"",
            ));
        }

        let i = &self.input;
        if i.fleet.is_some() != i.scenarios.is_some() {
            errors.push(ConfigError::new(
                "input",
                "fleet and scenarios must be given together (or both omitted for demo data)",
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for name in RunConfig::PRESETS {
            let cfg = RunConfig::from_preset(name).unwrap();
            let errors = cfg.validate();
            assert!(errors.is_empty(), "{name} should be valid: {errors:?}");
        }
    }

    #[test]
    fn from_preset_unknown() {
        let e = RunConfig::from_preset("nonexistent").unwrap_err();
        assert!(e.message.contains("unknown preset"));
        assert_eq!(e.field, "preset");
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[model]
extra_years_after_lifespan = 2
increase_factor_after_lifespan = 1.5
transition_margin = 0.05
tax_percentage = 0.2
current_year = 2026

[run]
compare = "scenarios"
strategy = "strategy_3"
scenario_names = ["laag", "hoog"]
output = ["results", "input"]
parallel = 4

[input]
fleet = "data/fleet.csv"
scenarios = "data/scenarios.json"
"#;
        let cfg = RunConfig::from_toml_str(toml).unwrap();
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.run.compare, CompareMode::Scenarios);
        assert_eq!(cfg.run.parallel, 4);
        let c = cfg.constants();
        assert_eq!((c.current_year, c.final_year), (2026, 2036));
        assert_eq!(c.extra_years_after_lifespan, 2);
        assert_eq!(cfg.output_sections(), vec![OutputSection::Input, OutputSection::Results]);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = RunConfig::from_toml_str("[model]\nwarp_factor = 9\n").unwrap_err();
        assert_eq!(err.field, "toml");
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = RunConfig::from_toml_str("[run]\nscenario = \"laag\"\n").unwrap();
        assert_eq!(cfg.model, ModelConfig::default());
        assert_eq!(cfg.run.scenario, "laag");
        assert_eq!(cfg.run.output, vec!["graphs", "results"]);
    }

    #[test]
    fn validation_collects_every_violation() {
        let mut cfg = RunConfig::demo();
        cfg.model.tax_percentage = 1.5;
        cfg.model.current_year = Some(2030);
        cfg.model.final_year = Some(2030);
        cfg.run.strategies = vec!["strategy_9".into()];
        cfg.run.output = vec!["pdf".into()];
        cfg.input.fleet = Some(PathBuf::from("fleet.csv"));
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["model.tax_percentage", "model.final_year", "run.strategies", "run.output", "input"]
        );
    }

    #[test]
    fn default_year_comes_from_clock() {
        let c = RunConfig::demo().constants();
        assert!(c.current_year >= 2024);
        assert_eq!(c.final_year, c.current_year + 10);
    }
}
