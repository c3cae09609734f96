//! Response formatting: assembles the requested output sections.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Fleet, ScenarioSet};
use crate::error::TcoError;
use crate::sim::orchestrator::FleetTco;

const GRAPHS_UNAVAILABLE: &str = "Graphs are not rendered by this tool.";

/// A section a caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSection {
    Graphs,
    Input,
    Results,
}

impl OutputSection {
    /// Sections produced when a request names none.
    pub const DEFAULT: [OutputSection; 2] = [Self::Graphs, Self::Results];
}

impl FromStr for OutputSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "graphs" => Ok(Self::Graphs),
            "input" => Ok(Self::Input),
            "results" => Ok(Self::Results),
            other => Err(format!("unsupported output \"{other}\"")),
        }
    }
}

/// Parses requested section names, dropping unsupported ones.
pub fn parse_sections<S: AsRef<str>>(names: &[S]) -> Vec<OutputSection> {
    let mut sections: Vec<OutputSection> = names.iter().filter_map(|n| n.as_ref().parse().ok()).collect();
    sections.sort();
    sections.dedup();
    sections
}

/// Builds the response object for `sections`.
///
/// `input` echoes the fleet (`original_fleet`) and scenario set (`scenarios`);
/// `results` holds per-vehicle results with the fleet sum plus
/// `transition_year`; `graphs` is acknowledged with a notice.
///
/// # Errors
///
/// [`TcoError::OutputNotSupported`] when `sections` is empty, and
/// [`TcoError::Json`] if a section cannot be serialized.
pub fn format_data(
    sections: &[OutputSection],
    tco: &FleetTco,
    fleet: &Fleet,
    scenarios: &ScenarioSet,
) -> Result<Map<String, Value>, TcoError> {
    if sections.is_empty() {
        return Err(TcoError::OutputNotSupported);
    }

    let mut out = Map::new();
    if sections.contains(&OutputSection::Graphs) {
        out.insert("graphs".into(), Value::String(GRAPHS_UNAVAILABLE.into()));
    }
    if sections.contains(&OutputSection::Input) {
        let original_fleet: Map<String, Value> = fleet
            .iter()
            .map(|(plate, vehicle)| (plate.clone(), Value::Object(vehicle.to_map())))
            .collect();
        out.insert("original_fleet".into(), Value::Object(original_fleet));
        out.insert("scenarios".into(), serde_json::to_value(scenarios)?);
    }
    if sections.contains(&OutputSection::Results) {
        out.insert("results".into(), serde_json::to_value(&tco.results)?);
        out.insert("transition_year".into(), serde_json::to_value(&tco.transition_year)?);
    }
    Ok(out)
}
