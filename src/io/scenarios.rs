//! Scenario set loading from JSON (`scenario -> vehicle type key -> trajectory`).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::domain::{Scenario, ScenarioSet, VehicleCategory};
use crate::error::TcoError;

/// Loads and validates a scenario set file.
///
/// # Errors
///
/// [`TcoError::NotFound`] for a missing file, [`TcoError::Json`] for malformed
/// JSON and [`TcoError::ValidationFailed`] listing every invalid value.
pub fn load_scenarios(path: &Path) -> Result<ScenarioSet, TcoError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TcoError::NotFound(format!("scenario file {}", path.display())),
        _ => TcoError::Io(e),
    })?;
    let set = read_scenarios(BufReader::new(file))?;
    info!(source = %path.display(), scenarios = set.names().count(), "scenarios loaded");
    Ok(set)
}

/// Reads a scenario set from JSON.
///
/// Each inner key must be the `index + 1` key of a vehicle category and match
/// the trajectory's own `vehicle_type`.
///
/// # Errors
///
/// See [`load_scenarios`].
pub fn read_scenarios(reader: impl Read) -> Result<ScenarioSet, TcoError> {
    let raw: BTreeMap<String, BTreeMap<String, Scenario>> = serde_json::from_reader(reader)?;

    let valid_keys: Vec<String> = VehicleCategory::ALL.iter().map(|c| c.scenario_key()).collect();
    let mut reasons = Vec::new();
    let mut set = ScenarioSet::new();
    for (name, by_category) in raw {
        for (key, scenario) in by_category {
            if !valid_keys.contains(&key) {
                reasons.push(format!("{name}: unknown vehicle type key \"{key}\""));
            } else if scenario.vehicle_type != key {
                reasons.push(format!(
                    "{name}: trajectory under key {key} declares vehicle type {}",
                    scenario.vehicle_type
                ));
            } else if scenario.years.is_empty() {
                reasons.push(format!("{name}: vehicle type {key} has no years"));
            } else {
                set.insert(&name, scenario);
            }
        }
    }
    reasons.extend(set.validate());
    if set.is_empty() {
        reasons.push("scenario set is empty".to_string());
    }

    if reasons.is_empty() {
        Ok(set)
    } else {
        Err(TcoError::ValidationFailed(reasons.join("; ")))
    }
}
