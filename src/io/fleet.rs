//! Fleet loading from CSV or JSON with per-row validation.
//!
//! A load never fails on a bad row: the row is skipped and reported with its
//! position and plate, so one typo does not hide the rest of the fleet.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::domain::{Fleet, Vehicle};
use crate::error::TcoError;
use crate::sim::orchestrator::SUM_KEY;

/// Why one input row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row (header excluded).
    pub row: usize,
    pub number_plate: Option<String>,
    pub reason: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.number_plate {
            Some(plate) => write!(f, "row {} ({plate}): {}", self.row, self.reason),
            None => write!(f, "row {}: {}", self.row, self.reason),
        }
    }
}

/// Result of one fleet load: accepted vehicles, rejected rows and blank rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetLoad {
    pub fleet: Fleet,
    pub errors: Vec<RowError>,
    pub blank_rows: usize,
}

impl FleetLoad {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn accept(&mut self, row: usize, vehicle: Vehicle, current_year: i32) {
        let plate = vehicle.number_plate.trim().to_string();
        let mut reasons = vehicle.validate(current_year);
        if plate == SUM_KEY {
            reasons.push(format!("\"{SUM_KEY}\" is reserved for the fleet total"));
        }
        if !reasons.is_empty() {
            self.reject(row, Some(plate), reasons.join("; "));
            return;
        }
        if self.fleet.contains_key(&plate) {
            self.reject(row, Some(plate), "duplicate number plate".to_string());
        } else {
            self.fleet.insert(plate, vehicle);
        }
    }

    fn reject(&mut self, row: usize, number_plate: Option<String>, reason: String) {
        let error = RowError {
            row,
            number_plate,
            reason,
        };
        warn!(%error, "skipping fleet row");
        self.errors.push(error);
    }

    fn log_summary(&self, source: &str) {
        info!(
            source,
            vehicles = self.fleet.len(),
            rejected = self.errors.len(),
            blank = self.blank_rows,
            "fleet loaded"
        );
    }
}

/// Loads a fleet file, choosing the format by extension (`.json`, otherwise CSV).
///
/// # Errors
///
/// [`TcoError::NotFound`] when the file does not exist; parse errors of the
/// file as a whole. Invalid rows are reported in [`FleetLoad::errors`].
pub fn load_fleet(path: &Path, current_year: i32) -> Result<FleetLoad, TcoError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TcoError::NotFound(format!("fleet file {}", path.display())),
        _ => TcoError::Io(e),
    })?;
    let reader = BufReader::new(file);
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let load = if is_json {
        read_fleet_json(reader, current_year)?
    } else {
        read_fleet_csv(reader, current_year)?
    };
    load.log_summary(&path.display().to_string());
    Ok(load)
}

/// Reads a fleet from CSV with a header row of record field names.
///
/// Flags accept `ja`/`nee` as well as `true`/`false`. Row numbers count every
/// line after the header, including empty lines the CSV reader skips.
///
/// # Errors
///
/// [`TcoError::Io`] when the input cannot be read, [`TcoError::Csv`] when the
/// header cannot be parsed.
pub fn read_fleet_csv(mut reader: impl Read, current_year: i32) -> Result<FleetLoad, TcoError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.replace("\r\n", "\n");
    let lines: Vec<&str> = text.lines().collect();
    let is_empty_line = |line: u64| {
        usize::try_from(line)
            .ok()
            .and_then(|l| lines.get(l.checked_sub(1)?))
            .is_some_and(|l| l.is_empty())
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();
    let plate_column = headers.iter().position(|h| h == "number_plate");
    let first_data_line = rdr.position().line();

    let mut load = FleetLoad::default();
    let mut record = csv::StringRecord::new();
    loop {
        // Empty lines never reach the reader's output, so count them here.
        let mut line = rdr.position().line();
        while is_empty_line(line) {
            load.blank_rows += 1;
            line += 1;
        }
        let row = usize::try_from(line - first_data_line + 1).unwrap_or(usize::MAX);
        match rdr.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) => {
                load.reject(row, None, e.to_string());
                continue;
            }
        }
        if record.iter().all(str::is_empty) {
            load.blank_rows += 1;
            continue;
        }
        let plate = plate_column
            .and_then(|c| record.get(c))
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        match record.deserialize::<Vehicle>(Some(&headers)) {
            Ok(vehicle) => load.accept(row, vehicle, current_year),
            Err(e) => load.reject(row, plate, e.to_string()),
        }
    }
    Ok(load)
}

/// Reads a fleet from JSON: an array of records or an object keyed by plate.
///
/// # Errors
///
/// [`TcoError::Json`] for malformed JSON, [`TcoError::ValidationFailed`] when the
/// top level is neither an array nor an object.
pub fn read_fleet_json(reader: impl Read, current_year: i32) -> Result<FleetLoad, TcoError> {
    let value: Value = serde_json::from_reader(reader)?;
    let rows: Vec<Value> = match value {
        Value::Array(rows) => rows,
        Value::Object(by_plate) => by_plate
            .into_iter()
            .map(|(plate, row)| match row {
                Value::Object(mut map) => {
                    map.entry("number_plate").or_insert(Value::String(plate));
                    Value::Object(map)
                }
                other => other,
            })
            .collect(),
        _ => {
            return Err(TcoError::ValidationFailed(
                "fleet JSON must be an array of vehicles or an object keyed by number plate".into(),
            ));
        }
    };

    let mut load = FleetLoad::default();
    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 1;
        let Value::Object(map) = row else {
            load.reject(row_no, None, "vehicle record must be an object".to_string());
            continue;
        };
        if is_blank(map) {
            load.blank_rows += 1;
            continue;
        }
        match Vehicle::from_map(map) {
            Ok(vehicle) => load.accept(row_no, vehicle, current_year),
            Err(e) => {
                let plate = map.get("number_plate").and_then(Value::as_str).map(str::to_string);
                load.reject(row_no, plate, e.to_string());
            }
        }
    }
    Ok(load)
}

fn is_blank(map: &Map<String, Value>) -> bool {
    map.values().all(|v| match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    })
}
