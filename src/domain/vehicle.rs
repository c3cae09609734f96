//! Fleet vehicle records and their enumerated attributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

use crate::error::TcoError;

use super::scenario::RESIDUAL_CURVE_LEN;

/// Plate used by fleet templates for the illustrative first row.
pub const EXAMPLE_PLATE: &str = "voorbeeld";

/// Body type of a vehicle, in category-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VehicleCategory {
    SmallVan,
    MediumVan,
    MediumLuxuryVan,
    LargeVan,
    SmallRigidTruck,
    LargeRigidTruck,
    TractorTrailer,
}

impl VehicleCategory {
    /// All categories, ordered by category index.
    pub const ALL: [VehicleCategory; 7] = [
        Self::SmallVan,
        Self::MediumVan,
        Self::MediumLuxuryVan,
        Self::LargeVan,
        Self::SmallRigidTruck,
        Self::LargeRigidTruck,
        Self::TractorTrailer,
    ];

    /// Zero-based index used by the cost model's per-category tables.
    pub fn index(self) -> usize {
        match self {
            Self::SmallVan => 0,
            Self::MediumVan => 1,
            Self::MediumLuxuryVan => 2,
            Self::LargeVan => 3,
            Self::SmallRigidTruck => 4,
            Self::LargeRigidTruck => 5,
            Self::TractorTrailer => 6,
        }
    }

    /// Looks up a category by its zero-based index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Key under which scenario tables store this category (`index + 1`).
    pub fn scenario_key(self) -> String {
        (self.index() + 1).to_string()
    }

    /// Dutch body-type name as it appears in fleet data.
    pub fn label(self) -> &'static str {
        match self {
            Self::SmallVan => "Kleine bestelwagen",
            Self::MediumVan => "Medium bestelwagen",
            Self::MediumLuxuryVan => "Medium luxe bestelwagen",
            Self::LargeVan => "Grote bestelwagen",
            Self::SmallRigidTruck => "Kleine bakwagen (12t)",
            Self::LargeRigidTruck => "Grote bakwagen (18t)",
            Self::TractorTrailer => "Trekker-oplegger",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let category = match normalized.as_str() {
            "kleine bestelwagen" => Self::SmallVan,
            "medium bestelwagen" | "middel bestelwagen" => Self::MediumVan,
            "medium luxe bestelwagen" | "middel bestelwagen luxe" => Self::MediumLuxuryVan,
            "grote bestelwagen" => Self::LargeVan,
            "kleine bakwagen (12t)" | "kleine bakwagen" => Self::SmallRigidTruck,
            "grote bakwagen (18t)" | "grote bakwagen" => Self::LargeRigidTruck,
            "trekker-oplegger" | "trekker oplegger" => Self::TractorTrailer,
            _ => return Err(format!("unknown vehicle type \"{}\"", s.trim())),
        };
        Ok(category)
    }
}

impl TryFrom<String> for VehicleCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VehicleCategory> for String {
    fn from(value: VehicleCategory) -> Self {
        value.label().to_string()
    }
}

/// Drive-train fuel of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FuelType {
    Diesel,
    Cng,
    BlueDiesel,
    Gasoline,
    Lng,
    Electric,
}

impl FuelType {
    /// Fuels whose results come from the diesel branch of the cost model.
    pub const FOSSIL: [FuelType; 5] = [
        Self::Diesel,
        Self::Cng,
        Self::BlueDiesel,
        Self::Gasoline,
        Self::Lng,
    ];

    pub fn is_fossil(self) -> bool {
        Self::FOSSIL.contains(&self)
    }

    pub fn is_electric(self) -> bool {
        self == Self::Electric
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Diesel => "Diesel",
            Self::Cng => "CNG",
            Self::BlueDiesel => "Blauwe diesel",
            Self::Gasoline => "Benzine",
            Self::Lng => "LNG",
            Self::Electric => "Elektrisch",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fuel = match s.trim().to_lowercase().as_str() {
            "diesel" => Self::Diesel,
            "cng" => Self::Cng,
            "blauwe diesel" | "blue diesel" => Self::BlueDiesel,
            "benzine" | "gasoline" => Self::Gasoline,
            "lng" => Self::Lng,
            "elektrisch" | "electric" => Self::Electric,
            _ => return Err(format!("unknown fuel type \"{}\"", s.trim())),
        };
        Ok(fuel)
    }
}

impl TryFrom<String> for FuelType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FuelType> for String {
    fn from(value: FuelType) -> Self {
        value.label().to_string()
    }
}

/// Source of the electricity used for charging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElectricityType {
    #[default]
    Grey,
    Green,
}

impl ElectricityType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Grey => "grijs",
            Self::Green => "groen",
        }
    }
}

impl FromStr for ElectricityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grijs" | "grey" | "gray" => Ok(Self::Grey),
            "groen" | "green" => Ok(Self::Green),
            "" => Ok(Self::default()),
            other => Err(format!("unknown electricity type \"{other}\"")),
        }
    }
}

impl TryFrom<String> for ElectricityType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElectricityType> for String {
    fn from(value: ElectricityType) -> Self {
        value.label().to_string()
    }
}

/// One managed fleet asset, as delivered by the fleet owner.
///
/// The record is never mutated by a simulation: fuel type, age and lifespan
/// evolve as transient strategy state so the original stays available for
/// reporting. Field names in the serialized map form match the fleet data
/// exchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub number_plate: String,
    #[serde(rename = "type")]
    pub category: VehicleCategory,
    pub fuel_type: FuelType,
    pub euronorm: u8,
    pub year_of_purchase: i32,
    #[serde(deserialize_with = "dutch_bool")]
    pub is_cooled: bool,
    #[serde(rename = "PTO_fuel_consumption")]
    pub pto_fuel_consumption: f64,
    /// Expected kilometres per year.
    pub expected_total_distance_traveled_in_km: f64,
    pub maximum_daily_distance_in_km: f64,
    pub amount_of_operational_days: u32,
    #[serde(rename = "drives_in_future_ZE_zone", deserialize_with = "dutch_bool")]
    pub drives_in_future_ze_zone: bool,
    /// Technological lifespan in years (> 0).
    pub technological_lifespan: u32,
    #[serde(default)]
    pub loading_times: String,
    /// Hours per day available for charging at the depot.
    pub charging_time_depot: u32,
    /// Hours per day available for public charging.
    pub charging_time_public: u32,
    #[serde(default)]
    pub electricity_type: ElectricityType,
}

impl Vehicle {
    /// Real age of the vehicle in `current_year`.
    pub fn age_in(&self, current_year: i32) -> i32 {
        current_year - self.year_of_purchase
    }

    /// True for the illustrative placeholder row of a fleet template.
    pub fn is_example(&self) -> bool {
        is_example_plate(&self.number_plate)
    }

    /// Checks the record invariants against the simulation's current year.
    ///
    /// Returns one reason per violated invariant.
    pub fn validate(&self, current_year: i32) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.number_plate.trim().is_empty() {
            reasons.push("number plate is empty".to_string());
        }
        if self.year_of_purchase > current_year {
            reasons.push(format!(
                "year of purchase {} lies after {current_year}",
                self.year_of_purchase
            ));
        }
        if self.technological_lifespan == 0 || self.technological_lifespan as usize > RESIDUAL_CURVE_LEN {
            reasons.push(format!(
                "technological lifespan {} outside 1..={RESIDUAL_CURVE_LEN}",
                self.technological_lifespan
            ));
        }
        if self.amount_of_operational_days == 0 || self.amount_of_operational_days > 366 {
            reasons.push(format!(
                "operational days {} outside 1..=366",
                self.amount_of_operational_days
            ));
        }
        if !self.expected_total_distance_traveled_in_km.is_finite()
            || self.expected_total_distance_traveled_in_km < 0.0
        {
            reasons.push("expected distance must be a non-negative number".to_string());
        }
        if self.charging_time_depot > 24 || self.charging_time_public > 24 {
            reasons.push("charging times must be <= 24 hours".to_string());
        }
        reasons
    }

    /// Serializes the record to its flat map form.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // Every field serializes to a JSON scalar, so the value is always an object.
            _ => Map::new(),
        }
    }

    /// Rebuilds a record from its flat map form.
    ///
    /// # Errors
    ///
    /// Returns [`TcoError::ValidationFailed`] when a field is missing or malformed.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, TcoError> {
        serde_json::from_value(Value::Object(map.clone()))
            .map_err(|e| TcoError::ValidationFailed(e.to_string()))
    }
}

/// Accepts a JSON boolean or the spreadsheet spellings `ja`/`nee`.
fn dutch_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(text) => match text.trim().to_lowercase().as_str() {
            "ja" | "true" => Ok(true),
            "nee" | "false" => Ok(false),
            other => Err(de::Error::custom(format!("expected ja/nee, got \"{other}\""))),
        },
    }
}

pub(crate) fn is_example_plate(plate: &str) -> bool {
    plate.trim().eq_ignore_ascii_case(EXAMPLE_PLATE)
}
