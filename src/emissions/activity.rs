//! Activity record model
//!
//! One record per user per calendar day. Each of the three category blocks
//! is optional, and subtype strings that don't match a known variant
//! deserialize to `Unknown` rather than failing - a malformed submission
//! must never break footprint or aggregate computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Emission source category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transportation,
    Energy,
    Dietary,
}

impl Category {
    /// All categories, in reporting order
    pub const ALL: [Category; 3] = [Category::Transportation, Category::Energy, Category::Dietary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Transportation => "transportation",
            Category::Energy => "energy",
            Category::Dietary => "dietary",
        }
    }
}

/// Transportation mode for a daily commute entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportMode {
    Car,
    Bus,
    Motorcycle,
    Bicycle,
    Walking,
    /// Unrecognized mode; contributes zero emissions
    Unknown,
}

impl From<String> for TransportMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "car" => TransportMode::Car,
            "bus" => TransportMode::Bus,
            "motorcycle" => TransportMode::Motorcycle,
            "bicycle" => TransportMode::Bicycle,
            "walking" => TransportMode::Walking,
            _ => TransportMode::Unknown,
        }
    }
}

impl From<TransportMode> for String {
    fn from(value: TransportMode) -> Self {
        match value {
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Motorcycle => "motorcycle",
            TransportMode::Bicycle => "bicycle",
            TransportMode::Walking => "walking",
            TransportMode::Unknown => "unknown",
        }
        .to_string()
    }
}

impl Default for TransportMode {
    fn default() -> Self {
        TransportMode::Unknown
    }
}

impl TransportMode {
    /// Modes counted as an "eco day" for weekly goals
    pub fn is_eco(&self) -> bool {
        matches!(
            self,
            TransportMode::Bicycle | TransportMode::Walking | TransportMode::Bus
        )
    }
}

/// Household energy source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnergySource {
    Coal,
    NaturalGas,
    Solar,
    Wind,
    /// Unrecognized source; contributes zero emissions
    Unknown,
}

impl From<String> for EnergySource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "coal" => EnergySource::Coal,
            "natural_gas" => EnergySource::NaturalGas,
            "solar" => EnergySource::Solar,
            "wind" => EnergySource::Wind,
            _ => EnergySource::Unknown,
        }
    }
}

impl From<EnergySource> for String {
    fn from(value: EnergySource) -> Self {
        match value {
            EnergySource::Coal => "coal",
            EnergySource::NaturalGas => "natural_gas",
            EnergySource::Solar => "solar",
            EnergySource::Wind => "wind",
            EnergySource::Unknown => "unknown",
        }
        .to_string()
    }
}

impl Default for EnergySource {
    fn default() -> Self {
        EnergySource::Unknown
    }
}

/// Daily dietary profile (a categorical choice, not a quantity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DietProfile {
    MeatHeavy,
    Balanced,
    Vegetarian,
    Vegan,
    /// Unrecognized profile; contributes zero emissions
    Unknown,
}

impl From<String> for DietProfile {
    fn from(value: String) -> Self {
        match value.as_str() {
            "meat_heavy" => DietProfile::MeatHeavy,
            "balanced" => DietProfile::Balanced,
            "vegetarian" => DietProfile::Vegetarian,
            "vegan" => DietProfile::Vegan,
            _ => DietProfile::Unknown,
        }
    }
}

impl From<DietProfile> for String {
    fn from(value: DietProfile) -> Self {
        match value {
            DietProfile::MeatHeavy => "meat_heavy",
            DietProfile::Balanced => "balanced",
            DietProfile::Vegetarian => "vegetarian",
            DietProfile::Vegan => "vegan",
            DietProfile::Unknown => "unknown",
        }
        .to_string()
    }
}

impl Default for DietProfile {
    fn default() -> Self {
        DietProfile::Unknown
    }
}

/// Transportation block of a daily record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transportation {
    /// Missing `type` degrades to `Unknown` (zero contribution)
    #[serde(rename = "type", default)]
    pub mode: TransportMode,
    /// Distance travelled in kilometres (non-negative)
    #[serde(default)]
    pub distance_km: f64,
}

/// Energy block of a daily record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    /// Missing `type` degrades to `Unknown` (zero contribution)
    #[serde(rename = "type", default)]
    pub source: EnergySource,
    /// Consumption in kilowatt-hours (non-negative)
    #[serde(default)]
    pub amount_kwh: f64,
}

/// Dietary block of a daily record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dietary {
    /// Missing `type` degrades to `Unknown` (zero contribution)
    #[serde(rename = "type", default)]
    pub profile: DietProfile,
}

/// One user activity entry for a single calendar day
///
/// Uniqueness per (user, date) is enforced by the storage layer: a later
/// write for the same day overwrites in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation: Option<Transportation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<Energy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary: Option<Dietary>,
}
