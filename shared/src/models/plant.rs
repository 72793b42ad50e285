//! Plant (monitored entity) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A plant tracked by a user
///
/// Care preference fields hold the user's free-text selections; they are
/// parsed leniently by the engine and never mutated by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: Uuid,
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub cycle: PlantCycle,
    pub watering_schedule: Option<String>,
    pub sunlight_preference: Option<String>,
    pub soil_moisture_preference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Plant {
    /// Plant with only a name set
    pub fn new(common_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            common_name: common_name.into(),
            scientific_name: None,
            cycle: PlantCycle::Unknown,
            watering_schedule: None,
            sunlight_preference: None,
            soil_moisture_preference: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Genus is the first token of the scientific name, lowercased
    pub fn genus(&self) -> Option<String> {
        self.scientific_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
            .map(|g| g.to_lowercase())
    }
}

/// Life cycle of a plant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlantCycle {
    Annual,
    Biennial,
    Perennial,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Watering frequency chosen for a plant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WateringSchedule {
    Daily,
    Weekly,
    Monthly,
}

impl WateringSchedule {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "daily" | "frequent" => Some(WateringSchedule::Daily),
            "weekly" | "average" => Some(WateringSchedule::Weekly),
            "monthly" | "minimum" | "rare" => Some(WateringSchedule::Monthly),
            _ => None,
        }
    }
}

/// Light exposure preferred by a plant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SunlightPreference {
    FullSun,
    PartSun,
    PartShade,
    FullShade,
}

impl SunlightPreference {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "full_sun" => Some(SunlightPreference::FullSun),
            "part_sun" | "partial_sun" | "sun_part_shade" => Some(SunlightPreference::PartSun),
            "part_shade" | "partial_shade" | "filtered_shade" => Some(SunlightPreference::PartShade),
            "full_shade" | "deep_shade" => Some(SunlightPreference::FullShade),
            _ => None,
        }
    }
}

/// How moist the plant likes its soil
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoisturePreference {
    Dry,
    Moist,
    Wet,
}

impl MoisturePreference {
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_token(value).as_str() {
            "dry" | "low" => Some(MoisturePreference::Dry),
            "moist" | "medium" | "moderate" => Some(MoisturePreference::Moist),
            "wet" | "high" => Some(MoisturePreference::Wet),
            _ => None,
        }
    }
}

/// Which care fields the owner has filled in, used for completeness scoring
///
/// Presence is judged on the raw text: "every 3 days" counts as a schedule
/// even though it does not parse into a [`WateringSchedule`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarePreferences {
    pub has_watering_schedule: bool,
    pub has_sunlight: bool,
    pub has_soil_moisture: bool,
    pub has_notes: bool,
}

impl CarePreferences {
    pub fn from_plant(plant: &Plant) -> Self {
        Self {
            has_watering_schedule: is_filled(&plant.watering_schedule),
            has_sunlight: is_filled(&plant.sunlight_preference),
            has_soil_moisture: is_filled(&plant.soil_moisture_preference),
            has_notes: is_filled(&plant.notes),
        }
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Lowercase, trim and collapse spaces/hyphens to underscores
fn normalize_token(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
