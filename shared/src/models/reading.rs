//! Sensor reading models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A normalized soil sensor reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub ph: f64,
    /// Volumetric moisture (%)
    pub moisture: f64,
    /// Soil temperature (°C)
    pub temperature: f64,
    /// mg/kg
    pub nitrogen: f64,
    /// mg/kg
    pub phosphorus: f64,
    /// mg/kg
    pub potassium: f64,
    /// µS/cm
    pub conductivity: f64,
}

impl Reading {
    pub fn value(&self, metric: SoilMetric) -> f64 {
        match metric {
            SoilMetric::Ph => self.ph,
            SoilMetric::Moisture => self.moisture,
            SoilMetric::Temperature => self.temperature,
            SoilMetric::Nitrogen => self.nitrogen,
            SoilMetric::Phosphorus => self.phosphorus,
            SoilMetric::Potassium => self.potassium,
            SoilMetric::Conductivity => self.conductivity,
        }
    }
}

/// Metrics carried by a reading, in canonical order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SoilMetric {
    Ph,
    Moisture,
    Temperature,
    Nitrogen,
    Phosphorus,
    Potassium,
    Conductivity,
}

impl SoilMetric {
    pub const ALL: [SoilMetric; 7] = [
        SoilMetric::Ph,
        SoilMetric::Moisture,
        SoilMetric::Temperature,
        SoilMetric::Nitrogen,
        SoilMetric::Phosphorus,
        SoilMetric::Potassium,
        SoilMetric::Conductivity,
    ];
}

impl std::fmt::Display for SoilMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoilMetric::Ph => write!(f, "pH"),
            SoilMetric::Moisture => write!(f, "Moisture"),
            SoilMetric::Temperature => write!(f, "Temperature"),
            SoilMetric::Nitrogen => write!(f, "Nitrogen"),
            SoilMetric::Phosphorus => write!(f, "Phosphorus"),
            SoilMetric::Potassium => write!(f, "Potassium"),
            SoilMetric::Conductivity => write!(f, "Conductivity"),
        }
    }
}

/// Timestamp as delivered by the various ingestion sources
///
/// Deserialization tries the variants top to bottom, so JSON numbers become
/// epoch milliseconds, objects become second wrappers and strings are kept
/// for ISO-8601 parsing. `Instant` is only produced by native callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTimestamp {
    EpochMillis(f64),
    Seconds(SecondsTimestamp),
    Text(String),
    Instant(DateTime<Utc>),
}

/// `{ seconds, nanoseconds }` wrapper used by document stores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecondsTimestamp {
    #[serde(alias = "_seconds")]
    pub seconds: f64,
    #[serde(default, alias = "_nanoseconds", alias = "nanos")]
    pub nanoseconds: Option<f64>,
}

/// A reading as stored by the ingestion source, before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawReading {
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default, alias = "pH")]
    pub ph: Option<f64>,
    #[serde(default)]
    pub moisture: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub nitrogen: Option<f64>,
    #[serde(default)]
    pub phosphorus: Option<f64>,
    #[serde(default)]
    pub potassium: Option<f64>,
    #[serde(default, alias = "ec")]
    pub conductivity: Option<f64>,
}

impl RawReading {
    /// Start a raw reading carrying only a timestamp
    pub fn at(timestamp: RawTimestamp) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }
}

/// Reasons a raw reading cannot be normalized
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Malformed reading: {0}")]
    Malformed(String),
}
