//! Requirement envelope models

use serde::{Deserialize, Serialize};

use crate::types::MetricRange;

/// Target operating envelope for a plant, derived on demand
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RequirementEnvelope {
    pub ph_min: f64,
    pub ph_max: f64,
    pub ph_optimal: f64,
    /// Volumetric moisture target (%)
    pub moisture_target: f64,
    pub nitrogen_target: f64,
    pub phosphorus_target: f64,
    pub potassium_target: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
}

impl RequirementEnvelope {
    pub fn ph_range(&self) -> MetricRange {
        MetricRange::new(self.ph_min, self.ph_max)
    }

    pub fn temperature_range(&self) -> MetricRange {
        MetricRange::new(self.temperature_min, self.temperature_max)
    }
}

/// pH band selected by genus
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhProfile {
    AcidLoving,
    General,
    AlkalineLoving,
}

impl PhProfile {
    /// (min, optimal, max)
    pub fn band(&self) -> (f64, f64, f64) {
        match self {
            PhProfile::AcidLoving => (4.5, 5.5, 6.0),
            PhProfile::General => (5.5, 6.5, 7.5),
            PhProfile::AlkalineLoving => (6.5, 7.2, 8.0),
        }
    }
}

/// Nitrogen/phosphorus/potassium baselines (mg/kg)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutrientTargets {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}
