//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Closed numeric range for a metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Valid physical range for soil pH
pub const PH_RANGE: MetricRange = MetricRange::new(0.0, 14.0);

/// Valid physical range for volumetric moisture and relative humidity (%)
pub const PERCENT_RANGE: MetricRange = MetricRange::new(0.0, 100.0);

/// Plausible range for soil temperature sensors (°C)
pub const SOIL_TEMPERATURE_RANGE: MetricRange = MetricRange::new(-40.0, 80.0);

/// Nutrient concentrations (mg/kg) are non-negative with a generous sensor ceiling
pub const NUTRIENT_RANGE: MetricRange = MetricRange::new(0.0, 2000.0);
