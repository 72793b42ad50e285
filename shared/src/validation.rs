//! Validation utilities for the Plant Health Monitor
//!
//! Physical plausibility checks for readings and derived envelopes.

use crate::models::{Reading, RequirementEnvelope};
use crate::types::{NUTRIENT_RANGE, PERCENT_RANGE, PH_RANGE, SOIL_TEMPERATURE_RANGE};

// ============================================================================
// Reading Validations
// ============================================================================

/// Validate pH is within the physical 0-14 scale
pub fn validate_ph(ph: f64) -> Result<(), &'static str> {
    if !ph.is_finite() || !PH_RANGE.contains(ph) {
        return Err("pH must be between 0 and 14");
    }
    Ok(())
}

/// Validate a percentage value (moisture, humidity)
pub fn validate_percent(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() || !PERCENT_RANGE.contains(value) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate all metrics of a reading are physically plausible
pub fn validate_reading(reading: &Reading) -> Result<(), &'static str> {
    validate_ph(reading.ph)?;
    validate_percent(reading.moisture)?;
    if !SOIL_TEMPERATURE_RANGE.contains(reading.temperature) {
        return Err("Soil temperature outside sensor range");
    }
    for nutrient in [reading.nitrogen, reading.phosphorus, reading.potassium] {
        if !NUTRIENT_RANGE.contains(nutrient) {
            return Err("Nutrient concentration outside sensor range");
        }
    }
    if reading.conductivity < 0.0 {
        return Err("Conductivity cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Envelope Validations
// ============================================================================

/// Validate envelope ordering and that every target is physically meaningful
pub fn validate_envelope(envelope: &RequirementEnvelope) -> Result<(), &'static str> {
    validate_ph(envelope.ph_min)?;
    validate_ph(envelope.ph_max)?;
    if !(envelope.ph_min < envelope.ph_optimal && envelope.ph_optimal < envelope.ph_max) {
        return Err("pH optimum must lie strictly inside the pH range");
    }
    if envelope.moisture_target <= 0.0 || envelope.moisture_target > 100.0 {
        return Err("Moisture target must be within (0, 100]");
    }
    if envelope.nitrogen_target <= 0.0
        || envelope.phosphorus_target <= 0.0
        || envelope.potassium_target <= 0.0
    {
        return Err("Nutrient targets must be positive");
    }
    if envelope.temperature_min >= envelope.temperature_max {
        return Err("Temperature range is empty");
    }
    Ok(())
}
