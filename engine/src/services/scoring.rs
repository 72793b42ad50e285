//! Health scoring engine
//!
//! Scores are built from three factor groups:
//! - care completeness: 4 × 10 points
//! - sensor factors (pH, moisture, temperature, NPK): 4 × 10 points
//! - photo analysis signal: 20 points
//!
//! A group with no input is dropped from both the numerator and the
//! denominator, so a plant without sensors is scored on what is known.
//!
//! Each sensor factor has full credit inside its acceptable band and falls
//! off linearly to zero at a fixed tolerance beyond it:
//!
//! | metric      | band                      | zero at                   |
//! |-------------|---------------------------|---------------------------|
//! | pH          | `[ph_min, ph_max]`        | 1.5 units beyond the band |
//! | moisture    | target ± 10               | 40 points from target     |
//! | temperature | `[temp_min, temp_max]`    | 10 °C beyond the band     |
//! | nutrient    | 0.8 × target..1.5 × target| 0 below, +1 × target above|

use serde::{Deserialize, Serialize};
use shared::{
    CarePreferences, HealthOutlook, HealthScore, MetricRange, Plant, Reading, RequirementEnvelope,
};

use crate::external::plant_analysis::classify_signal;

const CARE_POINTS_EACH: f64 = 10.0;
const CARE_MAX: f64 = 40.0;
const SENSOR_POINTS_EACH: f64 = 10.0;
const SENSOR_MAX: f64 = 40.0;
const SIGNAL_MAX: f64 = 20.0;

/// Sub-score reported when its inputs are missing
const NEUTRAL_SUBSCORE: u8 = 50;

const PH_TOLERANCE: f64 = 1.5;
const MOISTURE_BAND: f64 = 10.0;
const MOISTURE_ZERO_DISTANCE: f64 = 40.0;
const TEMPERATURE_TOLERANCE: f64 = 10.0;
const NUTRIENT_BAND_LOW: f64 = 0.8;
const NUTRIENT_BAND_HIGH: f64 = 1.5;

/// Per-metric credit in `0.0..=1.0`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricScores {
    pub ph: f64,
    pub moisture: f64,
    pub temperature: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl MetricScores {
    /// Mean of the three nutrient scores
    pub fn npk(&self) -> f64 {
        (self.nitrogen + self.phosphorus + self.potassium) / 3.0
    }

    /// Sensor points out of 40
    pub fn sensor_points(&self) -> f64 {
        SENSOR_POINTS_EACH * (self.ph + self.moisture + self.temperature + self.npk())
    }
}

/// Score a plant from its envelope, latest reading, care preferences and the
/// optional photo analysis text
pub fn score(
    plant: &Plant,
    envelope: &RequirementEnvelope,
    reading: Option<&Reading>,
    prefs: &CarePreferences,
    signal: Option<&str>,
) -> HealthScore {
    let care_points = care_points(prefs);
    let metrics = reading.map(|r| metric_scores(envelope, r));
    let signal_points = signal.map(|text| classify_signal(text).points());

    let mut total = care_points;
    let mut max = CARE_MAX;
    if let Some(m) = &metrics {
        total += m.sensor_points();
        max += SENSOR_MAX;
    }
    if let Some(points) = signal_points {
        total += points;
        max += SIGNAL_MAX;
    }

    let overall = percent(total, max);
    let care = percent(care_points, CARE_MAX);
    let environment = metrics
        .map(|m| percent(m.sensor_points(), SENSOR_MAX))
        .unwrap_or(NEUTRAL_SUBSCORE);

    let growth_inputs: Vec<f64> = [
        signal_points.map(|p| p / SIGNAL_MAX),
        metrics.map(|m| m.npk()),
    ]
    .into_iter()
    .flatten()
    .collect();
    let growth = if growth_inputs.is_empty() {
        NEUTRAL_SUBSCORE
    } else {
        percent(growth_inputs.iter().sum::<f64>(), growth_inputs.len() as f64)
    };

    tracing::debug!(
        plant_id = %plant.id,
        overall,
        care,
        environment,
        growth,
        has_reading = reading.is_some(),
        has_signal = signal.is_some(),
        "Scored plant"
    );

    HealthScore {
        overall,
        care,
        environment,
        growth,
        prediction: HealthOutlook::from_score(overall).prediction().to_string(),
    }
}

/// Care completeness points out of 40
pub fn care_points(prefs: &CarePreferences) -> f64 {
    [
        prefs.has_watering_schedule,
        prefs.has_sunlight,
        prefs.has_soil_moisture,
        prefs.has_notes,
    ]
    .into_iter()
    .filter(|present| *present)
    .count() as f64
        * CARE_POINTS_EACH
}

/// Credit for each sensor metric of a reading against an envelope
pub fn metric_scores(envelope: &RequirementEnvelope, reading: &Reading) -> MetricScores {
    MetricScores {
        ph: ph_score(envelope, reading.ph),
        moisture: moisture_score(envelope.moisture_target, reading.moisture),
        temperature: band_score(
            reading.temperature,
            envelope.temperature_range(),
            TEMPERATURE_TOLERANCE,
            TEMPERATURE_TOLERANCE,
        ),
        nitrogen: nutrient_score(envelope.nitrogen_target, reading.nitrogen),
        phosphorus: nutrient_score(envelope.phosphorus_target, reading.phosphorus),
        potassium: nutrient_score(envelope.potassium_target, reading.potassium),
    }
}

fn ph_score(envelope: &RequirementEnvelope, ph: f64) -> f64 {
    band_score(ph, envelope.ph_range(), PH_TOLERANCE, PH_TOLERANCE)
}

fn moisture_score(target: f64, moisture: f64) -> f64 {
    band_score(
        moisture,
        MetricRange::new(target - MOISTURE_BAND, target + MOISTURE_BAND),
        MOISTURE_ZERO_DISTANCE - MOISTURE_BAND,
        MOISTURE_ZERO_DISTANCE - MOISTURE_BAND,
    )
}

fn nutrient_score(target: f64, value: f64) -> f64 {
    if target <= 0.0 {
        return 1.0;
    }
    let band = MetricRange::new(target * NUTRIENT_BAND_LOW, target * NUTRIENT_BAND_HIGH);
    band_score(value, band, band.min, target)
}

/// 1.0 inside `band`, falling linearly to 0.0 at the tolerance beyond
/// either edge
fn band_score(value: f64, band: MetricRange, below_tolerance: f64, above_tolerance: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if band.contains(value) {
        return 1.0;
    }
    let (distance, tolerance) = if value < band.min {
        (band.min - value, below_tolerance)
    } else {
        (value - band.max, above_tolerance)
    };
    if tolerance <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / tolerance).clamp(0.0, 1.0)
}

fn percent(points: f64, max: f64) -> u8 {
    if max <= 0.0 {
        return NEUTRAL_SUBSCORE;
    }
    (100.0 * points / max).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::requirements;
    use chrono::Utc;

    fn reading(ph: f64, moisture: f64) -> Reading {
        Reading {
            timestamp: Utc::now(),
            ph,
            moisture,
            temperature: 22.0,
            nitrogen: 50.0,
            phosphorus: 30.0,
            potassium: 50.0,
            conductivity: 900.0,
        }
    }

    #[test]
    fn test_band_score_edges() {
        assert_eq!(band_score(5.0, MetricRange::new(4.0, 6.0), 1.0, 1.0), 1.0);
        assert_eq!(band_score(6.5, MetricRange::new(4.0, 6.0), 1.0, 1.0), 0.5);
        assert_eq!(band_score(8.0, MetricRange::new(4.0, 6.0), 1.0, 1.0), 0.0);
        assert_eq!(band_score(f64::NAN, MetricRange::new(4.0, 6.0), 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_optimal_ph_gets_full_credit() {
        let plant = Plant::new("Tomato");
        let envelope = requirements::resolve(&plant);
        let scores = metric_scores(&envelope, &reading(6.5, 50.0));
        assert_eq!(scores.ph, 1.0);
        assert_eq!(scores.moisture, 1.0);
        assert_eq!(scores.npk(), 1.0);
    }

    #[test]
    fn test_full_marks() {
        let mut plant = Plant::new("Tomato");
        plant.watering_schedule = Some("weekly".to_string());
        plant.sunlight_preference = Some("part sun".to_string());
        plant.soil_moisture_preference = Some("moist".to_string());
        plant.notes = Some("South bed".to_string());
        let envelope = requirements::resolve(&plant);
        let prefs = CarePreferences::from_plant(&plant);

        let score = score(
            &plant,
            &envelope,
            Some(&reading(6.5, 50.0)),
            &prefs,
            Some("healthy and vigorous"),
        );
        assert_eq!(score.overall, 100);
        assert_eq!(score.care, 100);
        assert_eq!(score.environment, 100);
        assert_eq!(score.growth, 100);
        assert_eq!(score.prediction, HealthOutlook::Thriving.prediction());
    }

    #[test]
    fn test_missing_reading_is_renormalized() {
        let mut plant = Plant::new("Fern");
        plant.watering_schedule = Some("weekly".to_string());
        plant.sunlight_preference = Some("full shade".to_string());
        let envelope = requirements::resolve(&plant);
        let prefs = CarePreferences::from_plant(&plant);

        // 20 of 40 care points, nothing else known
        let score = score(&plant, &envelope, None, &prefs, None);
        assert_eq!(score.overall, 50);
        assert_eq!(score.environment, NEUTRAL_SUBSCORE);
        assert_eq!(score.growth, NEUTRAL_SUBSCORE);
    }

    #[test]
    fn test_negative_signal_lowers_growth() {
        let plant = Plant::new("Rose");
        let envelope = requirements::resolve(&plant);
        let prefs = CarePreferences::from_plant(&plant);

        let score = score(&plant, &envelope, None, &prefs, Some("black spots and mildew"));
        // 5 of 20 signal points, 0 of 40 care points
        assert_eq!(score.growth, 25);
        assert_eq!(score.overall, 8);
    }
}
