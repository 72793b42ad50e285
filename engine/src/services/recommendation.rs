//! Recommendation generator
//!
//! A fixed rule table evaluated in order: pH, moisture, temperature,
//! nitrogen, phosphorus, potassium, then care gaps. Each metric yields at
//! most one entry, the most severe condition that applies.

use shared::{
    CarePreferences, Plant, Reading, Recommendation, RecommendationCategory, RequirementEnvelope,
};

/// pH units beyond the envelope that count as critical
const PH_CRITICAL_MARGIN: f64 = 1.0;
const MOISTURE_SLIGHT_MARGIN: f64 = 10.0;
const MOISTURE_CRITICAL_LOW_MARGIN: f64 = 25.0;
const MOISTURE_CRITICAL_HIGH_MARGIN: f64 = 30.0;
/// °C beyond the temperature range that count as critical
const TEMPERATURE_CRITICAL_MARGIN: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

/// Build the ordered recommendation list; never empty
pub fn recommend(
    plant: &Plant,
    envelope: &RequirementEnvelope,
    reading: Option<&Reading>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if let Some(reading) = reading {
        recommendations.extend(ph_rule(envelope, reading.ph));
        recommendations.extend(moisture_rule(envelope.moisture_target, reading.moisture));
        recommendations.extend(temperature_rule(envelope, reading.temperature));
        recommendations.extend(nutrient_rule(
            Nutrient::Nitrogen,
            envelope.nitrogen_target,
            reading.nitrogen,
        ));
        recommendations.extend(nutrient_rule(
            Nutrient::Phosphorus,
            envelope.phosphorus_target,
            reading.phosphorus,
        ));
        recommendations.extend(nutrient_rule(
            Nutrient::Potassium,
            envelope.potassium_target,
            reading.potassium,
        ));
    }

    let prefs = CarePreferences::from_plant(plant);
    if !prefs.has_watering_schedule {
        recommendations.push(Recommendation::new(
            "No watering schedule set",
            "Choose a daily, weekly or monthly watering schedule so moisture targets can be tailored",
            RecommendationCategory::CareSetup,
        ));
    }
    if !prefs.has_sunlight {
        recommendations.push(Recommendation::new(
            "No sunlight preference set",
            "Record whether the plant sits in full sun, part sun, part shade or full shade",
            RecommendationCategory::CareSetup,
        ));
    }

    if reading.is_none() {
        recommendations.push(Recommendation::new(
            "No sensor data",
            "Install a soil sensor to track pH, moisture, temperature and nutrients",
            RecommendationCategory::Monitoring,
        ));
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation::new(
            "All conditions look good",
            "Keep up the current care routine",
            RecommendationCategory::Healthy,
        ));
    }

    recommendations
}

fn ph_rule(envelope: &RequirementEnvelope, ph: f64) -> Option<Recommendation> {
    let (issue, solution) = if ph < envelope.ph_min - PH_CRITICAL_MARGIN {
        (
            "Critically low pH",
            "Work garden lime into the soil and retest within two weeks",
        )
    } else if ph < envelope.ph_min {
        (
            "Slightly low pH",
            "Apply a light dressing of garden lime or wood ash",
        )
    } else if ph > envelope.ph_max + PH_CRITICAL_MARGIN {
        (
            "Critically high pH",
            "Apply elemental sulfur and switch to an acidifying fertilizer",
        )
    } else if ph > envelope.ph_max {
        (
            "Slightly high pH",
            "Mulch with pine needles or add acidic compost",
        )
    } else {
        return None;
    };
    Some(Recommendation::new(issue, solution, RecommendationCategory::SoilChemistry))
}

fn moisture_rule(target: f64, moisture: f64) -> Option<Recommendation> {
    let (issue, solution) = if moisture < target - MOISTURE_CRITICAL_LOW_MARGIN {
        (
            "Critically low moisture",
            "Water deeply now and increase watering frequency",
        )
    } else if moisture < target - MOISTURE_SLIGHT_MARGIN {
        (
            "Low moisture",
            "Increase watering frequency slightly",
        )
    } else if moisture > target + MOISTURE_CRITICAL_HIGH_MARGIN {
        (
            "Critically high moisture",
            "Stop watering and improve drainage to prevent root rot",
        )
    } else if moisture > target + MOISTURE_SLIGHT_MARGIN {
        (
            "High moisture",
            "Reduce watering frequency and let the topsoil dry between waterings",
        )
    } else {
        return None;
    };
    Some(Recommendation::new(issue, solution, RecommendationCategory::Watering))
}

fn temperature_rule(envelope: &RequirementEnvelope, temperature: f64) -> Option<Recommendation> {
    let (issue, solution) = if temperature < envelope.temperature_min - TEMPERATURE_CRITICAL_MARGIN {
        (
            "Critically low soil temperature",
            "Move the plant somewhere warmer or protect it with frost cloth",
        )
    } else if temperature < envelope.temperature_min {
        (
            "Slightly low soil temperature",
            "Mulch to hold heat in the soil",
        )
    } else if temperature > envelope.temperature_max + TEMPERATURE_CRITICAL_MARGIN {
        (
            "Critically high soil temperature",
            "Provide shade during the hottest hours and water in the early morning",
        )
    } else if temperature > envelope.temperature_max {
        (
            "Slightly high soil temperature",
            "Add mulch to keep the roots cool",
        )
    } else {
        return None;
    };
    Some(Recommendation::new(issue, solution, RecommendationCategory::Climate))
}

fn nutrient_rule(nutrient: Nutrient, target: f64, value: f64) -> Option<Recommendation> {
    let (name, fertilizer) = match nutrient {
        Nutrient::Nitrogen => ("nitrogen", "a nitrogen-rich fertilizer or composted manure"),
        Nutrient::Phosphorus => ("phosphorus", "bone meal or rock phosphate"),
        Nutrient::Potassium => ("potassium", "potash or kelp meal"),
    };

    let (issue, solution) = if value < target * 0.5 {
        (
            format!("Critically low {}", name),
            format!("Feed with {} now", fertilizer),
        )
    } else if value < target * 0.8 {
        (
            format!("Slightly low {}", name),
            format!("Top-dress with {} at the next feeding", fertilizer),
        )
    } else if value > target * 2.0 {
        (
            format!("Excess {}", name),
            "Stop fertilizing and flush the soil with plain water".to_string(),
        )
    } else {
        return None;
    };
    Some(Recommendation::new(issue, solution, RecommendationCategory::Nutrition))
}
