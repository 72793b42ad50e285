//! Requirement resolution
//!
//! Derives a plant's target envelope from its taxonomy and care preferences.
//! Resolution is total: sparse or unrecognised inputs fall back to the
//! general-purpose defaults instead of failing.

use shared::{
    MetricRange, MoisturePreference, NutrientTargets, PhProfile, Plant, RequirementEnvelope,
    SunlightPreference, WateringSchedule,
};

/// Genera that prefer acidic soil
const ACID_LOVING_GENERA: &[&str] = &[
    "vaccinium",
    "rhododendron",
    "azalea",
    "camellia",
    "gardenia",
    "pieris",
    "kalmia",
    "erica",
    "calluna",
    "magnolia",
    "ilex",
    "enkianthus",
    "leucothoe",
    "hydrangea",
];

/// Genera that prefer alkaline soil
const ALKALINE_LOVING_GENERA: &[&str] = &[
    "lavandula",
    "clematis",
    "syringa",
    "dianthus",
    "brassica",
    "buxus",
    "gypsophila",
    "spinacia",
    "asparagus",
    "beta",
];

const MOISTURE_TARGET_RANGE: MetricRange = MetricRange::new(10.0, 90.0);

/// General-purpose air and soil temperature range (°C)
pub const DEFAULT_TEMPERATURE_RANGE: MetricRange = MetricRange::new(15.0, 30.0);

/// Resolve the target envelope for a plant
pub fn resolve(plant: &Plant) -> RequirementEnvelope {
    let (ph_min, ph_optimal, ph_max) = ph_profile(plant).band();
    let npk = nutrient_targets(
        plant
            .sunlight_preference
            .as_deref()
            .and_then(SunlightPreference::parse),
    );

    RequirementEnvelope {
        ph_min,
        ph_max,
        ph_optimal,
        moisture_target: moisture_target(plant),
        nitrogen_target: npk.nitrogen,
        phosphorus_target: npk.phosphorus,
        potassium_target: npk.potassium,
        temperature_min: DEFAULT_TEMPERATURE_RANGE.min,
        temperature_max: DEFAULT_TEMPERATURE_RANGE.max,
    }
}

/// pH band from the genus; unmatched or missing names use the general band
pub fn ph_profile(plant: &Plant) -> PhProfile {
    match plant.genus() {
        Some(genus) if ACID_LOVING_GENERA.contains(&genus.as_str()) => PhProfile::AcidLoving,
        Some(genus) if ALKALINE_LOVING_GENERA.contains(&genus.as_str()) => {
            PhProfile::AlkalineLoving
        }
        _ => PhProfile::General,
    }
}

/// Moisture target from watering schedule, nudged by moisture preference
pub fn moisture_target(plant: &Plant) -> f64 {
    let schedule = plant
        .watering_schedule
        .as_deref()
        .and_then(WateringSchedule::parse)
        .unwrap_or(WateringSchedule::Weekly);

    let base = match schedule {
        WateringSchedule::Daily => 70.0,
        WateringSchedule::Weekly => 50.0,
        WateringSchedule::Monthly => 30.0,
    };

    let nudge = match plant
        .soil_moisture_preference
        .as_deref()
        .and_then(MoisturePreference::parse)
    {
        Some(MoisturePreference::Dry) => -10.0,
        Some(MoisturePreference::Wet) => 10.0,
        Some(MoisturePreference::Moist) | None => 0.0,
    };

    MOISTURE_TARGET_RANGE.clamp(base + nudge)
}

/// NPK baselines by light exposure; unknown exposure uses the part-sun bucket
pub fn nutrient_targets(sunlight: Option<SunlightPreference>) -> NutrientTargets {
    let (nitrogen, phosphorus, potassium) = match sunlight.unwrap_or(SunlightPreference::PartSun) {
        SunlightPreference::FullSun => (60.0, 40.0, 60.0),
        SunlightPreference::PartSun => (50.0, 30.0, 50.0),
        SunlightPreference::PartShade => (40.0, 25.0, 40.0),
        SunlightPreference::FullShade => (30.0, 20.0, 30.0),
    };
    NutrientTargets {
        nitrogen,
        phosphorus,
        potassium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant_with(schedule: Option<&str>, sunlight: Option<&str>, scientific: Option<&str>) -> Plant {
        let mut plant = Plant::new("Test plant");
        plant.watering_schedule = schedule.map(str::to_string);
        plant.sunlight_preference = sunlight.map(str::to_string);
        plant.scientific_name = scientific.map(str::to_string);
        plant
    }

    #[test]
    fn test_moisture_by_schedule() {
        assert_eq!(resolve(&plant_with(Some("daily"), None, None)).moisture_target, 70.0);
        assert_eq!(resolve(&plant_with(Some("Frequent"), None, None)).moisture_target, 70.0);
        assert_eq!(resolve(&plant_with(Some("average"), None, None)).moisture_target, 50.0);
        assert_eq!(resolve(&plant_with(Some("minimum"), None, None)).moisture_target, 30.0);
        assert_eq!(resolve(&plant_with(Some("sometimes"), None, None)).moisture_target, 50.0);
        assert_eq!(resolve(&plant_with(None, None, None)).moisture_target, 50.0);
    }

    #[test]
    fn test_moisture_preference_nudge() {
        let mut plant = plant_with(Some("daily"), None, None);
        plant.soil_moisture_preference = Some("wet".to_string());
        assert_eq!(moisture_target(&plant), 80.0);

        plant.watering_schedule = Some("monthly".to_string());
        plant.soil_moisture_preference = Some("dry".to_string());
        assert_eq!(moisture_target(&plant), 20.0);
    }

    #[test]
    fn test_npk_by_sunlight() {
        let full_sun = resolve(&plant_with(None, Some("full sun"), None));
        assert_eq!(full_sun.nitrogen_target, 60.0);

        let shade = resolve(&plant_with(None, Some("part-shade"), None));
        assert_eq!(shade.phosphorus_target, 25.0);

        let unknown = resolve(&plant_with(None, Some("under a rock"), None));
        assert_eq!(unknown.potassium_target, 50.0);
    }

    #[test]
    fn test_ph_by_genus() {
        let blueberry = resolve(&plant_with(None, None, Some("Vaccinium corymbosum")));
        assert_eq!((blueberry.ph_min, blueberry.ph_optimal, blueberry.ph_max), (4.5, 5.5, 6.0));

        let lavender = resolve(&plant_with(None, None, Some("LAVANDULA angustifolia")));
        assert_eq!(lavender.ph_optimal, 7.2);

        let tomato = resolve(&plant_with(None, None, Some("Solanum lycopersicum")));
        assert_eq!((tomato.ph_min, tomato.ph_optimal, tomato.ph_max), (5.5, 6.5, 7.5));
    }

    #[test]
    fn test_temperature_range() {
        let envelope = resolve(&Plant::new("Anything"));
        assert_eq!(envelope.temperature_range(), DEFAULT_TEMPERATURE_RANGE);
    }
}
