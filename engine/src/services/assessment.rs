//! Plant assessment bundle for hosts
//!
//! Resolves the envelope, scores the plant and builds recommendations in
//! one call, so a host page can render everything from a single value.

use serde::Serialize;
use shared::{CarePreferences, HealthScore, Plant, Reading, Recommendation, RequirementEnvelope};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::services::recommendation;
use crate::services::requirements;
use crate::services::scoring;
use crate::services::sources::{self, ReadingSource};

#[derive(Debug, Clone, Serialize)]
pub struct PlantAssessment {
    pub plant_id: Uuid,
    pub envelope: RequirementEnvelope,
    pub score: HealthScore,
    pub recommendations: Vec<Recommendation>,
}

pub fn assess(plant: &Plant, reading: Option<&Reading>, signal: Option<&str>) -> PlantAssessment {
    let envelope = requirements::resolve(plant);
    let prefs = CarePreferences::from_plant(plant);

    PlantAssessment {
        plant_id: plant.id,
        score: scoring::score(plant, &envelope, reading, &prefs, signal),
        recommendations: recommendation::recommend(plant, &envelope, reading),
        envelope,
    }
}

/// Assess using the latest reading from a source
///
/// A latest reading that fails normalization or is implausible is treated
/// as missing; source failures are returned.
pub async fn assess_from_source(
    source: &dyn ReadingSource,
    plant: &Plant,
    signal: Option<&str>,
) -> EngineResult<PlantAssessment> {
    let reading = match sources::latest_reading(source, plant.id).await {
        Ok(reading) => reading,
        Err(e @ (EngineError::Normalization(_) | EngineError::ImplausibleReading(_))) => {
            tracing::warn!(plant_id = %plant.id, error = %e, "Ignoring unusable latest reading");
            None
        }
        Err(e) => return Err(e),
    };

    Ok(assess(plant, reading.as_ref(), signal))
}
