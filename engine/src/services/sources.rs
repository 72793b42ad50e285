//! Collaborator interfaces the engine reads from
//!
//! Hosts plug their storage and weather provider in behind these traits.
//! [`InMemoryStore`] backs tests and the standalone binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    validate_reading, DailyForecast, Plant, RawReading, RawTimestamp, Reading, WeatherConditions,
};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::services::normalizer;

#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Latest raw reading for a plant, if any
    async fn latest(&self, plant_id: Uuid) -> EngineResult<Option<RawReading>>;

    /// Primary history readings within `[since, until]`, any order
    async fn history(
        &self,
        plant_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> EngineResult<Vec<RawReading>>;

    /// Most recent readings from the secondary store, newest first
    async fn recent(&self, plant_id: Uuid, limit: usize) -> EngineResult<Vec<RawReading>>;
}

#[async_trait]
pub trait PlantSource: Send + Sync {
    async fn plants(&self) -> EngineResult<Vec<Plant>>;
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self) -> EngineResult<WeatherConditions>;

    /// Daily forecast; providers without one return nothing
    async fn forecast(&self, _days: u8) -> EngineResult<Vec<DailyForecast>> {
        Ok(Vec::new())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Plants plus primary and fallback reading histories held in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    plants: RwLock<Vec<Plant>>,
    primary: RwLock<HashMap<Uuid, Vec<RawReading>>>,
    fallback: RwLock<HashMap<Uuid, Vec<RawReading>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_plant(&self, plant: Plant) {
        write_lock(&self.plants).push(plant);
    }

    pub fn push_reading(&self, plant_id: Uuid, reading: RawReading) {
        write_lock(&self.primary)
            .entry(plant_id)
            .or_default()
            .push(reading);
    }

    pub fn push_fallback_reading(&self, plant_id: Uuid, reading: RawReading) {
        write_lock(&self.fallback)
            .entry(plant_id)
            .or_default()
            .push(reading);
    }

    /// Drop every primary reading of a plant
    pub fn clear_readings(&self, plant_id: Uuid) {
        write_lock(&self.primary).remove(&plant_id);
    }
}

/// Latest reading for a plant, normalized and checked for plausibility
pub async fn latest_reading(
    source: &dyn ReadingSource,
    plant_id: Uuid,
) -> EngineResult<Option<Reading>> {
    let raw = match source.latest(plant_id).await? {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let reading = normalizer::normalize(&raw)?;
    validate_reading(&reading).map_err(|e| EngineError::ImplausibleReading(e.to_string()))?;
    Ok(Some(reading))
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Sort key for raw readings; unparseable timestamps sort first
fn instant_of(raw: &RawReading) -> Option<DateTime<Utc>> {
    raw.timestamp
        .as_ref()
        .and_then(|ts: &RawTimestamp| normalizer::normalize_timestamp(ts).ok())
}

#[async_trait]
impl ReadingSource for InMemoryStore {
    async fn latest(&self, plant_id: Uuid) -> EngineResult<Option<RawReading>> {
        let primary = read_lock(&self.primary);
        Ok(primary
            .get(&plant_id)
            .and_then(|readings| readings.iter().max_by_key(|r| instant_of(r)))
            .cloned())
    }

    async fn history(
        &self,
        plant_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> EngineResult<Vec<RawReading>> {
        if since > until {
            return Err(EngineError::ReadingSource(format!(
                "history window starts after it ends ({} > {})",
                since, until
            )));
        }
        let primary = read_lock(&self.primary);
        Ok(primary
            .get(&plant_id)
            .map(|readings| {
                readings
                    .iter()
                    .filter(|r| matches!(instant_of(r), Some(t) if t >= since && t <= until))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn recent(&self, plant_id: Uuid, limit: usize) -> EngineResult<Vec<RawReading>> {
        let fallback = read_lock(&self.fallback);
        let mut readings = fallback.get(&plant_id).cloned().unwrap_or_default();
        readings.sort_by_key(|r| std::cmp::Reverse(instant_of(r)));
        readings.truncate(limit);
        Ok(readings)
    }
}

#[async_trait]
impl PlantSource for InMemoryStore {
    async fn plants(&self) -> EngineResult<Vec<Plant>> {
        Ok(read_lock(&self.plants).clone())
    }
}
