//! Trend aggregation
//!
//! Builds a bounded per-metric history for charting. The primary history
//! window is preferred; when it is empty the most recent readings from the
//! fallback store are used instead.

use chrono::{DateTime, Duration, Utc};
use shared::{RawReading, Reading, SoilMetric, TrendPoint, TrendSeries};
use uuid::Uuid;

use crate::config::TrendConfig;
use crate::error::EngineResult;
use crate::services::normalizer;
use crate::services::sources::ReadingSource;

/// Builds trend series from primary and fallback reading histories
#[derive(Debug, Clone)]
pub struct TrendAggregator {
    config: TrendConfig,
}

impl TrendAggregator {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Start of the primary history window
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::hours(self.config.lookback_hours.max(0))
    }

    /// Pick the readings a series is built from, ascending by timestamp
    ///
    /// `fallback` is expected newest first, as the secondary store returns it.
    pub fn select_readings(
        &self,
        primary: &[RawReading],
        fallback: &[RawReading],
        now: DateTime<Utc>,
    ) -> Vec<Reading> {
        let since = self.window_start(now);
        let mut readings: Vec<Reading> = normalizer::normalize_batch(primary)
            .into_iter()
            .filter(|r| r.timestamp >= since && r.timestamp <= now)
            .collect();

        if readings.is_empty() && !fallback.is_empty() {
            tracing::debug!(
                fallback_count = self.config.fallback_count,
                "Primary history empty, using fallback readings"
            );
            readings = normalizer::normalize_batch(fallback);
            readings.truncate(self.config.fallback_count);
            readings.reverse();
        }

        readings.sort_by_key(|r| r.timestamp);
        let excess = readings.len().saturating_sub(self.config.max_points);
        readings.drain(..excess);
        readings
    }

    /// Series for one metric
    pub fn aggregate(
        &self,
        primary: &[RawReading],
        fallback: &[RawReading],
        metric: SoilMetric,
        now: DateTime<Utc>,
    ) -> TrendSeries {
        series_for(metric, &self.select_readings(primary, fallback, now))
    }

    /// Series for every metric, built from one selection
    pub fn aggregate_all(
        &self,
        primary: &[RawReading],
        fallback: &[RawReading],
        now: DateTime<Utc>,
    ) -> Vec<TrendSeries> {
        let readings = self.select_readings(primary, fallback, now);
        SoilMetric::ALL
            .iter()
            .map(|metric| series_for(*metric, &readings))
            .collect()
    }

    /// Fetch from a reading source and aggregate; the fallback store is only
    /// queried when the primary window is empty
    pub async fn from_source(
        &self,
        source: &dyn ReadingSource,
        plant_id: Uuid,
        metric: SoilMetric,
        now: DateTime<Utc>,
    ) -> EngineResult<TrendSeries> {
        let primary = source.history(plant_id, self.window_start(now), now).await?;
        let series = self.aggregate(&primary, &[], metric, now);
        if !series.is_empty() {
            return Ok(series);
        }

        let fallback = source.recent(plant_id, self.config.fallback_count).await?;
        Ok(self.aggregate(&[], &fallback, metric, now))
    }

    /// Moving average over the configured smoothing window
    pub fn smooth(&self, series: &TrendSeries) -> TrendSeries {
        TrendSeries::new(
            series.metric,
            series.moving_average(self.config.smoothing_window).collect(),
        )
    }
}

fn series_for(metric: SoilMetric, readings: &[Reading]) -> TrendSeries {
    TrendSeries::new(
        metric,
        readings
            .iter()
            .map(|r| TrendPoint {
                timestamp: r.timestamp,
                value: r.value(metric),
            })
            .collect(),
    )
}
