//! Reading normalization
//!
//! Every ingestion path funnels through here, so timestamp shape-sniffing
//! lives in exactly one place.

use chrono::{DateTime, NaiveDateTime, Utc};
use shared::{NormalizationError, RawReading, RawTimestamp, Reading, SecondsTimestamp};

/// Canonicalize a raw reading; absent numeric fields become 0
pub fn normalize(raw: &RawReading) -> Result<Reading, NormalizationError> {
    let timestamp = raw
        .timestamp
        .as_ref()
        .ok_or_else(|| NormalizationError::InvalidTimestamp("timestamp is missing".to_string()))
        .and_then(normalize_timestamp)?;

    Ok(Reading {
        timestamp,
        ph: field(raw.ph),
        moisture: field(raw.moisture),
        temperature: field(raw.temperature),
        nitrogen: field(raw.nitrogen),
        phosphorus: field(raw.phosphorus),
        potassium: field(raw.potassium),
        conductivity: field(raw.conductivity),
    })
}

/// Normalize a reading delivered as an arbitrary JSON document
pub fn normalize_value(value: &serde_json::Value) -> Result<Reading, NormalizationError> {
    let raw: RawReading = serde_json::from_value(value.clone())
        .map_err(|e| NormalizationError::Malformed(e.to_string()))?;
    normalize(&raw)
}

/// Resolve any accepted timestamp encoding to an instant
pub fn normalize_timestamp(ts: &RawTimestamp) -> Result<DateTime<Utc>, NormalizationError> {
    match ts {
        RawTimestamp::Instant(instant) => Ok(*instant),
        RawTimestamp::EpochMillis(millis) => from_epoch_millis(*millis),
        RawTimestamp::Seconds(SecondsTimestamp {
            seconds,
            nanoseconds,
        }) => from_seconds(*seconds, nanoseconds.unwrap_or(0.0)),
        RawTimestamp::Text(text) => parse_iso8601(text),
    }
}

/// Normalize a batch, discarding readings that fail
pub fn normalize_batch<'a, I>(raws: I) -> Vec<Reading>
where
    I: IntoIterator<Item = &'a RawReading>,
{
    raws.into_iter()
        .filter_map(|raw| match normalize(raw) {
            Ok(reading) => Some(reading),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding reading that failed normalization");
                None
            }
        })
        .collect()
}

fn field(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn from_epoch_millis(millis: f64) -> Result<DateTime<Utc>, NormalizationError> {
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(NormalizationError::InvalidTimestamp(format!(
            "epoch millis {} is not representable",
            millis
        )));
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64).ok_or_else(|| {
        NormalizationError::InvalidTimestamp(format!("epoch millis {} out of range", millis))
    })
}

fn from_seconds(seconds: f64, nanoseconds: f64) -> Result<DateTime<Utc>, NormalizationError> {
    if !seconds.is_finite() || !nanoseconds.is_finite() || seconds.abs() > i64::MAX as f64 {
        return Err(NormalizationError::InvalidTimestamp(format!(
            "seconds {} / nanoseconds {} are not representable",
            seconds, nanoseconds
        )));
    }
    if !(0.0..1_000_000_000.0).contains(&nanoseconds) {
        return Err(NormalizationError::InvalidTimestamp(format!(
            "nanoseconds {} outside [0, 1e9)",
            nanoseconds
        )));
    }
    DateTime::from_timestamp(seconds.trunc() as i64, nanoseconds as u32).ok_or_else(|| {
        NormalizationError::InvalidTimestamp(format!("seconds {} out of range", seconds))
    })
}

fn parse_iso8601(text: &str) -> Result<DateTime<Utc>, NormalizationError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Zone-less timestamps are taken as UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(NormalizationError::InvalidTimestamp(format!(
        "unrecognised timestamp '{}'",
        text
    )))
}
