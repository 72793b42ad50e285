//! Trend series models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reading::SoilMetric;

/// A single (timestamp, value) sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Time-ordered history of one metric
///
/// Points are kept ascending by timestamp. The series is rebuilt from source
/// readings on every request and is never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSeries {
    pub metric: SoilMetric,
    points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Sorts the given points ascending by timestamp
    pub fn new(metric: SoilMetric, mut points: Vec<TrendPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self { metric, points }
    }

    /// Restartable: each call yields a fresh iterator from the oldest point
    pub fn iter(&self) -> std::slice::Iter<'_, TrendPoint> {
        self.points.iter()
    }

    pub fn points(&self) -> &[TrendPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&TrendPoint> {
        self.points.last()
    }

    /// Trailing moving average; the first points average over what is available
    pub fn moving_average(&self, window: usize) -> impl Iterator<Item = TrendPoint> + '_ {
        let window = window.max(1);
        self.points.iter().enumerate().map(move |(i, point)| {
            let start = (i + 1).saturating_sub(window);
            let slice = &self.points[start..=i];
            let mean = slice.iter().map(|p| p.value).sum::<f64>() / slice.len() as f64;
            TrendPoint {
                timestamp: point.timestamp,
                value: mean,
            }
        })
    }

    pub fn summary(&self) -> Option<TrendSummary> {
        let latest = self.points.last()?;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut total = 0.0;
        for point in &self.points {
            min = min.min(point.value);
            max = max.max(point.value);
            total += point.value;
        }

        Some(TrendSummary {
            metric: self.metric,
            min,
            max,
            mean: total / self.points.len() as f64,
            latest: latest.value,
            count: self.points.len(),
        })
    }
}

impl<'a> IntoIterator for &'a TrendSeries {
    type Item = &'a TrendPoint;
    type IntoIter = std::slice::Iter<'a, TrendPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Summary statistics of a trend series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrendSummary {
    pub metric: SoilMetric,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub latest: f64,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(values: &[f64]) -> TrendSeries {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| TrendPoint {
                timestamp: start + Duration::hours(i as i64),
                value: *v,
            })
            .collect();
        TrendSeries::new(SoilMetric::Moisture, points)
    }

    #[test]
    fn test_new_sorts_points() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let s = TrendSeries::new(
            SoilMetric::Ph,
            vec![
                TrendPoint { timestamp: start + Duration::hours(2), value: 3.0 },
                TrendPoint { timestamp: start, value: 1.0 },
                TrendPoint { timestamp: start + Duration::hours(1), value: 2.0 },
            ],
        );
        let values: Vec<f64> = s.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_iteration_is_restartable() {
        let s = series(&[1.0, 2.0, 3.0]);
        let first: Vec<f64> = s.iter().map(|p| p.value).collect();
        let second: Vec<f64> = (&s).into_iter().map(|p| p.value).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_moving_average() {
        let s = series(&[10.0, 20.0, 30.0, 40.0]);
        let smoothed: Vec<f64> = s.moving_average(2).map(|p| p.value).collect();
        assert_eq!(smoothed, vec![10.0, 15.0, 25.0, 35.0]);
    }

    #[test]
    fn test_moving_average_zero_window_is_identity() {
        let s = series(&[5.0, 7.0]);
        let smoothed: Vec<f64> = s.moving_average(0).map(|p| p.value).collect();
        assert_eq!(smoothed, vec![5.0, 7.0]);
    }

    #[test]
    fn test_summary() {
        let s = series(&[40.0, 20.0, 60.0]);
        let summary = s.summary().unwrap();
        assert_eq!(summary.min, 20.0);
        assert_eq!(summary.max, 60.0);
        assert_eq!(summary.mean, 40.0);
        assert_eq!(summary.latest, 60.0);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn test_summary_empty() {
        assert!(series(&[]).summary().is_none());
    }
}
