//! Alert models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An alert for one violation episode
///
/// `entity_id` is `None` for site-wide weather alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertEvent {
    pub entity_id: Option<Uuid>,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub recommendations: Vec<String>,
    pub first_seen_at: DateTime<Utc>,
    /// `None` until a delivery has succeeded
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// Types of alerts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Heat,
    Storm,
    Drought,
    #[serde(rename = "high_uv")]
    HighUv,
    SoilLow,
    SoilHigh,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::Heat => write!(f, "Heat"),
            AlertKind::Storm => write!(f, "Storm"),
            AlertKind::Drought => write!(f, "Drought"),
            AlertKind::HighUv => write!(f, "High UV"),
            AlertKind::SoilLow => write!(f, "Low soil moisture"),
            AlertKind::SoilHigh => write!(f, "High soil moisture"),
        }
    }
}

/// Alert severity, ordered from least to most urgent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "low"),
            AlertSeverity::Medium => write!(f, "medium"),
            AlertSeverity::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::High > AlertSeverity::Medium);
        assert!(AlertSeverity::Medium > AlertSeverity::Low);
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&AlertKind::HighUv).unwrap(), "\"high_uv\"");
        assert_eq!(serde_json::to_string(&AlertKind::SoilLow).unwrap(), "\"soil_low\"");
    }
}
