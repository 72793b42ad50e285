//! Health score models

use serde::{Deserialize, Serialize};

/// Composite health score with its sub-scores, all in 0..=100
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthScore {
    pub overall: u8,
    pub care: u8,
    pub environment: u8,
    pub growth: u8,
    pub prediction: String,
}

/// Health band derived from the overall score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthOutlook {
    /// 80 and above
    Thriving,
    /// 60-79
    Healthy,
    /// 40-59
    NeedsAttention,
    /// below 40
    AtRisk,
}

impl HealthOutlook {
    pub fn from_score(overall: u8) -> Self {
        match overall {
            80..=u8::MAX => HealthOutlook::Thriving,
            60..=79 => HealthOutlook::Healthy,
            40..=59 => HealthOutlook::NeedsAttention,
            _ => HealthOutlook::AtRisk,
        }
    }

    pub fn prediction(&self) -> &'static str {
        match self {
            HealthOutlook::Thriving => "Thriving - expect strong, steady growth",
            HealthOutlook::Healthy => "Healthy - growth on track",
            HealthOutlook::NeedsAttention => "Needs attention - growth may slow without changes",
            HealthOutlook::AtRisk => "At risk - act soon to prevent decline",
        }
    }
}

/// Classification of the free-text photo analysis signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalSentiment {
    Positive,
    Negative,
    Neutral,
}

impl SignalSentiment {
    /// Points awarded out of 20
    pub fn points(&self) -> f64 {
        match self {
            SignalSentiment::Positive => 20.0,
            SignalSentiment::Negative => 5.0,
            SignalSentiment::Neutral => 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outlook_bands() {
        assert_eq!(HealthOutlook::from_score(100), HealthOutlook::Thriving);
        assert_eq!(HealthOutlook::from_score(80), HealthOutlook::Thriving);
        assert_eq!(HealthOutlook::from_score(79), HealthOutlook::Healthy);
        assert_eq!(HealthOutlook::from_score(40), HealthOutlook::NeedsAttention);
        assert_eq!(HealthOutlook::from_score(0), HealthOutlook::AtRisk);
    }
}
