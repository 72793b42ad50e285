//! Remediation recommendation models

use serde::{Deserialize, Serialize};

/// A single remediation statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub issue: String,
    pub solution: String,
    pub category: RecommendationCategory,
}

impl Recommendation {
    pub fn new(
        issue: impl Into<String>,
        solution: impl Into<String>,
        category: RecommendationCategory,
    ) -> Self {
        Self {
            issue: issue.into(),
            solution: solution.into(),
            category,
        }
    }
}

/// What a recommendation is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    SoilChemistry,
    Watering,
    Climate,
    Nutrition,
    CareSetup,
    Monitoring,
    Healthy,
}
