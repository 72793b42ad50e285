//! Weather data models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current weather at the monitored site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherConditions {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub uv_index: Option<f64>,
    /// 0-100
    pub precipitation_probability: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub condition: WeatherCondition,
    pub description: String,
    pub source: String,
}

/// Daily weather forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature_max_celsius: f64,
    pub temperature_min_celsius: f64,
    /// 0-100
    pub precipitation_probability: f64,
    pub condition: WeatherCondition,
    pub description: String,
}

/// Main weather condition group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Fog,
    Rain,
    Thunderstorm,
    Snow,
}

impl WeatherCondition {
    /// Map a WMO weather interpretation code to its condition group
    pub fn from_wmo_code(code: u16) -> Self {
        match code {
            0 | 1 => WeatherCondition::Clear,
            2 | 3 => WeatherCondition::Clouds,
            45 | 48 => WeatherCondition::Fog,
            51..=67 | 80..=82 => WeatherCondition::Rain,
            71..=77 | 85 | 86 => WeatherCondition::Snow,
            95..=99 => WeatherCondition::Thunderstorm,
            _ => WeatherCondition::Clouds,
        }
    }

    pub fn is_wet(&self) -> bool {
        matches!(self, WeatherCondition::Rain | WeatherCondition::Thunderstorm)
    }
}

/// Human-readable description of a WMO weather code
pub fn describe_wmo_code(code: u16) -> String {
    let text = match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        48 => "depositing rime fog",
        51 => "light drizzle",
        53 => "moderate drizzle",
        55 => "dense drizzle",
        61 => "slight rain",
        63 => "moderate rain",
        65 => "heavy rain",
        71 => "slight snow",
        73 => "moderate snow",
        75 => "heavy snow",
        80 => "slight rain showers",
        81 => "moderate rain showers",
        82 => "violent rain showers",
        95 => "thunderstorm",
        96 => "thunderstorm with slight hail",
        99 => "thunderstorm with heavy hail",
        other => return format!("weather condition {}", other),
    };
    text.to_string()
}
