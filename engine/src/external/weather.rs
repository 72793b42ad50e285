//! Weather API client for fetching weather data
//!
//! Integrates with the Open-Meteo forecast API for current conditions and
//! daily forecasts. No API key is required.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{describe_wmo_code, DailyForecast, WeatherCondition, WeatherConditions};

use crate::config::WeatherConfig;
use crate::error::{EngineError, EngineResult};
use crate::services::sources::WeatherSource;

const SOURCE_NAME: &str = "open-meteo";

/// Open-Meteo API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

/// Open-Meteo response for current conditions
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: u16,
    #[serde(default)]
    wind_speed_10m: Option<f64>,
    #[serde(default)]
    uv_index: Option<f64>,
    #[serde(default)]
    precipitation_probability: Option<f64>,
}

/// Open-Meteo response for the daily forecast
#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    weather_code: Vec<Option<u16>>,
}

impl OpenMeteoClient {
    /// Create a new client for a location
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_base_url(
            "https://api.open-meteo.com/v1/forecast".to_string(),
            latitude,
            longitude,
        )
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(base_url: String, latitude: f64, longitude: f64) -> Self {
        Self {
            client: Client::new(),
            base_url,
            latitude,
            longitude,
        }
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::with_base_url(config.api_endpoint.clone(), config.latitude, config.longitude)
    }

    /// Fetch current weather conditions
    pub async fn get_current_weather(&self) -> EngineResult<WeatherConditions> {
        let url = format!(
            "{}?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m,uv_index,precipitation_probability&timezone=GMT",
            self.base_url, self.latitude, self.longitude
        );

        let data: CurrentResponse = self.get_json(&url).await?;
        Ok(convert_current_response(data.current))
    }

    /// Fetch the daily forecast for the next `days` days
    pub async fn get_forecast(&self, days: u8) -> EngineResult<Vec<DailyForecast>> {
        let url = format!(
            "{}?latitude={}&longitude={}&daily=temperature_2m_max,temperature_2m_min,precipitation_probability_max,weather_code&forecast_days={}&timezone=GMT",
            self.base_url,
            self.latitude,
            self.longitude,
            days.clamp(1, 16)
        );

        let data: DailyResponse = self.get_json(&url).await?;
        Ok(convert_daily_response(data.daily))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> EngineResult<T> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Weather API request failed");
            EngineError::WeatherServiceUnavailable
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::WeatherApi(format!("{} - {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::WeatherApi(format!("Failed to parse weather response: {}", e)))
    }
}

/// Convert an Open-Meteo current block to our format
fn convert_current_response(data: CurrentBlock) -> WeatherConditions {
    let timestamp = NaiveDateTime::parse_from_str(&data.time, "%Y-%m-%dT%H:%M")
        .map(|t| t.and_utc())
        .unwrap_or_else(|_| Utc::now());

    WeatherConditions {
        timestamp,
        temperature_celsius: data.temperature_2m,
        humidity_percent: data.relative_humidity_2m,
        uv_index: data.uv_index,
        precipitation_probability: data.precipitation_probability,
        wind_speed_kmh: data.wind_speed_10m,
        condition: WeatherCondition::from_wmo_code(data.weather_code),
        description: describe_wmo_code(data.weather_code),
        source: SOURCE_NAME.to_string(),
    }
}

/// Convert the column-oriented daily block into one entry per day
fn convert_daily_response(data: DailyBlock) -> Vec<DailyForecast> {
    data.time
        .iter()
        .enumerate()
        .filter_map(|(i, day)| {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
            let code = data.weather_code.get(i).copied().flatten().unwrap_or(3);
            Some(DailyForecast {
                date,
                temperature_max_celsius: data.temperature_2m_max.get(i).copied().flatten()?,
                temperature_min_celsius: data.temperature_2m_min.get(i).copied().flatten()?,
                precipitation_probability: data
                    .precipitation_probability_max
                    .get(i)
                    .copied()
                    .flatten()
                    .unwrap_or(0.0),
                condition: WeatherCondition::from_wmo_code(code),
                description: describe_wmo_code(code),
            })
        })
        .collect()
}

/// Number of forecast days that are wet or above the precipitation threshold
pub fn count_heavy_rain_days(forecast: &[DailyForecast], probability_threshold: f64) -> usize {
    forecast
        .iter()
        .filter(|f| f.condition.is_wet() || f.precipitation_probability > probability_threshold)
        .count()
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn current(&self) -> EngineResult<WeatherConditions> {
        self.get_current_weather().await
    }

    async fn forecast(&self, days: u8) -> EngineResult<Vec<DailyForecast>> {
        self.get_forecast(days).await
    }
}
