//! Configuration management for the plant health engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PHM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main engine configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Polling loop and alert dispatch
    pub monitor: MonitorConfig,

    /// Hard alert thresholds
    pub thresholds: ThresholdConfig,

    /// Trend window sizing
    pub trend: TrendConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Outbound notification configuration
    pub notification: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between ticks
    pub poll_interval_secs: u64,

    /// Seconds before a still-breached alert is resent
    pub alert_cooldown_secs: u64,

    /// Alert recipients
    pub recipients: Vec<String>,

    /// Upper bound on plants evaluated at once within a tick
    pub max_concurrent_evaluations: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Air temperature (°C) at or above which a heat alert fires
    pub heat_temperature: f64,

    /// Relative humidity (%) below which drought is possible
    pub drought_humidity: f64,

    /// Air temperature (°C) above which low humidity counts as drought
    pub drought_temperature: f64,

    /// UV index above which a high UV alert fires
    pub uv_index: f64,

    /// Precipitation probability (%) above which a storm alert fires
    pub storm_precipitation_probability: f64,

    /// Forecast heavy-rain days above which storm severity is high
    pub heavy_rain_periods_for_high: usize,

    /// Soil moisture (%) below which soil low is high severity
    pub soil_moisture_critical_low: f64,

    /// Soil moisture (%) above which soil high is high severity
    pub soil_moisture_critical_high: f64,

    /// Points below the plant's moisture target that raise a medium soil low alert
    pub soil_moisture_low_margin: f64,

    /// Points above the plant's moisture target that raise a medium soil high alert
    pub soil_moisture_high_margin: f64,

    /// Soil temperature (°C) above which a soil heat alert fires
    pub soil_heat_temperature: f64,

    /// Soil moisture (%) below which drought severity escalates to high
    pub drought_critical_soil_moisture: f64,

    /// Soil moisture (%) below which heat alerts add irrigation advice
    pub heat_dry_soil_moisture: f64,

    /// Soil moisture (%) above which storm alerts add drainage advice
    pub storm_saturated_soil_moisture: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrendConfig {
    /// Primary history window
    pub lookback_hours: i64,

    /// Maximum points kept in a series
    pub max_points: usize,

    /// Readings taken from the fallback source when the window is empty
    pub fallback_count: usize,

    /// Moving-average window
    pub smoothing_window: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherConfig {
    /// Fetch weather on each tick
    pub enabled: bool,

    /// Open-Meteo forecast endpoint
    pub api_endpoint: String,

    pub latitude: f64,
    pub longitude: f64,

    /// Days of daily forecast requested for storm severity
    pub forecast_days: u8,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NotificationConfig {
    /// Webhook receiving alert events as JSON; alerts are only logged when unset
    pub webhook_url: Option<String>,

    /// Bearer token sent to the webhook
    pub webhook_token: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("PHM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("monitor.poll_interval_secs", 300)?
            .set_default("monitor.alert_cooldown_secs", 86_400)?
            .set_default("weather.enabled", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PHM_ prefix)
            .add_source(
                Environment::with_prefix("PHM")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("monitor.recipients")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 300,
            alert_cooldown_secs: 86_400,
            recipients: Vec::new(),
            max_concurrent_evaluations: 8,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            heat_temperature: 30.0,
            drought_humidity: 20.0,
            drought_temperature: 25.0,
            uv_index: 8.0,
            storm_precipitation_probability: 70.0,
            heavy_rain_periods_for_high: 3,
            soil_moisture_critical_low: 20.0,
            soil_moisture_critical_high: 85.0,
            soil_moisture_low_margin: 25.0,
            soil_moisture_high_margin: 30.0,
            soil_heat_temperature: 35.0,
            drought_critical_soil_moisture: 30.0,
            heat_dry_soil_moisture: 40.0,
            storm_saturated_soil_moisture: 70.0,
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            lookback_hours: 24 * 7,
            max_points: 500,
            fallback_count: 50,
            smoothing_window: 5,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_endpoint: "https://api.open-meteo.com/v1/forecast".to_string(),
            latitude: 49.2827,
            longitude: -123.1207,
            forecast_days: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.monitor.poll_interval_secs, 300);
        assert_eq!(config.monitor.alert_cooldown_secs, 86_400);
        assert_eq!(config.thresholds.heat_temperature, 30.0);
        assert_eq!(config.trend.lookback_hours, 168);
        assert!(config.notification.webhook_url.is_none());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: Config = config::Config::builder()
            .set_override("monitor.alert_cooldown_secs", 60)
            .and_then(|b| b.set_override("environment", "test"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .unwrap();

        assert_eq!(config.environment, "test");
        assert_eq!(config.monitor.alert_cooldown_secs, 60);
        assert_eq!(config.monitor.poll_interval_secs, 300);
        assert_eq!(config.thresholds.uv_index, 8.0);
    }
}
