//! Error handling for the plant health engine
//!
//! Nothing here is fatal to a host: the monitor logs each error and moves on
//! to the next plant or the next tick.

use shared::NormalizationError;
use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    // Input errors
    #[error("Normalization failed: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Implausible reading: {0}")]
    ImplausibleReading(String),

    // Collaborator errors
    #[error("Reading source error: {0}")]
    ReadingSource(String),

    #[error("Plant source error: {0}")]
    PlantSource(String),

    #[error("Weather service unavailable")]
    WeatherServiceUnavailable,

    #[error("Weather API error: {0}")]
    WeatherApi(String),

    #[error("Notification to {recipient} failed: {message}")]
    Notification { recipient: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
