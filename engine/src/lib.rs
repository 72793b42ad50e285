//! Plant health assessment and alerting engine
//!
//! Normalizes soil sensor readings, resolves each plant's requirement
//! envelope, scores plant health, generates recommendations, builds trend
//! series and raises debounced weather and soil alerts.

pub mod config;
pub mod error;
pub mod external;
pub mod services;

pub use config::Config;
pub use error::{EngineError, EngineResult};
