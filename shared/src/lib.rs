//! Shared types and models for the Plant Health Monitor
//!
//! This crate contains the plain data model consumed and produced by the
//! health assessment engine: readings, plants, requirement envelopes, scores,
//! recommendations, alerts, trends and weather observations.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
