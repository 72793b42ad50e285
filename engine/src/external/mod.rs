//! External API integrations

pub mod plant_analysis;
pub mod weather;

pub use plant_analysis::classify_signal;
pub use weather::OpenMeteoClient;
