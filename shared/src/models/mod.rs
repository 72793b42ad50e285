//! Domain models for the Plant Health Monitor

mod alert;
mod health;
mod plant;
mod reading;
mod recommendation;
mod requirement;
mod trend;
mod weather;

pub use alert::*;
pub use health::*;
pub use plant::*;
pub use reading::*;
pub use recommendation::*;
pub use requirement::*;
pub use trend::*;
pub use weather::*;
