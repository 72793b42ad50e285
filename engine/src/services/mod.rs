//! Assessment and alerting services for the plant health engine

pub mod alerts;
pub mod assessment;
pub mod clock;
pub mod monitor;
pub mod normalizer;
pub mod notification;
pub mod recommendation;
pub mod requirements;
pub mod scoring;
pub mod sources;
pub mod trend;

pub use alerts::{AlertBook, Breach, PendingDelivery};
pub use assessment::{assess, PlantAssessment};
pub use clock::{Clock, ManualClock, SystemClock};
pub use monitor::{Monitor, MonitorHandle, MonitorStatus, TickReport};
pub use notification::{LogNotifier, NotificationSink, WebhookNotifier};
pub use sources::{InMemoryStore, PlantSource, ReadingSource, WeatherSource};
pub use trend::TrendAggregator;
