//! Threshold monitor tests
//!
//! Tests for alert dispatch including:
//! - Debounce: a continuously breached condition is sent once per cooldown,
//!   even while its severity moves between bands
//! - Failed deliveries are retried on the next tick
//! - Clearing and re-arming on a new violation episode
//! - Soil alerts per plant and site-wide weather alerts

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use plant_health_engine::config::Config;
use plant_health_engine::error::{EngineError, EngineResult};
use plant_health_engine::services::{
    Clock, InMemoryStore, ManualClock, Monitor, NotificationSink, PlantSource, WeatherSource,
};
use proptest::prelude::*;
use shared::{
    AlertEvent, AlertKind, AlertSeverity, DailyForecast, Plant, RawReading, RawTimestamp,
    WeatherCondition, WeatherConditions,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const RECIPIENT: &str = "grower@example.com";

// ============================================================================
// Test doubles
// ============================================================================

/// Records every delivery; can be switched into a failing mode
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, AlertEvent)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(String, AlertEvent)> {
        self.sent.lock().unwrap().clone()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn send(&self, recipient: &str, event: &AlertEvent) -> EngineResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::Notification {
                recipient: recipient.to_string(),
                message: "sink offline".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), event.clone()));
        Ok(())
    }
}

/// Weather source whose conditions the test controls
struct StaticWeather {
    conditions: Mutex<Option<WeatherConditions>>,
    forecast: Mutex<Vec<DailyForecast>>,
}

impl StaticWeather {
    fn new(temperature: f64) -> Self {
        Self {
            conditions: Mutex::new(Some(conditions(temperature))),
            forecast: Mutex::new(Vec::new()),
        }
    }

    fn set_temperature(&self, temperature: f64) {
        *self.conditions.lock().unwrap() = Some(conditions(temperature));
    }

    fn set(&self, conditions: Option<WeatherConditions>) {
        *self.conditions.lock().unwrap() = conditions;
    }
}

#[async_trait]
impl WeatherSource for StaticWeather {
    async fn current(&self) -> EngineResult<WeatherConditions> {
        self.conditions
            .lock()
            .unwrap()
            .clone()
            .ok_or(EngineError::WeatherServiceUnavailable)
    }

    async fn forecast(&self, _days: u8) -> EngineResult<Vec<DailyForecast>> {
        Ok(self.forecast.lock().unwrap().clone())
    }
}

/// Plant source whose backing store is down
struct UnreachablePlants;

#[async_trait]
impl PlantSource for UnreachablePlants {
    async fn plants(&self) -> EngineResult<Vec<Plant>> {
        Err(EngineError::PlantSource("connection refused".to_string()))
    }
}

fn conditions(temperature: f64) -> WeatherConditions {
    WeatherConditions {
        timestamp: Utc::now(),
        temperature_celsius: temperature,
        humidity_percent: 55.0,
        uv_index: Some(4.0),
        precipitation_probability: Some(5.0),
        wind_speed_kmh: Some(8.0),
        condition: WeatherCondition::Clear,
        description: "clear sky".to_string(),
        source: "test".to_string(),
    }
}

fn start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_720_000_000, 0).unwrap()
}

fn config() -> Config {
    let mut config = Config::default();
    config.monitor.recipients = vec![RECIPIENT.to_string()];
    config.monitor.alert_cooldown_secs = 24 * 3600;
    config.monitor.poll_interval_secs = 300;
    config
}

struct Harness {
    store: Arc<InMemoryStore>,
    notifier: Arc<RecordingNotifier>,
    weather: Arc<StaticWeather>,
    clock: Arc<ManualClock>,
    monitor: Monitor,
}

fn harness(temperature: f64) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let weather = Arc::new(StaticWeather::new(temperature));
    let clock = Arc::new(ManualClock::new(start()));
    let monitor = Monitor::new(store.clone(), store.clone(), notifier.clone(), &config())
        .with_weather(weather.clone())
        .with_clock(clock.clone());

    Harness {
        store,
        notifier,
        weather,
        clock,
        monitor,
    }
}

fn soil(at: DateTime<Utc>, moisture: f64) -> RawReading {
    RawReading {
        ph: Some(6.5),
        moisture: Some(moisture),
        temperature: Some(21.0),
        nitrogen: Some(50.0),
        phosphorus: Some(30.0),
        potassium: Some(50.0),
        conductivity: Some(900.0),
        ..RawReading::at(RawTimestamp::EpochMillis(at.timestamp_millis() as f64))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 32°C activates one high heat alert; 33°C within cooldown sends nothing
    #[tokio::test]
    async fn test_heat_scenario() {
        let mut h = harness(32.0);

        let report = h.monitor.tick().await;
        assert_eq!(report.alerts_sent, 1);
        let sent = h.notifier.sent();
        assert_eq!(sent[0].0, RECIPIENT);
        assert_eq!(sent[0].1.kind, AlertKind::Heat);
        assert_eq!(sent[0].1.severity, AlertSeverity::High);
        assert!(sent[0].1.entity_id.is_none());

        h.weather.set_temperature(33.0);
        h.clock.advance(Duration::minutes(5));
        let report = h.monitor.tick().await;
        assert_eq!(report.alerts_sent, 0);
        assert_eq!(h.notifier.count(), 1);
        assert_eq!(report.active_alerts, 1);
    }

    /// A failed delivery stays active and is retried next tick
    #[tokio::test]
    async fn test_failed_delivery_retried() {
        let mut h = harness(31.0);
        h.notifier.set_failing(true);

        let report = h.monitor.tick().await;
        assert_eq!(report.alerts_failed, 1);
        assert_eq!(h.notifier.count(), 0);
        let active = h.monitor.weather_book().get(RECIPIENT, AlertKind::Heat).unwrap();
        assert!(active.last_sent_at.is_none());

        h.notifier.set_failing(false);
        h.clock.advance(Duration::minutes(5));
        let report = h.monitor.tick().await;
        assert_eq!(report.alerts_sent, 1);
        assert_eq!(h.notifier.count(), 1);

        let active = h.monitor.weather_book().get(RECIPIENT, AlertKind::Heat).unwrap();
        assert_eq!(active.last_sent_at, Some(start() + Duration::minutes(5)));
        assert_eq!(active.first_seen_at, start());
    }

    /// Clearing the condition re-arms the alert for the next episode
    #[tokio::test]
    async fn test_clear_and_rearm() {
        let mut h = harness(32.0);
        h.monitor.tick().await;

        h.weather.set_temperature(22.0);
        h.clock.advance(Duration::minutes(5));
        let report = h.monitor.tick().await;
        assert_eq!(report.active_alerts, 0);

        h.weather.set_temperature(34.0);
        h.clock.advance(Duration::minutes(5));
        h.monitor.tick().await;
        assert_eq!(h.notifier.count(), 2);
    }

    /// A still-breached alert is resent once the cooldown elapses
    #[tokio::test]
    async fn test_resend_after_cooldown() {
        let mut h = harness(32.0);
        h.monitor.tick().await;

        h.clock.advance(Duration::hours(23));
        h.monitor.tick().await;
        assert_eq!(h.notifier.count(), 1);

        h.clock.advance(Duration::hours(1));
        h.monitor.tick().await;
        assert_eq!(h.notifier.count(), 2);
    }

    /// Weather outages neither clear nor send weather alerts
    #[tokio::test]
    async fn test_weather_outage_keeps_state() {
        let mut h = harness(32.0);
        h.monitor.tick().await;

        h.weather.set(None);
        h.clock.advance(Duration::minutes(5));
        let report = h.monitor.tick().await;
        assert!(!report.weather_checked);
        assert_eq!(h.monitor.weather_book().len(), 1);

        h.weather.set_temperature(32.0);
        h.clock.advance(Duration::minutes(5));
        h.monitor.tick().await;
        assert_eq!(h.notifier.count(), 1);
    }

    /// Dry soil raises a per-plant alert carrying the plant id
    #[tokio::test]
    async fn test_soil_alert_per_plant() {
        let mut h = harness(20.0);
        let mut thirsty = Plant::new("Basil");
        thirsty.watering_schedule = Some("daily".to_string());
        let healthy = Plant::new("Rosemary");
        h.store.add_plant(thirsty.clone());
        h.store.add_plant(healthy.clone());
        h.store.push_reading(thirsty.id, soil(start(), 15.0));
        h.store.push_reading(healthy.id, soil(start(), 50.0));

        let report = h.monitor.tick().await;
        assert_eq!(report.plants_evaluated, 2);
        assert_eq!(report.alerts_sent, 1);

        let sent = h.notifier.sent();
        assert_eq!(sent[0].1.kind, AlertKind::SoilLow);
        assert_eq!(sent[0].1.severity, AlertSeverity::High);
        assert_eq!(sent[0].1.entity_id, Some(thirsty.id));
        assert!(h.monitor.score(thirsty.id).is_some());
        assert!(h.monitor.book(healthy.id).unwrap().is_empty());
    }

    /// A physically impossible reading is skipped instead of alerting
    #[tokio::test]
    async fn test_implausible_reading_skipped() {
        let mut h = harness(20.0);
        let plant = Plant::new("Orchid");
        h.store.add_plant(plant.clone());
        h.store.push_reading(plant.id, soil(start(), 140.0));

        let report = h.monitor.tick().await;
        assert_eq!(report.plants_skipped, 1);
        assert_eq!(report.alerts_sent, 0);
        assert!(h.monitor.book(plant.id).unwrap().is_empty());
    }

    /// A failing plant source skips soil checks but weather still runs
    #[tokio::test]
    async fn test_plant_source_failure_keeps_weather() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let mut monitor = Monitor::new(
            Arc::new(UnreachablePlants),
            store,
            notifier.clone(),
            &config(),
        )
        .with_weather(Arc::new(StaticWeather::new(35.0)))
        .with_clock(Arc::new(ManualClock::new(start())));

        let report = monitor.tick().await;
        assert_eq!(report.plants_evaluated, 0);
        assert!(report.weather_checked);
        assert_eq!(notifier.count(), 1);
    }

    /// Plants without readings are skipped, not errors
    #[tokio::test]
    async fn test_plant_without_readings_skipped() {
        let mut h = harness(20.0);
        h.store.add_plant(Plant::new("New seedling"));

        let report = h.monitor.tick().await;
        assert_eq!(report.plants_skipped, 1);
        assert_eq!(report.alerts_sent, 0);
    }

    /// Soil context from the freshest reading escalates drought severity
    #[tokio::test]
    async fn test_drought_uses_freshest_soil() {
        let mut h = harness(20.0);
        let plant = Plant::new("Tomato");
        h.store.add_plant(plant.clone());
        h.store.push_reading(plant.id, soil(start() - Duration::hours(2), 60.0));
        h.store.push_reading(plant.id, soil(start(), 25.0));

        let mut dry = conditions(28.0);
        dry.humidity_percent = 12.0;
        h.weather.set(Some(dry));

        h.monitor.tick().await;
        let drought = h
            .notifier
            .sent()
            .into_iter()
            .find(|(_, e)| e.kind == AlertKind::Drought)
            .unwrap();
        assert_eq!(drought.1.severity, AlertSeverity::High);
        assert!(drought.1.recommendations[0].starts_with("CRITICAL"));
    }

    /// Status reflects ticks and active alerts
    #[tokio::test]
    async fn test_status() {
        let mut h = harness(32.0);
        h.monitor.check_now().await;

        let status = h.monitor.status();
        assert_eq!(status.ticks, 1);
        assert_eq!(status.poll_interval_secs, 300);
        assert_eq!(status.active_alerts, 1);
        assert_eq!(status.active_by_kind.get(&AlertKind::Heat), Some(&1));
        assert!(status.last_summary.unwrap().contains("Active alerts: 1"));
        assert!(!status.active);
    }

    /// A spawned monitor ticks on start, on demand, and stops cleanly
    #[tokio::test]
    async fn test_spawned_monitor() {
        let h = harness(32.0);
        let notifier = h.notifier.clone();
        let mut handle = h.monitor.spawn();

        while handle.status().ticks < 1 {
            handle.changed().await.unwrap();
        }
        assert!(handle.status().active);

        handle.check_now();
        while handle.status().ticks < 2 {
            handle.changed().await.unwrap();
        }
        assert_eq!(notifier.count(), 1);

        handle.stop().await;
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(30))]

        /// N breached ticks within the cooldown send exactly one alert
        #[test]
        fn prop_debounce_sends_once(
            temperatures in proptest::collection::vec(30.0f64..45.0, 1..20),
            step_minutes in 1i64..60,
        ) {
            let sent = tokio_test::block_on(async {
                let mut h = harness(temperatures[0]);
                for temperature in &temperatures {
                    h.weather.set_temperature(*temperature);
                    h.monitor.tick().await;
                    h.clock.advance(Duration::minutes(step_minutes));
                }
                h.notifier.count()
            });
            // 19 ticks at most 59 minutes apart stay within the 24h cooldown
            prop_assert_eq!(sent, 1);
        }

        /// Soil moisture crossing severity bands within the cooldown sends once
        #[test]
        fn prop_debounce_across_severity_bands(
            moistures in proptest::collection::vec(prop_oneof![0.0f64..19.9, 20.0f64..44.9], 1..20),
            step_minutes in 1i64..60,
        ) {
            let sent = tokio_test::block_on(async {
                let mut h = harness(20.0);
                let mut plant = Plant::new("Fern");
                plant.watering_schedule = Some("daily".to_string());
                h.store.add_plant(plant.clone());

                for moisture in std::iter::once(5.0).chain(moistures.iter().copied()) {
                    h.store.push_reading(plant.id, soil(h.clock.now(), moisture));
                    h.monitor.tick().await;
                    h.clock.advance(Duration::minutes(step_minutes));
                }
                h.notifier.count()
            });
            prop_assert_eq!(sent, 1);
        }

        /// Temperatures below the heat threshold never alert
        #[test]
        fn prop_no_alert_below_threshold(temperatures in proptest::collection::vec(-10.0f64..29.99, 1..10)) {
            let sent = tokio_test::block_on(async {
                let mut h = harness(temperatures[0]);
                for temperature in &temperatures {
                    h.weather.set_temperature(*temperature);
                    h.monitor.tick().await;
                }
                h.notifier.count()
            });
            prop_assert_eq!(sent, 0);
        }
    }
}
