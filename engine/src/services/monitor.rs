//! Threshold monitor and alert dispatcher
//!
//! One polling loop drives everything. Each tick:
//! 1. lists plants and evaluates them in parallel, each task owning that
//!    plant's [`AlertBook`] for the duration of the tick
//! 2. evaluates site-wide weather, using the freshest soil reading as context
//! 3. delivers pending alerts and records successful deliveries
//!
//! Ticks never overlap. Stopping the loop lets an in-flight tick finish.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use shared::{AlertKind, CarePreferences, HealthScore, Plant, Reading};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{watch, Notify, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::config::{Config, MonitorConfig, ThresholdConfig, WeatherConfig};
use crate::external::weather::count_heavy_rain_days;
use crate::services::alerts::{self, AlertBook, PendingDelivery};
use crate::services::clock::{Clock, SystemClock};
use crate::services::notification::NotificationSink;
use crate::services::requirements;
use crate::services::scoring;
use crate::services::sources::{self, PlantSource, ReadingSource, WeatherSource};

/// Outcome of one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub started_at: Option<DateTime<Utc>>,
    pub plants_evaluated: usize,
    pub plants_skipped: usize,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
    pub active_alerts: usize,
    pub weather_checked: bool,
    pub summary: String,
}

/// Snapshot of the monitor for hosts
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitorStatus {
    pub active: bool,
    pub poll_interval_secs: u64,
    pub ticks: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub tracked_plants: usize,
    pub active_alerts: usize,
    pub active_by_kind: BTreeMap<AlertKind, usize>,
    pub last_summary: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
struct DeliveryCounts {
    sent: usize,
    failed: usize,
}

/// Shared inputs handed to each per-plant task
#[derive(Clone)]
struct PlantContext {
    readings: Arc<dyn ReadingSource>,
    notifier: Arc<dyn NotificationSink>,
    thresholds: Arc<ThresholdConfig>,
    recipients: Arc<[String]>,
    cooldown: Duration,
    now: DateTime<Utc>,
}

struct PlantOutcome {
    plant_id: Uuid,
    book: AlertBook,
    reading: Option<Reading>,
    score: Option<HealthScore>,
    deliveries: DeliveryCounts,
}

/// Periodic threshold monitor
pub struct Monitor {
    plants: Arc<dyn PlantSource>,
    readings: Arc<dyn ReadingSource>,
    weather: Option<Arc<dyn WeatherSource>>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    config: MonitorConfig,
    thresholds: Arc<ThresholdConfig>,
    weather_config: WeatherConfig,
    books: HashMap<Uuid, AlertBook>,
    weather_book: AlertBook,
    scores: HashMap<Uuid, HealthScore>,
    running: bool,
    ticks: u64,
    last_tick_at: Option<DateTime<Utc>>,
    last_summary: Option<String>,
}

impl Monitor {
    /// Create a soil-only monitor on the system clock
    pub fn new(
        plants: Arc<dyn PlantSource>,
        readings: Arc<dyn ReadingSource>,
        notifier: Arc<dyn NotificationSink>,
        config: &Config,
    ) -> Self {
        Self {
            plants,
            readings,
            weather: None,
            notifier,
            clock: Arc::new(SystemClock),
            config: config.monitor.clone(),
            thresholds: Arc::new(config.thresholds.clone()),
            weather_config: config.weather.clone(),
            books: HashMap::new(),
            weather_book: AlertBook::new(None),
            scores: HashMap::new(),
            running: false,
            ticks: 0,
            last_tick_at: None,
            last_summary: None,
        }
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherSource>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn cooldown(&self) -> Duration {
        Duration::seconds(i64::try_from(self.config.alert_cooldown_secs).unwrap_or(i64::MAX))
    }

    /// Latest health score computed for a plant
    pub fn score(&self, plant_id: Uuid) -> Option<&HealthScore> {
        self.scores.get(&plant_id)
    }

    /// Active alerts for a plant
    pub fn book(&self, plant_id: Uuid) -> Option<&AlertBook> {
        self.books.get(&plant_id)
    }

    /// Active site-wide weather alerts
    pub fn weather_book(&self) -> &AlertBook {
        &self.weather_book
    }

    pub fn status(&self) -> MonitorStatus {
        let mut active_by_kind = BTreeMap::new();
        for event in self
            .books
            .values()
            .flat_map(|b| b.active())
            .chain(self.weather_book.active())
        {
            *active_by_kind.entry(event.kind).or_insert(0) += 1;
        }

        MonitorStatus {
            active: self.running,
            poll_interval_secs: self.config.poll_interval_secs,
            ticks: self.ticks,
            last_tick_at: self.last_tick_at,
            tracked_plants: self.books.len(),
            active_alerts: active_by_kind.values().sum(),
            active_by_kind,
            last_summary: self.last_summary.clone(),
        }
    }

    /// Run a single evaluation pass immediately
    pub async fn check_now(&mut self) -> TickReport {
        self.tick().await
    }

    /// Run one evaluation pass
    pub async fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let mut report = TickReport {
            started_at: Some(now),
            ..TickReport::default()
        };
        tracing::info!(tick = self.ticks + 1, "Starting monitor tick");

        if self.config.recipients.is_empty() {
            tracing::warn!("No alert recipients configured, alerts will not be delivered");
        }

        let context = PlantContext {
            readings: Arc::clone(&self.readings),
            notifier: Arc::clone(&self.notifier),
            thresholds: Arc::clone(&self.thresholds),
            recipients: self.config.recipients.clone().into(),
            cooldown: self.cooldown(),
            now,
        };

        let freshest = self.evaluate_plants(context, &mut report).await;

        if let Some(weather) = self.weather.clone() {
            let recipients = self.config.recipients.clone();
            match weather.current().await {
                Ok(conditions) => {
                    report.weather_checked = true;
                    let heavy_rain_periods = self
                        .heavy_rain_periods(weather.as_ref(), &conditions)
                        .await;
                    let breaches = alerts::evaluate_weather(
                        &conditions,
                        freshest.as_ref(),
                        heavy_rain_periods,
                        &self.thresholds,
                    );
                    let cooldown = self.cooldown();
                    let pending = self
                        .weather_book
                        .reconcile(&breaches, &recipients, now, cooldown);
                    let counts =
                        deliver(self.notifier.as_ref(), &mut self.weather_book, pending, now).await;
                    report.alerts_sent += counts.sent;
                    report.alerts_failed += counts.failed;
                    report.summary = alerts::summarize(
                        Some(&conditions),
                        freshest.as_ref(),
                        self.active_alert_count(),
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Weather fetch failed, skipping weather this tick");
                }
            }
        }

        report.active_alerts = self.active_alert_count();
        if report.summary.is_empty() {
            report.summary = alerts::summarize(None, freshest.as_ref(), report.active_alerts);
        }

        self.ticks += 1;
        self.last_tick_at = Some(now);
        self.last_summary = Some(report.summary.clone());

        tracing::info!(
            plants_evaluated = report.plants_evaluated,
            plants_skipped = report.plants_skipped,
            alerts_sent = report.alerts_sent,
            alerts_failed = report.alerts_failed,
            active_alerts = report.active_alerts,
            "Monitor tick complete"
        );
        report
    }

    /// Evaluate every plant concurrently; returns the freshest reading seen
    async fn evaluate_plants(
        &mut self,
        context: PlantContext,
        report: &mut TickReport,
    ) -> Option<Reading> {
        let plants = match self.plants.plants().await {
            Ok(plants) => plants,
            Err(e) => {
                tracing::warn!(error = %e, "Plant source failed, skipping soil checks this tick");
                return None;
            }
        };

        let listed: HashSet<Uuid> = plants.iter().map(|p| p.id).collect();
        self.books.retain(|id, _| listed.contains(id));
        self.scores.retain(|id, _| listed.contains(id));

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_evaluations.max(1)));
        let mut tasks = JoinSet::new();
        for plant in plants {
            let book = self
                .books
                .remove(&plant.id)
                .unwrap_or_else(|| AlertBook::new(Some(plant.id)));
            let context = context.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                evaluate_plant(context, plant, book).await
            });
        }

        let mut freshest: Option<Reading> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    report.alerts_sent += outcome.deliveries.sent;
                    report.alerts_failed += outcome.deliveries.failed;
                    match outcome.reading {
                        Some(reading) => {
                            report.plants_evaluated += 1;
                            if freshest.map_or(true, |f| reading.timestamp > f.timestamp) {
                                freshest = Some(reading);
                            }
                        }
                        None => report.plants_skipped += 1,
                    }
                    if let Some(score) = outcome.score {
                        self.scores.insert(outcome.plant_id, score);
                    }
                    self.books.insert(outcome.plant_id, outcome.book);
                }
                Err(e) => {
                    report.plants_skipped += 1;
                    tracing::error!(error = %e, "Plant evaluation task failed");
                }
            }
        }

        freshest
    }

    /// Forecast is only consulted when a storm is already likely
    async fn heavy_rain_periods(
        &self,
        weather: &dyn WeatherSource,
        conditions: &shared::WeatherConditions,
    ) -> usize {
        let storm_likely = conditions.condition.is_wet()
            || conditions
                .precipitation_probability
                .map(|p| p > self.thresholds.storm_precipitation_probability)
                .unwrap_or(false);
        if !storm_likely {
            return 0;
        }

        match weather.forecast(self.weather_config.forecast_days).await {
            Ok(forecast) => count_heavy_rain_days(
                &forecast,
                self.thresholds.storm_precipitation_probability,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Forecast fetch failed, assuming no heavy rain ahead");
                0
            }
        }
    }

    fn active_alert_count(&self) -> usize {
        self.books.values().map(AlertBook::len).sum::<usize>() + self.weather_book.len()
    }

    /// Run until `shutdown` becomes true or its sender is dropped
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) {
        self.run_loop(shutdown, Arc::new(Notify::new()), None).await;
    }

    /// Move the monitor onto its own task
    pub fn spawn(mut self) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let trigger = Arc::new(Notify::new());
        let (status_tx, status_rx) = watch::channel(self.status());

        let task_trigger = Arc::clone(&trigger);
        let task = tokio::spawn(async move {
            self.run_loop(shutdown_rx, task_trigger, Some(status_tx)).await;
        });

        MonitorHandle {
            shutdown: shutdown_tx,
            trigger,
            status: status_rx,
            task,
        }
    }

    async fn run_loop(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
        trigger: Arc<Notify>,
        status: Option<watch::Sender<MonitorStatus>>,
    ) {
        let period = std::time::Duration::from_secs(self.config.poll_interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.running = true;
        publish(&status, self.status());
        tracing::info!(
            poll_interval_secs = self.config.poll_interval_secs,
            "Monitor started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = trigger.notified() => {
                    tracing::info!("Manual check requested");
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }
            publish(&status, self.status());
        }

        self.running = false;
        publish(&status, self.status());
        tracing::info!("Monitor stopped");
    }
}

fn publish(status: &Option<watch::Sender<MonitorStatus>>, snapshot: MonitorStatus) {
    if let Some(tx) = status {
        tx.send_replace(snapshot);
    }
}

/// Evaluate one plant's latest reading and deliver its soil alerts
async fn evaluate_plant(context: PlantContext, plant: Plant, mut book: AlertBook) -> PlantOutcome {
    let mut outcome = PlantOutcome {
        plant_id: plant.id,
        book: AlertBook::default(),
        reading: None,
        score: None,
        deliveries: DeliveryCounts::default(),
    };

    let reading = match sources::latest_reading(context.readings.as_ref(), plant.id).await {
        Ok(Some(reading)) => reading,
        Ok(None) => {
            tracing::debug!(plant_id = %plant.id, "No readings yet");
            outcome.book = book;
            return outcome;
        }
        Err(e) => {
            tracing::warn!(plant_id = %plant.id, error = %e, "No usable latest reading, skipping plant");
            outcome.book = book;
            return outcome;
        }
    };

    let envelope = requirements::resolve(&plant);
    let prefs = CarePreferences::from_plant(&plant);
    let score = scoring::score(&plant, &envelope, Some(&reading), &prefs, None);
    let breaches = alerts::evaluate_soil(
        &plant,
        &reading,
        &envelope,
        &context.thresholds,
        score.overall,
    );

    let pending = book.reconcile(&breaches, &context.recipients, context.now, context.cooldown);
    outcome.deliveries = deliver(context.notifier.as_ref(), &mut book, pending, context.now).await;
    outcome.book = book;
    outcome.reading = Some(reading);
    outcome.score = Some(score);
    outcome
}

/// Send pending alerts, marking only successful deliveries as sent
async fn deliver(
    notifier: &dyn NotificationSink,
    book: &mut AlertBook,
    pending: Vec<PendingDelivery>,
    now: DateTime<Utc>,
) -> DeliveryCounts {
    let mut counts = DeliveryCounts::default();
    for PendingDelivery { recipient, event } in pending {
        match notifier.send(&recipient, &event).await {
            Ok(()) => {
                book.mark_sent(&recipient, event.kind, now);
                counts.sent += 1;
            }
            Err(e) => {
                tracing::error!(
                    recipient = %recipient,
                    kind = %event.kind,
                    error = %e,
                    "Alert delivery failed, will retry next tick"
                );
                counts.failed += 1;
            }
        }
    }
    counts
}

/// Control handle for a spawned monitor
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    trigger: Arc<Notify>,
    status: watch::Receiver<MonitorStatus>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn status(&self) -> MonitorStatus {
        self.status.borrow().clone()
    }

    /// Ask the loop to run a tick now
    pub fn check_now(&self) {
        self.trigger.notify_one();
    }

    /// Wait for the next published status
    pub async fn changed(&mut self) -> Option<MonitorStatus> {
        self.status.changed().await.ok()?;
        Some(self.status.borrow_and_update().clone())
    }

    /// Stop the loop, waiting for an in-flight tick to finish
    pub async fn stop(self) {
        self.shutdown.send_replace(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Monitor task ended abnormally");
        }
    }
}
