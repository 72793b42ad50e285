//! Plant Health Monitor - standalone host
//!
//! Runs the threshold monitor on a timer until Ctrl-C.

use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plant_health_engine::external::OpenMeteoClient;
use plant_health_engine::services::{
    InMemoryStore, LogNotifier, Monitor, NotificationSink, WebhookNotifier,
};
use plant_health_engine::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plant_monitor=debug,plant_health_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Plant Health Monitor");
    tracing::info!("Environment: {}", config.environment);

    let notifier: Arc<dyn NotificationSink> = match WebhookNotifier::from_config(&config.notification) {
        Some(webhook) => {
            tracing::info!("Delivering alerts via webhook");
            Arc::new(webhook)
        }
        None => {
            tracing::info!("No webhook configured, alerts will be logged");
            Arc::new(LogNotifier)
        }
    };

    // The standalone binary has no plant or reading store of its own; hosts
    // embedding the engine pass theirs to `Monitor::new`
    let store = Arc::new(InMemoryStore::new());
    tracing::warn!("No plant store attached, only site weather alerts will be raised");
    let mut monitor = Monitor::new(store.clone(), store, notifier, &config);

    if config.weather.enabled {
        tracing::info!(
            latitude = config.weather.latitude,
            longitude = config.weather.longitude,
            "Weather monitoring enabled"
        );
        monitor = monitor.with_weather(Arc::new(OpenMeteoClient::from_config(&config.weather)));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_task = tokio::spawn(async move {
        monitor.run(shutdown_rx).await;
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    shutdown_tx.send_replace(true);
    monitor_task.await?;

    Ok(())
}
