//! Threshold evaluation and alert debouncing
//!
//! Evaluation is pure: weather and soil readings go in, a list of breaches
//! comes out. [`AlertBook`] then turns breaches into deliveries, sending
//! each violation episode once per recipient and resending only after the
//! cooldown has elapsed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    AlertEvent, AlertKind, AlertSeverity, Plant, Reading, RequirementEnvelope, WeatherConditions,
};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::ThresholdConfig;

/// A threshold currently being crossed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breach {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub recommendations: Vec<String>,
}

// ============================================================================
// Weather rules
// ============================================================================

/// Evaluate site-wide weather, enriched with the freshest soil reading
///
/// `heavy_rain_periods` is the number of forecast days expected to be wet;
/// it only affects storm severity.
pub fn evaluate_weather(
    weather: &WeatherConditions,
    soil: Option<&Reading>,
    heavy_rain_periods: usize,
    thresholds: &ThresholdConfig,
) -> Vec<Breach> {
    let mut breaches = Vec::new();
    let soil_moisture = soil.map(|r| r.moisture);

    if weather.temperature_celsius >= thresholds.heat_temperature {
        let mut recommendations = vec![
            "Water early in the morning or in the evening".to_string(),
            "Provide shade during the hottest hours".to_string(),
            "Mulch around the base to hold soil moisture".to_string(),
        ];
        if let Some(moisture) = soil_moisture.filter(|m| *m < thresholds.heat_dry_soil_moisture) {
            recommendations.push(format!(
                "Soil moisture is only {:.0}%, water deeply today",
                moisture
            ));
        }
        breaches.push(Breach {
            kind: AlertKind::Heat,
            severity: AlertSeverity::High,
            message: format!(
                "Heat warning: {:.1}°C with {}",
                weather.temperature_celsius, weather.description
            ),
            recommendations,
        });
    }

    let storm_likely = weather
        .precipitation_probability
        .map(|p| p > thresholds.storm_precipitation_probability)
        .unwrap_or(false);
    if storm_likely || weather.condition.is_wet() {
        let mut recommendations = vec![
            "Secure tall plants and stakes".to_string(),
            "Check that beds and containers drain freely".to_string(),
            "Hold off on fertilizing until the rain has passed".to_string(),
        ];
        if let Some(moisture) =
            soil_moisture.filter(|m| *m > thresholds.storm_saturated_soil_moisture)
        {
            recommendations.push(format!(
                "Soil is already saturated at {:.0}%, skip watering and clear drainage paths",
                moisture
            ));
        }
        let severity = if heavy_rain_periods > thresholds.heavy_rain_periods_for_high {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };
        breaches.push(Breach {
            kind: AlertKind::Storm,
            severity,
            message: format!(
                "Wet weather expected: {}, {} heavy rain day(s) ahead",
                weather.description, heavy_rain_periods
            ),
            recommendations,
        });
    }

    if weather.humidity_percent < thresholds.drought_humidity
        && weather.temperature_celsius > thresholds.drought_temperature
    {
        let mut recommendations = vec![
            "Water deeply and less often to encourage deep roots".to_string(),
            "Add a thick layer of mulch".to_string(),
            "Group containers together to raise local humidity".to_string(),
        ];
        let critical_soil =
            soil_moisture.filter(|m| *m < thresholds.drought_critical_soil_moisture);
        if let Some(moisture) = critical_soil {
            recommendations.insert(
                0,
                format!("CRITICAL: soil moisture is {:.0}%, water immediately", moisture),
            );
        }
        breaches.push(Breach {
            kind: AlertKind::Drought,
            severity: if critical_soil.is_some() {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            },
            message: format!(
                "Drought conditions: {:.0}% humidity at {:.1}°C",
                weather.humidity_percent, weather.temperature_celsius
            ),
            recommendations,
        });
    }

    if let Some(uv) = weather.uv_index.filter(|uv| *uv > thresholds.uv_index) {
        breaches.push(Breach {
            kind: AlertKind::HighUv,
            severity: AlertSeverity::Medium,
            message: format!("High UV index: {:.1}", uv),
            recommendations: vec![
                "Move sensitive containers into partial shade".to_string(),
                "Use shade cloth over seedlings at midday".to_string(),
            ],
        });
    }

    breaches
}

// ============================================================================
// Soil rules
// ============================================================================

/// Evaluate one plant's latest reading against its envelope
pub fn evaluate_soil(
    plant: &Plant,
    reading: &Reading,
    envelope: &RequirementEnvelope,
    thresholds: &ThresholdConfig,
    health_score: u8,
) -> Vec<Breach> {
    let mut breaches = Vec::new();
    let target = envelope.moisture_target;

    let low_severity = if reading.moisture < thresholds.soil_moisture_critical_low {
        Some(AlertSeverity::High)
    } else if reading.moisture < target - thresholds.soil_moisture_low_margin {
        Some(AlertSeverity::Medium)
    } else {
        None
    };
    if let Some(severity) = low_severity {
        breaches.push(Breach {
            kind: AlertKind::SoilLow,
            severity,
            message: format!(
                "{}: soil moisture {:.0}% is well below its {:.0}% target (health {}/100)",
                plant.common_name, reading.moisture, target, health_score
            ),
            recommendations: vec![
                "Water thoroughly until it drains from the bottom".to_string(),
                "Increase watering frequency".to_string(),
            ],
        });
    }

    let high_severity = if reading.moisture > thresholds.soil_moisture_critical_high {
        Some(AlertSeverity::High)
    } else if reading.moisture > target + thresholds.soil_moisture_high_margin {
        Some(AlertSeverity::Medium)
    } else {
        None
    };
    if let Some(severity) = high_severity {
        breaches.push(Breach {
            kind: AlertKind::SoilHigh,
            severity,
            message: format!(
                "{}: soil moisture {:.0}% is well above its {:.0}% target (health {}/100)",
                plant.common_name, reading.moisture, target, health_score
            ),
            recommendations: vec![
                "Stop watering until the topsoil dries".to_string(),
                "Check drainage holes and loosen compacted soil".to_string(),
            ],
        });
    }

    if reading.temperature > thresholds.soil_heat_temperature {
        breaches.push(Breach {
            kind: AlertKind::Heat,
            severity: AlertSeverity::High,
            message: format!(
                "{}: soil temperature {:.1}°C is dangerously high (health {}/100)",
                plant.common_name, reading.temperature, health_score
            ),
            recommendations: vec![
                "Shade the root zone".to_string(),
                "Water in the early morning to cool the soil".to_string(),
            ],
        });
    }

    breaches
}

// ============================================================================
// Debouncing
// ============================================================================

/// An alert that should be sent now
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelivery {
    pub recipient: String,
    pub event: AlertEvent,
}

/// Active alerts for one entity, keyed by recipient and kind
///
/// A key present in the book is ACTIVE; a missing key is CLEAR.
#[derive(Debug, Clone, Default)]
pub struct AlertBook {
    entity_id: Option<Uuid>,
    active: BTreeMap<(String, AlertKind), ActiveAlert>,
}

#[derive(Debug, Clone)]
struct ActiveAlert {
    event: AlertEvent,
    /// Highest severity delivered this episode; never lowered
    delivered: Option<AlertSeverity>,
}

impl AlertBook {
    /// Book for a plant, or for site-wide weather when `entity_id` is `None`
    pub fn new(entity_id: Option<Uuid>) -> Self {
        Self {
            entity_id,
            active: BTreeMap::new(),
        }
    }

    /// Apply this tick's breaches and return what must be sent
    ///
    /// - new breach: activate and send
    /// - active and never delivered: retry
    /// - active, delivered, cooldown elapsed: refresh and resend
    /// - active, severity above anything delivered this episode: resend
    /// - otherwise: suppress
    ///
    /// Alerts whose condition no longer holds are cleared.
    pub fn reconcile(
        &mut self,
        breaches: &[Breach],
        recipients: &[String],
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Vec<PendingDelivery> {
        let mut pending = Vec::new();

        for recipient in recipients {
            for breach in breaches {
                let key = (recipient.clone(), breach.kind);
                match self.active.get_mut(&key) {
                    None => {
                        let event = AlertEvent {
                            entity_id: self.entity_id,
                            kind: breach.kind,
                            severity: breach.severity,
                            message: breach.message.clone(),
                            recommendations: breach.recommendations.clone(),
                            first_seen_at: now,
                            last_sent_at: None,
                        };
                        tracing::info!(
                            recipient = %recipient,
                            kind = %breach.kind,
                            severity = %breach.severity,
                            "Alert activated"
                        );
                        pending.push(PendingDelivery {
                            recipient: recipient.clone(),
                            event: event.clone(),
                        });
                        self.active.insert(
                            key,
                            ActiveAlert {
                                event,
                                delivered: None,
                            },
                        );
                    }
                    Some(ActiveAlert { event, delivered }) => {
                        let escalated = delivered.is_some_and(|d| breach.severity > d);
                        event.severity = breach.severity;
                        event.message = breach.message.clone();
                        event.recommendations = breach.recommendations.clone();

                        let due = match event.last_sent_at {
                            None => true,
                            Some(sent) => now - sent >= cooldown,
                        };
                        if due || escalated {
                            pending.push(PendingDelivery {
                                recipient: recipient.clone(),
                                event: event.clone(),
                            });
                        } else {
                            tracing::debug!(
                                recipient = %recipient,
                                kind = %breach.kind,
                                "Alert still active within cooldown, not resending"
                            );
                        }
                    }
                }
            }
        }

        self.active.retain(|(recipient, kind), _| {
            let still_breached = recipients.contains(recipient)
                && breaches.iter().any(|b| b.kind == *kind);
            if !still_breached {
                tracing::info!(recipient = %recipient, kind = %kind, "Alert cleared");
            }
            still_breached
        });

        pending
    }

    /// Record a successful delivery
    pub fn mark_sent(&mut self, recipient: &str, kind: AlertKind, at: DateTime<Utc>) {
        if let Some(alert) = self.active.get_mut(&(recipient.to_string(), kind)) {
            alert.event.last_sent_at = Some(at);
            let severity = alert.event.severity;
            alert.delivered = Some(alert.delivered.map_or(severity, |d| d.max(severity)));
        }
    }

    pub fn get(&self, recipient: &str, kind: AlertKind) -> Option<&AlertEvent> {
        self.active
            .get(&(recipient.to_string(), kind))
            .map(|alert| &alert.event)
    }

    pub fn active(&self) -> impl Iterator<Item = &AlertEvent> {
        self.active.values().map(|alert| &alert.event)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// One-line summary of the weather, soil context and alert count
pub fn summarize(
    weather: Option<&WeatherConditions>,
    soil: Option<&Reading>,
    active_alerts: usize,
) -> String {
    let weather_part = match weather {
        Some(w) => format!(
            "{:.1}°C, {}, {:.0}% humidity",
            w.temperature_celsius, w.description, w.humidity_percent
        ),
        None => "unavailable".to_string(),
    };
    let soil_part = match soil {
        Some(r) => format!("{:.0}% moisture, {:.1}°C", r.moisture, r.temperature),
        None => "no data".to_string(),
    };
    format!(
        "Weather: {} | Soil: {} | Active alerts: {}",
        weather_part, soil_part, active_alerts
    )
}
