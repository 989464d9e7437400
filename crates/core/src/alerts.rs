//! Weather alerts derived from forecast thresholds.

use serde::{Deserialize, Serialize};

use crate::codes::wmo::is_storm;
use crate::forecast::{DailySample, ForecastSeries, HourlySample};

/// How many hourly samples ahead of "now" are inspected.
const LOOKAHEAD_HOURS: usize = 12;

const HEAVY_RAIN_MM: f64 = 5.0;
const LIKELY_RAIN_PROB: f64 = 70.0;
const HEAT_WARNING_C: f64 = 35.0;
const HEAT_DANGER_C: f64 = 38.0;
const FROST_WARNING_C: f64 = 0.0;
const FROST_DANGER_C: f64 = -5.0;
const WIND_WARNING_KMH: f64 = 50.0;
const WIND_DANGER_KMH: f64 = 70.0;
const UV_WARNING: f64 = 8.0;
const UV_DANGER: f64 = 11.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Storm,
    Rain,
    Heat,
    Cold,
    Wind,
    Uv,
    /// Issued by the upstream provider or a national weather service.
    Official,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        level: AlertLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Map a free-text provider severity ("Extreme", "Moderate", ...) to a level.
pub fn level_from_severity(severity: &str) -> AlertLevel {
    match severity.trim().to_ascii_lowercase().as_str() {
        "extreme" | "severe" | "rojo" | "red" => AlertLevel::Danger,
        "moderate" | "naranja" | "orange" | "amarillo" | "yellow" => AlertLevel::Warning,
        _ => AlertLevel::Info,
    }
}

/// Threshold alerts for the next hours starting at `start`, plus today's
/// daily extremes and current wind.
pub fn generate_alerts(series: &ForecastSeries, start: usize) -> Vec<Alert> {
    let end = (start + LOOKAHEAD_HOURS).min(series.hourly.len());
    let window = series.hourly.get(start..end).unwrap_or(&[]);
    let today = series
        .daily
        .iter()
        .find(|d| d.date == series.current.time.date());

    let mut alerts = Vec::new();
    alerts.extend(storm_alert(window));
    alerts.extend(rain_alert(window));
    if let Some(day) = today {
        alerts.extend(heat_alert(day));
        alerts.extend(cold_alert(day));
        alerts.extend(uv_alert(day));
    }
    alerts.extend(wind_alert(series.current.wind_speed));
    alerts
}

fn hhmm(sample: &HourlySample) -> String {
    sample.time.format("%H:%M").to_string()
}

fn storm_alert(window: &[HourlySample]) -> Option<Alert> {
    let hit = window.iter().find(|h| is_storm(h.weather_code))?;
    Some(Alert::new(
        AlertKind::Storm,
        AlertLevel::Danger,
        "Tormenta",
        format!("Posibles tormentas a partir de las {}.", hhmm(hit)),
    ))
}

fn rain_alert(window: &[HourlySample]) -> Option<Alert> {
    if let Some(hit) = window.iter().find(|h| h.precipitation >= HEAVY_RAIN_MM) {
        return Some(Alert::new(
            AlertKind::Rain,
            AlertLevel::Danger,
            "Lluvia intensa",
            format!("Se esperan {:.1} mm a las {}.", hit.precipitation, hhmm(hit)),
        ));
    }
    let hit = window
        .iter()
        .find(|h| h.precipitation_probability.is_some_and(|p| p >= LIKELY_RAIN_PROB))?;
    Some(Alert::new(
        AlertKind::Rain,
        AlertLevel::Warning,
        "Lluvia probable",
        format!(
            "Probabilidad de lluvia del {:.0}% a las {}.",
            hit.precipitation_probability.unwrap_or_default(),
            hhmm(hit)
        ),
    ))
}

fn heat_alert(day: &DailySample) -> Option<Alert> {
    let (level, title) = if day.temperature_max >= HEAT_DANGER_C {
        (AlertLevel::Danger, "Calor extremo")
    } else if day.temperature_max >= HEAT_WARNING_C {
        (AlertLevel::Warning, "Calor")
    } else {
        return None;
    };
    Some(Alert::new(
        AlertKind::Heat,
        level,
        title,
        format!("Máxima de {:.0}° hoy.", day.temperature_max),
    ))
}

fn cold_alert(day: &DailySample) -> Option<Alert> {
    let (level, title) = if day.temperature_min <= FROST_DANGER_C {
        (AlertLevel::Danger, "Frío extremo")
    } else if day.temperature_min <= FROST_WARNING_C {
        (AlertLevel::Warning, "Heladas")
    } else {
        return None;
    };
    Some(Alert::new(
        AlertKind::Cold,
        level,
        title,
        format!("Mínima de {:.0}° hoy.", day.temperature_min),
    ))
}

fn uv_alert(day: &DailySample) -> Option<Alert> {
    let uv = day.uv_index_max?;
    let (level, title) = if uv >= UV_DANGER {
        (AlertLevel::Danger, "Radiación UV extrema")
    } else if uv >= UV_WARNING {
        (AlertLevel::Warning, "Índice UV muy alto")
    } else {
        return None;
    };
    Some(Alert::new(
        AlertKind::Uv,
        level,
        title,
        format!("Índice UV máximo de {uv:.0}."),
    ))
}

fn wind_alert(wind_speed: f64) -> Option<Alert> {
    let (level, title) = if wind_speed >= WIND_DANGER_KMH {
        (AlertLevel::Danger, "Viento muy fuerte")
    } else if wind_speed >= WIND_WARNING_KMH {
        (AlertLevel::Warning, "Viento fuerte")
    } else {
        return None;
    };
    Some(Alert::new(
        AlertKind::Wind,
        level,
        title,
        format!("Viento de {wind_speed:.0} km/h."),
    ))
}
