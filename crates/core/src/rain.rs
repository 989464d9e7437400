//! Imminent-rain detection for push notifications and the per-subscriber
//! throttle.

use chrono::{Duration, NaiveDateTime};

use crate::forecast::QuarterSample;
use crate::types::Timestamp;

/// Precipitation (mm per 15 minutes) counted as rain.
pub const RAIN_THRESHOLD_MM: f64 = 0.1;

/// Rain expected within the look-ahead horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct RainOutlook {
    /// First quarter-hour at or above [`RAIN_THRESHOLD_MM`].
    pub starts_at: NaiveDateTime,
    /// Minutes from now until `starts_at`, never negative.
    pub minutes_until: i64,
    /// Largest quarter-hour amount within the horizon.
    pub peak_mm: f64,
}

/// Look for rain in the samples between `now` and `now + horizon`.
pub fn upcoming_rain(
    now: NaiveDateTime,
    samples: &[QuarterSample],
    horizon: Duration,
) -> Option<RainOutlook> {
    let end = now + horizon;
    let mut window = samples
        .iter()
        .filter(|s| s.time >= now && s.time <= end)
        .filter(|s| s.precipitation >= RAIN_THRESHOLD_MM)
        .peekable();

    let first = window.peek()?.time;
    let peak_mm = window.map(|s| s.precipitation).fold(0.0, f64::max);

    Some(RainOutlook {
        starts_at: first,
        minutes_until: (first - now).num_minutes().max(0),
        peak_mm,
    })
}

/// Notification body for an outlook.
pub fn rain_message(city: Option<&str>, outlook: &RainOutlook) -> String {
    let place = city.map(str::trim).filter(|c| !c.is_empty()).unwrap_or("tu zona");
    if outlook.minutes_until == 0 {
        format!("Está empezando a llover en {place} ({:.1} mm).", outlook.peak_mm)
    } else {
        format!(
            "Lluvia en {place} en unos {} minutos ({:.1} mm).",
            outlook.minutes_until, outlook.peak_mm
        )
    }
}

/// Whether a subscriber last notified at `last` may be notified again.
pub fn should_notify(last: Option<Timestamp>, now: Timestamp, cooldown: Duration) -> bool {
    match last {
        None => true,
        Some(last) => now - last >= cooldown,
    }
}
