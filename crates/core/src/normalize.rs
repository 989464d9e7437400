//! Build the canonical [`WeatherReport`] from a provider-neutral
//! [`ForecastSeries`].

use chrono::Timelike;

use crate::alerts::generate_alerts;
use crate::codes::decode_wmo;
use crate::forecast::{
    AirQuality, CurrentConditions, DailyEntry, DayHour, ForecastSeries, HourlyEntry,
    HourlySample, Nowcast, Pollen, ReportLocation, WeatherReport,
};
use crate::types::GeoPoint;

/// Number of hourly entries in the report.
pub const HOURLY_ENTRIES: usize = 24;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Everything besides the forecast that goes into a report.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub name: &'a str,
    pub region: &'a str,
    pub point: GeoPoint,
    pub air: AirQuality,
    pub pollen: Pollen,
}

/// Round half towards positive infinity, the way the front-end rounds.
///
/// ```
/// use aeris_core::normalize::round_half_up;
///
/// assert_eq!(round_half_up(2.5), 3);
/// assert_eq!(round_half_up(-2.5), -2);
/// assert_eq!(round_half_up(-0.4), 0);
/// ```
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Index of the first hourly sample inside the current hour, or `0`.
pub fn start_index(series: &ForecastSeries) -> usize {
    let now = series.current.time;
    series
        .hourly
        .iter()
        .position(|h| h.time.date() == now.date() && h.time.hour() == now.hour())
        .unwrap_or(0)
}

/// Compare the temperature at `start` with the same hour 24 samples earlier.
///
/// Returns an empty string when there is not a full day of history.
pub fn compare_with_yesterday(hourly: &[HourlySample], start: usize) -> String {
    if start < 24 || start >= hourly.len() {
        return String::new();
    }
    let diff = hourly[start].temperature - hourly[start - 24].temperature;
    if diff.abs() < 1.0 {
        "Misma temperatura que ayer".to_string()
    } else if diff > 0.0 {
        format!("{}° más calor que ayer", round_half_up(diff))
    } else {
        format!("{}° más frío que ayer", round_half_up(diff).abs())
    }
}

fn rounded_prob(prob: Option<f64>) -> Option<i32> {
    prob.map(round_half_up)
}

/// Map a series into the canonical report.
pub fn build_report(series: &ForecastSeries, ctx: ReportContext<'_>) -> WeatherReport {
    let now = series.current.time;
    let today = now.date();
    let start = start_index(series);

    let current_code = decode_wmo(series.current.weather_code, series.current.is_day);
    let uv = series
        .daily
        .iter()
        .find(|d| d.date == today)
        .or_else(|| series.daily.iter().find(|d| d.date >= today))
        .and_then(|d| d.uv_index_max)
        .unwrap_or(0.0);

    let current = CurrentConditions {
        temp: round_half_up(series.current.temperature),
        feels_like: round_half_up(series.current.apparent_temperature),
        humidity: round_half_up(series.current.humidity),
        wind_speed: round_half_up(series.current.wind_speed),
        desc: current_code.text.to_string(),
        icon: current_code.icon.to_string(),
        is_day: series.current.is_day,
        uv,
        aqi: ctx.air.aqi,
        pm25: ctx.air.pm25,
        pm10: ctx.air.pm10,
        time: now.format(DATE_TIME_FORMAT).to_string(),
        cloud_cover: series.current.cloud_cover.unwrap_or(0.0),
        comparison: compare_with_yesterday(&series.hourly, start),
    };

    let hourly = series
        .hourly
        .iter()
        .skip(start)
        .take(HOURLY_ENTRIES)
        .map(|h| HourlyEntry {
            full_date: h.time.format(DATE_TIME_FORMAT).to_string(),
            hour: h.time.hour(),
            display_time: h.time.format(TIME_FORMAT).to_string(),
            temp: round_half_up(h.temperature),
            rain_prob: rounded_prob(h.precipitation_probability),
            precip: h.precipitation,
            icon: decode_wmo(h.weather_code, h.is_day).icon.to_string(),
        })
        .collect();

    let (times, amounts): (Vec<_>, Vec<_>) = series
        .minutely_15
        .iter()
        .filter(|q| q.time >= now)
        .map(|q| (q.time.format(DATE_TIME_FORMAT).to_string(), q.precipitation))
        .unzip();
    let nowcast = Nowcast {
        time: times,
        precipitation: amounts,
    };

    let daily = series
        .daily
        .iter()
        .filter(|d| d.date >= today)
        .map(|d| DailyEntry {
            fecha: d.date.format(DATE_FORMAT).to_string(),
            temp_max: round_half_up(d.temperature_max),
            temp_min: round_half_up(d.temperature_min),
            sunrise: d
                .sunrise
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_default(),
            sunset: d
                .sunset
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_default(),
            icon: decode_wmo(d.weather_code, true).icon.to_string(),
            rain_prob_max: rounded_prob(d.precipitation_probability_max),
            day_hours: series
                .hourly
                .iter()
                .filter(|h| h.time.date() == d.date)
                .map(|h| DayHour {
                    time: h.time.format(TIME_FORMAT).to_string(),
                    temp: round_half_up(h.temperature),
                    rain_prob: rounded_prob(h.precipitation_probability),
                    icon: decode_wmo(h.weather_code, true).icon.to_string(),
                })
                .collect(),
        })
        .collect();

    let mut alerts = generate_alerts(series, start);
    alerts.extend(series.alerts.iter().cloned());

    WeatherReport {
        location: ReportLocation {
            name: ctx.name.to_string(),
            region: ctx.region.to_string(),
            lat: ctx.point.lat,
            lon: ctx.point.lon,
            timezone: series.timezone.clone(),
        },
        current,
        nowcast,
        hourly,
        pollen: ctx.pollen,
        alerts,
        daily,
        source: series.source,
    }
}
