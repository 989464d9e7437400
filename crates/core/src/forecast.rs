//! Forecast data shapes.
//!
//! [`ForecastSeries`] is what every upstream provider is mapped into: local
//! wall-clock time series with WMO condition codes. [`WeatherReport`] is the
//! canonical JSON document served to the front-end and stored in the cache;
//! it is produced from a series by [`crate::normalize::build_report`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::alerts::Alert;
use crate::source::SourceKind;

// ---------------------------------------------------------------------------
// Provider-neutral series
// ---------------------------------------------------------------------------

/// Conditions at the time the provider produced the forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSample {
    /// Local time at the location.
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Wind speed, km/h.
    pub wind_speed: f64,
    pub weather_code: i32,
    pub is_day: bool,
    /// Cloud cover, percent.
    pub cloud_cover: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub precipitation_probability: Option<f64>,
    /// Precipitation over the hour, mm.
    pub precipitation: f64,
    pub weather_code: i32,
    pub is_day: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySample {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    pub weather_code: i32,
    pub uv_index_max: Option<f64>,
    pub precipitation_probability_max: Option<f64>,
}

/// Precipitation over the 15 minutes preceding `time`, mm.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterSample {
    pub time: NaiveDateTime,
    pub precipitation: f64,
}

/// A provider response mapped into common units and codes.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    pub source: SourceKind,
    /// IANA timezone of the location, e.g. `Europe/Madrid`.
    pub timezone: String,
    pub current: CurrentSample,
    /// Hourly samples in chronological order. May start before `current`
    /// when the provider returns past hours.
    pub hourly: Vec<HourlySample>,
    pub daily: Vec<DailySample>,
    pub minutely_15: Vec<QuarterSample>,
    /// Warnings issued by the provider itself.
    pub alerts: Vec<Alert>,
}

/// Air quality at the location (US AQI scale, µg/m³).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AirQuality {
    pub aqi: f64,
    pub pm25: f64,
    pub pm10: f64,
}

/// Pollen concentrations, grains/m³. Missing species are `0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pollen {
    pub alder: f64,
    pub birch: f64,
    pub grass: f64,
    pub mugwort: f64,
    pub olive: f64,
    pub ragweed: f64,
    pub oak: f64,
    pub pine: f64,
    pub cypress: f64,
    pub hazel: f64,
    pub plane: f64,
    pub poplar: f64,
    pub ash: f64,
}

// ---------------------------------------------------------------------------
// Canonical report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLocation {
    pub name: String,
    pub region: String,
    pub lat: f64,
    pub lon: f64,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temp: i32,
    pub feels_like: i32,
    pub humidity: i32,
    pub wind_speed: i32,
    pub desc: String,
    pub icon: String,
    pub is_day: bool,
    pub uv: f64,
    pub aqi: f64,
    pub pm25: f64,
    pub pm10: f64,
    /// Local time, `YYYY-MM-DDTHH:MM`.
    pub time: String,
    pub cloud_cover: f64,
    /// Temperature change against the same hour yesterday; empty when the
    /// provider has no past data.
    pub comparison: String,
}

/// Parallel arrays of 15-minute precipitation from now onwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nowcast {
    pub time: Vec<String>,
    pub precipitation: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyEntry {
    pub full_date: String,
    pub hour: u32,
    pub display_time: String,
    pub temp: i32,
    pub rain_prob: Option<i32>,
    pub precip: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHour {
    pub time: String,
    pub temp: i32,
    pub rain_prob: Option<i32>,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    /// `YYYY-MM-DD`.
    pub fecha: String,
    pub temp_max: i32,
    pub temp_min: i32,
    /// `HH:MM`, empty when unknown.
    pub sunrise: String,
    pub sunset: String,
    pub icon: String,
    pub rain_prob_max: Option<i32>,
    pub day_hours: Vec<DayHour>,
}

/// The canonical weather document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: ReportLocation,
    pub current: CurrentConditions,
    pub nowcast: Nowcast,
    pub hourly: Vec<HourlyEntry>,
    pub pollen: Pollen,
    pub alerts: Vec<Alert>,
    pub daily: Vec<DailyEntry>,
    pub source: SourceKind,
}
