//! WeatherAPI.com forecast API.

use aeris_core::alerts::{level_from_severity, Alert, AlertKind};
use aeris_core::codes::{weatherapi_to_wmo, UNKNOWN_CODE};
use aeris_core::forecast::{CurrentSample, DailySample, ForecastSeries, HourlySample};
use aeris_core::source::SourceKind;
use aeris_core::types::GeoPoint;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::http::{parse_datetime, parse_response};
use crate::source::WeatherSource;

const SERVICE: &str = "WeatherAPI";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const FORECAST_DAYS: u8 = 3;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: LocationBlock,
    current: CurrentBlock,
    forecast: ForecastBlock,
    #[serde(default)]
    alerts: Option<AlertsBlock>,
}

#[derive(Debug, Deserialize)]
struct LocationBlock {
    tz_id: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct Condition {
    code: i32,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temp_c: f64,
    feelslike_c: Option<f64>,
    humidity: Option<f64>,
    wind_kph: Option<f64>,
    cloud: Option<f64>,
    is_day: u8,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: DayBlock,
    astro: Option<AstroBlock>,
    #[serde(default)]
    hour: Vec<HourBlock>,
}

#[derive(Debug, Deserialize)]
struct DayBlock {
    maxtemp_c: f64,
    mintemp_c: f64,
    daily_chance_of_rain: Option<f64>,
    uv: Option<f64>,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct AstroBlock {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HourBlock {
    time: String,
    temp_c: f64,
    chance_of_rain: Option<f64>,
    precip_mm: Option<f64>,
    is_day: u8,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct AlertsBlock {
    #[serde(default)]
    alert: Vec<AlertBlock>,
}

#[derive(Debug, Deserialize)]
struct AlertBlock {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    event: String,
    #[serde(default)]
    desc: String,
}

/// Client for the WeatherAPI.com `forecast.json` endpoint.
pub struct WeatherApiSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl WeatherApiSource {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let api_key = config
            .weatherapi_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(UpstreamError::MissingKey { service: SERVICE })?;
        Ok(Self {
            client,
            base_url: config.weatherapi_url.clone(),
            api_key,
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::WeatherApi
    }

    async fn forecast(&self, point: GeoPoint) -> Result<ForecastSeries, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/v1/forecast.json", self.base_url))
            .query(&[
                ("key", self.api_key.clone()),
                ("q", format!("{},{}", point.lat, point.lon)),
                ("days", FORECAST_DAYS.to_string()),
                ("aqi", "no".to_string()),
                ("alerts", "yes".to_string()),
                ("lang", self.language.clone()),
            ])
            .send()
            .await?;

        let body: ForecastResponse = parse_response(SERVICE, response).await?;
        map_forecast(body)
    }
}

fn wmo(condition: &Condition) -> i32 {
    weatherapi_to_wmo(condition.code).unwrap_or(UNKNOWN_CODE)
}

/// Astronomy times look like `"07:45 AM"`; polar days send `"No sunrise"`.
fn parse_clock(value: Option<&str>) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value?.trim(), "%I:%M %p").ok()
}

fn map_forecast(body: ForecastResponse) -> Result<ForecastSeries, UpstreamError> {
    let c = &body.current;
    let current = CurrentSample {
        time: parse_datetime(SERVICE, &body.location.localtime, TIME_FORMAT)?,
        temperature: c.temp_c,
        apparent_temperature: c.feelslike_c.unwrap_or(c.temp_c),
        humidity: c.humidity.unwrap_or_default(),
        wind_speed: c.wind_kph.unwrap_or_default(),
        weather_code: wmo(&c.condition),
        is_day: c.is_day == 1,
        cloud_cover: c.cloud,
    };

    let mut hourly = Vec::new();
    let mut daily = Vec::new();
    for fd in &body.forecast.forecastday {
        let date = NaiveDate::parse_from_str(&fd.date, "%Y-%m-%d")
            .map_err(|e| UpstreamError::parse(SERVICE, format!("bad date {:?}: {e}", fd.date)))?;
        let astro = fd.astro.as_ref();
        daily.push(DailySample {
            date,
            temperature_max: fd.day.maxtemp_c,
            temperature_min: fd.day.mintemp_c,
            sunrise: parse_clock(astro.and_then(|a| a.sunrise.as_deref())),
            sunset: parse_clock(astro.and_then(|a| a.sunset.as_deref())),
            weather_code: wmo(&fd.day.condition),
            uv_index_max: fd.day.uv,
            precipitation_probability_max: fd.day.daily_chance_of_rain,
        });

        for h in &fd.hour {
            hourly.push(HourlySample {
                time: parse_datetime(SERVICE, &h.time, TIME_FORMAT)?,
                temperature: h.temp_c,
                precipitation_probability: h.chance_of_rain,
                precipitation: h.precip_mm.unwrap_or_default(),
                weather_code: wmo(&h.condition),
                is_day: h.is_day == 1,
            });
        }
    }

    let alerts = body
        .alerts
        .map(|a| a.alert)
        .unwrap_or_default()
        .into_iter()
        .map(|a| {
            let title = if a.event.is_empty() { a.headline } else { a.event };
            Alert::new(AlertKind::Official, level_from_severity(&a.severity), title, a.desc)
        })
        .collect();

    Ok(ForecastSeries {
        source: SourceKind::WeatherApi,
        timezone: body.location.tz_id,
        current,
        hourly,
        daily,
        minutely_15: Vec::new(),
        alerts,
    })
}
