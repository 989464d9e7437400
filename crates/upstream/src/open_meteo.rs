//! Open-Meteo forecast API.
//!
//! The only provider with past hours (`past_days=1`, used for the
//! comparison with yesterday) and 15-minute precipitation (used for the
//! nowcast and rain notifications).

use aeris_core::codes::UNKNOWN_CODE;
use aeris_core::forecast::{CurrentSample, DailySample, ForecastSeries, HourlySample, QuarterSample};
use aeris_core::source::SourceKind;
use aeris_core::types::GeoPoint;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::http::{at, parse_datetime, parse_response};
use crate::source::WeatherSource;

const SERVICE: &str = "Open-Meteo";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,\
    precipitation,weather_code,wind_speed_10m,cloud_cover";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation_probability,precipitation,weather_code,is_day";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset,\
    uv_index_max,precipitation_probability_max";

/// Quarter-hours requested for the rain nowcast (two hours).
const NOWCAST_QUARTERS: u32 = 8;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: String,
    current: CurrentBlock,
    hourly: HourlyBlock,
    daily: DailyBlock,
    #[serde(default)]
    minutely_15: Option<QuarterBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    is_day: Option<u8>,
    weather_code: Option<i32>,
    wind_speed_10m: Option<f64>,
    cloud_cover: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    is_day: Vec<Option<u8>>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct QuarterBlock {
    time: Vec<String>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct NowcastResponse {
    current: NowcastCurrent,
    minutely_15: QuarterBlock,
}

#[derive(Debug, Deserialize)]
struct NowcastCurrent {
    time: String,
}

/// Short-range precipitation at a point, in local time.
#[derive(Debug, Clone, PartialEq)]
pub struct NowcastSeries {
    pub now: NaiveDateTime,
    pub samples: Vec<QuarterSample>,
}

/// Client for the Open-Meteo forecast endpoint.
pub struct OpenMeteoSource {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoSource {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: config.open_meteo_url.clone(),
        }
    }

    /// Fetch the next two hours of 15-minute precipitation.
    pub async fn fetch_nowcast(&self, point: GeoPoint) -> Result<NowcastSeries, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/v1/forecast", self.base_url))
            .query(&[
                ("latitude", point.lat.to_string()),
                ("longitude", point.lon.to_string()),
                ("current", "precipitation".to_string()),
                ("minutely_15", "precipitation".to_string()),
                ("forecast_minutely_15", NOWCAST_QUARTERS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let body: NowcastResponse = parse_response(SERVICE, response).await?;
        Ok(NowcastSeries {
            now: parse_datetime(SERVICE, &body.current.time, TIME_FORMAT)?,
            samples: map_quarters(&body.minutely_15)?,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenMeteo
    }

    async fn forecast(&self, point: GeoPoint) -> Result<ForecastSeries, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/v1/forecast", self.base_url))
            .query(&[
                ("latitude", point.lat.to_string()),
                ("longitude", point.lon.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("minutely_15", "precipitation".to_string()),
                ("timezone", "auto".to_string()),
                ("past_days", "1".to_string()),
            ])
            .send()
            .await?;

        let body: ForecastResponse = parse_response(SERVICE, response).await?;
        map_forecast(body)
    }
}

fn map_forecast(body: ForecastResponse) -> Result<ForecastSeries, UpstreamError> {
    let c = &body.current;
    let current = CurrentSample {
        time: parse_datetime(SERVICE, &c.time, TIME_FORMAT)?,
        temperature: c.temperature_2m.unwrap_or_default(),
        apparent_temperature: c.apparent_temperature.or(c.temperature_2m).unwrap_or_default(),
        humidity: c.relative_humidity_2m.unwrap_or_default(),
        wind_speed: c.wind_speed_10m.unwrap_or_default(),
        weather_code: c.weather_code.unwrap_or(UNKNOWN_CODE),
        is_day: c.is_day.unwrap_or(1) == 1,
        cloud_cover: c.cloud_cover,
    };

    let h = &body.hourly;
    let hourly = h
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| {
            Ok(HourlySample {
                time: parse_datetime(SERVICE, time, TIME_FORMAT)?,
                temperature: at(&h.temperature_2m, i).unwrap_or_default(),
                precipitation_probability: at(&h.precipitation_probability, i),
                precipitation: at(&h.precipitation, i).unwrap_or_default(),
                weather_code: at(&h.weather_code, i).unwrap_or(UNKNOWN_CODE),
                is_day: at(&h.is_day, i).unwrap_or(1) == 1,
            })
        })
        .collect::<Result<Vec<_>, UpstreamError>>()?;

    let d = &body.daily;
    let daily = d
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| UpstreamError::parse(SERVICE, format!("bad date {date:?}: {e}")))?;
            Ok(DailySample {
                date,
                temperature_max: at(&d.temperature_2m_max, i).unwrap_or_default(),
                temperature_min: at(&d.temperature_2m_min, i).unwrap_or_default(),
                sunrise: clock_time(d.sunrise.get(i)),
                sunset: clock_time(d.sunset.get(i)),
                weather_code: at(&d.weather_code, i).unwrap_or(UNKNOWN_CODE),
                uv_index_max: at(&d.uv_index_max, i),
                precipitation_probability_max: at(&d.precipitation_probability_max, i),
            })
        })
        .collect::<Result<Vec<_>, UpstreamError>>()?;

    let minutely_15 = match &body.minutely_15 {
        Some(block) => map_quarters(block)?,
        None => Vec::new(),
    };

    Ok(ForecastSeries {
        source: SourceKind::OpenMeteo,
        timezone: body.timezone,
        current,
        hourly,
        daily,
        minutely_15,
        alerts: Vec::new(),
    })
}

fn map_quarters(block: &QuarterBlock) -> Result<Vec<QuarterSample>, UpstreamError> {
    block
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| {
            Ok(QuarterSample {
                time: parse_datetime(SERVICE, time, TIME_FORMAT)?,
                precipitation: at(&block.precipitation, i).unwrap_or_default(),
            })
        })
        .collect()
}

/// Sunrise/sunset arrive as full local timestamps; polar days send null.
fn clock_time(value: Option<&Option<String>>) -> Option<chrono::NaiveTime> {
    let value = value?.as_deref()?;
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .ok()
        .map(|dt| dt.time())
}
