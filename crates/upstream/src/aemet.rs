//! AEMET OpenData (Spanish state meteorological agency).
//!
//! Forecasts are published per municipality, so a point is first snapped to
//! the nearest known municipality. Every endpoint answers with an envelope
//! whose `datos` field is a one-shot URL holding the actual payload.

use aeris_core::codes::{aemet_sky_to_wmo, UNKNOWN_CODE};
use aeris_core::forecast::{CurrentSample, DailySample, ForecastSeries, HourlySample};
use aeris_core::geo::{nearest_city_within, City};
use aeris_core::source::SourceKind;
use aeris_core::types::GeoPoint;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::http::{parse_datetime, parse_response};
use crate::source::WeatherSource;

const SERVICE: &str = "AEMET";
const DAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Points further than this from any municipality are not served.
pub const MAX_MUNICIPALITY_KM: f64 = 40.0;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    descripcion: String,
    estado: u16,
    datos: Option<String>,
}

/// AEMET mixes strings and numbers for the same fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric value; `"Ip"` (inapreciable) is a trace amount and counts as 0.
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) if s.trim().eq_ignore_ascii_case("ip") => Some(0.0),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_str(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Periodic {
    value: Option<Value>,
    #[serde(default)]
    periodo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction<D> {
    prediccion: Days<D>,
}

#[derive(Debug, Deserialize)]
struct Days<D> {
    dia: Vec<D>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyDay {
    fecha: String,
    orto: Option<String>,
    ocaso: Option<String>,
    #[serde(default)]
    estado_cielo: Vec<Periodic>,
    #[serde(default)]
    precipitacion: Vec<Periodic>,
    #[serde(default)]
    prob_precipitacion: Vec<Periodic>,
    #[serde(default)]
    temperatura: Vec<Periodic>,
    #[serde(default)]
    sens_termica: Vec<Periodic>,
    #[serde(default)]
    humedad_relativa: Vec<Periodic>,
    #[serde(default)]
    viento_and_racha_max: Vec<Wind>,
}

#[derive(Debug, Deserialize)]
struct Wind {
    #[serde(default)]
    velocidad: Vec<Value>,
    #[serde(default)]
    periodo: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyDay {
    fecha: String,
    #[serde(default)]
    prob_precipitacion: Vec<Periodic>,
    #[serde(default)]
    estado_cielo: Vec<Periodic>,
    temperatura: DailyTemperature,
    uv_max: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DailyTemperature {
    maxima: Option<Value>,
    minima: Option<Value>,
}

/// Client for AEMET municipal forecasts.
#[derive(Debug)]
pub struct AemetSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AemetSource {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let api_key = config
            .aemet_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(UpstreamError::MissingKey { service: SERVICE })?;
        Ok(Self {
            client,
            base_url: config.aemet_url.clone(),
            api_key,
        })
    }

    /// Two-step fetch: the envelope, then the `datos` URL it points to.
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;
        let envelope: Envelope = parse_response(SERVICE, response).await?;

        let datos = match envelope.datos {
            Some(url) if envelope.estado == 200 => url,
            _ => {
                return Err(UpstreamError::ApiError {
                    service: SERVICE,
                    status: envelope.estado,
                    body: envelope.descripcion,
                })
            }
        };

        let response = self.client.get(datos).send().await?;
        parse_response(SERVICE, response).await
    }
}

#[async_trait]
impl WeatherSource for AemetSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Aemet
    }

    fn covers(&self, point: GeoPoint) -> bool {
        nearest_city_within(point, MAX_MUNICIPALITY_KM).is_some()
    }

    async fn forecast(&self, point: GeoPoint) -> Result<ForecastSeries, UpstreamError> {
        let (city, distance_km) = nearest_city_within(point, MAX_MUNICIPALITY_KM)
            .ok_or(UpstreamError::NotCovered { service: SERVICE })?;
        tracing::debug!(municipality = city.code, distance_km, "Using AEMET municipality");

        let hourly: Vec<Prediction<HourlyDay>> = self
            .fetch(&format!("/api/prediccion/especifica/municipio/horaria/{}", city.code))
            .await?;
        let daily: Vec<Prediction<DailyDay>> = self
            .fetch(&format!("/api/prediccion/especifica/municipio/diaria/{}", city.code))
            .await?;

        let hourly = hourly
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::parse(SERVICE, "empty hourly prediction"))?;
        let daily = daily
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::parse(SERVICE, "empty daily prediction"))?;

        let now = Utc::now().with_timezone(&city.timezone).naive_local();
        map_forecast(city, &hourly.prediccion.dia, &daily.prediccion.dia, now)
    }
}

fn parse_day(fecha: &str) -> Result<NaiveDate, UpstreamError> {
    Ok(parse_datetime(SERVICE, fecha, DAY_FORMAT)?.date())
}

/// Value reported for a given hour (`periodo` = `"HH"`).
fn hourly_value(entries: &[Periodic], hour: u32) -> Option<&Value> {
    entries
        .iter()
        .find(|e| e.periodo.as_deref().and_then(|p| p.parse::<u32>().ok()) == Some(hour))
        .and_then(|e| e.value.as_ref())
}

/// Value for the range containing `hour` (`periodo` = `"HHhh"`, e.g. `"0814"`).
fn range_value(entries: &[Periodic], hour: u32) -> Option<f64> {
    entries.iter().find_map(|e| {
        let periodo = e.periodo.as_deref()?;
        if periodo.len() != 4 {
            return None;
        }
        let from: u32 = periodo.get(..2)?.parse().ok()?;
        let to: u32 = periodo.get(2..)?.parse().ok()?;
        let inside = if from < to {
            (from..to).contains(&hour)
        } else {
            hour >= from || hour < to
        };
        if inside {
            e.value.as_ref()?.as_f64()
        } else {
            None
        }
    })
}

fn wind_speed(entries: &[Wind], hour: u32) -> Option<f64> {
    entries
        .iter()
        .filter(|w| w.periodo.as_deref().and_then(|p| p.parse::<u32>().ok()) == Some(hour))
        .find_map(|w| w.velocidad.first()?.as_f64())
}

fn sky(entries: &[Periodic], hour: u32) -> (i32, bool) {
    hourly_value(entries, hour)
        .and_then(|v| aemet_sky_to_wmo(&v.as_str()))
        .unwrap_or((UNKNOWN_CODE, (7..21).contains(&hour)))
}

/// Whole-day value: prefer the `00-24` period, else the first one present.
fn whole_day(entries: &[Periodic]) -> Option<&Value> {
    let present = |e: &&Periodic| e.value.as_ref().is_some_and(|v| !v.as_str().is_empty());
    entries
        .iter()
        .filter(present)
        .find(|e| e.periodo.as_deref() == Some("00-24"))
        .or_else(|| entries.iter().find(present))
        .and_then(|e| e.value.as_ref())
}

fn parse_clock(value: Option<&str>) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value?, "%H:%M").ok()
}

struct Hour {
    sample: HourlySample,
    apparent: Option<f64>,
    humidity: Option<f64>,
    wind: Option<f64>,
}

fn map_forecast(
    city: &City,
    hourly_days: &[HourlyDay],
    daily_days: &[DailyDay],
    now: NaiveDateTime,
) -> Result<ForecastSeries, UpstreamError> {
    let mut hours = Vec::new();
    let mut sun_times = Vec::new();

    for day in hourly_days {
        let date = parse_day(&day.fecha)?;
        sun_times.push((date, parse_clock(day.orto.as_deref()), parse_clock(day.ocaso.as_deref())));

        let mut day_hours: Vec<u32> = day
            .temperatura
            .iter()
            .filter_map(|t| t.periodo.as_deref()?.parse().ok())
            .filter(|h| *h < 24)
            .collect();
        day_hours.sort_unstable();
        day_hours.dedup();

        for hour in day_hours {
            let Some(temperature) = hourly_value(&day.temperatura, hour).and_then(Value::as_f64) else {
                continue;
            };
            let (weather_code, is_day) = sky(&day.estado_cielo, hour);
            hours.push(Hour {
                sample: HourlySample {
                    time: date.and_hms_opt(hour, 0, 0).unwrap_or_default(),
                    temperature,
                    precipitation_probability: range_value(&day.prob_precipitacion, hour),
                    precipitation: hourly_value(&day.precipitacion, hour)
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                    weather_code,
                    is_day,
                },
                apparent: hourly_value(&day.sens_termica, hour).and_then(Value::as_f64),
                humidity: hourly_value(&day.humedad_relativa, hour).and_then(Value::as_f64),
                wind: wind_speed(&day.viento_and_racha_max, hour),
            });
        }
    }

    if hours.is_empty() {
        return Err(UpstreamError::parse(SERVICE, "no hourly temperatures"));
    }

    // The sample for the current hour, else the last one before it, else the first.
    let current_hour = now.with_minute(0).and_then(|t| t.with_second(0)).unwrap_or(now);
    let current_idx = hours
        .iter()
        .rposition(|h| h.sample.time <= current_hour)
        .unwrap_or(0);
    let cur = &hours[current_idx];
    let current = CurrentSample {
        time: if cur.sample.time == current_hour { now } else { cur.sample.time },
        temperature: cur.sample.temperature,
        apparent_temperature: cur.apparent.unwrap_or(cur.sample.temperature),
        humidity: cur.humidity.unwrap_or_default(),
        wind_speed: cur.wind.unwrap_or_default(),
        weather_code: cur.sample.weather_code,
        is_day: cur.sample.is_day,
        cloud_cover: None,
    };

    let daily = daily_days
        .iter()
        .map(|day| {
            let date = parse_day(&day.fecha)?;
            let (sunrise, sunset) = sun_times
                .iter()
                .find(|(d, _, _)| *d == date)
                .map(|(_, rise, set)| (*rise, *set))
                .unwrap_or((None, None));
            let weather_code = whole_day(&day.estado_cielo)
                .and_then(|v| aemet_sky_to_wmo(&v.as_str()))
                .map(|(code, _)| code)
                .unwrap_or(UNKNOWN_CODE);
            let prob = day
                .prob_precipitacion
                .iter()
                .filter_map(|p| p.value.as_ref()?.as_f64())
                .reduce(f64::max);
            Ok(DailySample {
                date,
                temperature_max: day.temperatura.maxima.as_ref().and_then(Value::as_f64).unwrap_or_default(),
                temperature_min: day.temperatura.minima.as_ref().and_then(Value::as_f64).unwrap_or_default(),
                sunrise,
                sunset,
                weather_code,
                uv_index_max: day.uv_max.as_ref().and_then(Value::as_f64),
                precipitation_probability_max: prob,
            })
        })
        .collect::<Result<Vec<_>, UpstreamError>>()?;

    Ok(ForecastSeries {
        source: SourceKind::Aemet,
        timezone: city.timezone.name().to_string(),
        current,
        hourly: hours.into_iter().map(|h| h.sample).collect(),
        daily,
        minutely_15: Vec::new(),
        alerts: Vec::new(),
    })
}
