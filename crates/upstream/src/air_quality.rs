//! Open-Meteo air-quality API: US AQI, particulates and pollen.

use aeris_core::forecast::{AirQuality, Pollen};
use aeris_core::types::GeoPoint;
use serde::Deserialize;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::http::parse_response;

const SERVICE: &str = "Open-Meteo air quality";

const AIR_FIELDS: &str = "us_aqi,pm10,pm2_5";
const POLLEN_FIELDS: &str = "alder_pollen,birch_pollen,grass_pollen,mugwort_pollen,olive_pollen,\
    ragweed_pollen,oak_pollen,pine_pollen,cypress_pollen,hazel_pollen,plane_tree_pollen,\
    poplar_pollen,ash_pollen";

#[derive(Debug, Deserialize)]
struct Response<T> {
    current: T,
}

#[derive(Debug, Default, Deserialize)]
struct AirBlock {
    us_aqi: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
}

/// Species outside Europe come back as null.
#[derive(Debug, Default, Deserialize)]
struct PollenBlock {
    alder_pollen: Option<f64>,
    birch_pollen: Option<f64>,
    grass_pollen: Option<f64>,
    mugwort_pollen: Option<f64>,
    olive_pollen: Option<f64>,
    ragweed_pollen: Option<f64>,
    oak_pollen: Option<f64>,
    pine_pollen: Option<f64>,
    cypress_pollen: Option<f64>,
    hazel_pollen: Option<f64>,
    plane_tree_pollen: Option<f64>,
    poplar_pollen: Option<f64>,
    ash_pollen: Option<f64>,
}

impl From<AirBlock> for AirQuality {
    fn from(b: AirBlock) -> Self {
        Self {
            aqi: b.us_aqi.unwrap_or_default(),
            pm25: b.pm2_5.unwrap_or_default(),
            pm10: b.pm10.unwrap_or_default(),
        }
    }
}

impl From<PollenBlock> for Pollen {
    fn from(b: PollenBlock) -> Self {
        Self {
            alder: b.alder_pollen.unwrap_or_default(),
            birch: b.birch_pollen.unwrap_or_default(),
            grass: b.grass_pollen.unwrap_or_default(),
            mugwort: b.mugwort_pollen.unwrap_or_default(),
            olive: b.olive_pollen.unwrap_or_default(),
            ragweed: b.ragweed_pollen.unwrap_or_default(),
            oak: b.oak_pollen.unwrap_or_default(),
            pine: b.pine_pollen.unwrap_or_default(),
            cypress: b.cypress_pollen.unwrap_or_default(),
            hazel: b.hazel_pollen.unwrap_or_default(),
            plane: b.plane_tree_pollen.unwrap_or_default(),
            poplar: b.poplar_pollen.unwrap_or_default(),
            ash: b.ash_pollen.unwrap_or_default(),
        }
    }
}

/// Client for the air-quality endpoint.
pub struct AirQualityClient {
    client: reqwest::Client,
    base_url: String,
}

impl AirQualityClient {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: config.air_quality_url.clone(),
        }
    }

    pub async fn air_quality(&self, point: GeoPoint) -> Result<AirQuality, UpstreamError> {
        let body: Response<AirBlock> = self.current(point, AIR_FIELDS).await?;
        Ok(body.current.into())
    }

    pub async fn pollen(&self, point: GeoPoint) -> Result<Pollen, UpstreamError> {
        let body: Response<PollenBlock> = self.current(point, POLLEN_FIELDS).await?;
        Ok(body.current.into())
    }

    async fn current<T: serde::de::DeserializeOwned>(
        &self,
        point: GeoPoint,
        fields: &str,
    ) -> Result<T, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/v1/air-quality", self.base_url))
            .query(&[
                ("latitude", point.lat.to_string()),
                ("longitude", point.lon.to_string()),
                ("current", fields.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;
        parse_response(SERVICE, response).await
    }
}
