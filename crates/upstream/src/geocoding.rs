//! Forward and reverse geocoding.

use aeris_core::types::GeoPoint;
use serde::Deserialize;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::http::parse_response;

/// A place returned by the Open-Meteo geocoding API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodedPlace {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl GeocodedPlace {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<GeocodedPlace>>,
}

/// A place returned by Nominatim reverse geocoding.
#[derive(Debug, Clone, PartialEq)]
pub struct NominatimPlace {
    /// City, town, village or municipality, whichever is most specific.
    pub place: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Geocoding client over Open-Meteo and Nominatim.
pub struct Geocoder {
    client: reqwest::Client,
    geocoding_url: String,
    nominatim_url: String,
    language: String,
}

impl Geocoder {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            geocoding_url: config.geocoding_url.clone(),
            nominatim_url: config.nominatim_url.clone(),
            language: config.language.clone(),
        }
    }

    /// Best match for a free-text place name, if any.
    pub async fn search(&self, name: &str) -> Result<Option<GeocodedPlace>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/v1/search", self.geocoding_url))
            .query(&[
                ("name", name),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;
        let body: SearchResponse = parse_response("Open-Meteo geocoding", response).await?;
        Ok(body.results.and_then(|r| r.into_iter().next()))
    }

    /// Nearest named place according to Open-Meteo.
    pub async fn reverse(&self, point: GeoPoint) -> Result<Option<GeocodedPlace>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/v1/reverse", self.geocoding_url))
            .query(&[
                ("latitude", point.lat.to_string()),
                ("longitude", point.lon.to_string()),
                ("count", "1".to_string()),
                ("language", self.language.clone()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;
        let body: SearchResponse = parse_response("Open-Meteo geocoding", response).await?;
        Ok(body.results.and_then(|r| r.into_iter().next()))
    }

    /// Reverse geocode through Nominatim at city zoom level.
    pub async fn reverse_nominatim(
        &self,
        point: GeoPoint,
    ) -> Result<Option<NominatimPlace>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/reverse", self.nominatim_url))
            .query(&[
                ("lat", point.lat.to_string()),
                ("lon", point.lon.to_string()),
                ("format", "json".to_string()),
                ("zoom", "10".to_string()),
                ("accept-language", self.language.clone()),
            ])
            .send()
            .await?;
        let body: NominatimResponse = parse_response("Nominatim", response).await?;
        Ok(body.address.map(|a| NominatimPlace {
            place: a.city.or(a.town).or(a.village).or(a.municipality),
            state: a.state,
            country: a.country,
        }))
    }
}
