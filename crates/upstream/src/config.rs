//! Base URLs, keys and client settings for upstream services.

use std::time::Duration;

/// Upstream service configuration.
///
/// The defaults point at the public production services. Tests replace
/// the base URLs with a local mock server via [`UpstreamConfig::with_base_url`].
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub open_meteo_url: String,
    pub air_quality_url: String,
    pub geocoding_url: String,
    pub nominatim_url: String,
    pub aemet_url: String,
    pub weatherapi_url: String,
    pub aemet_api_key: Option<String>,
    pub weatherapi_key: Option<String>,
    /// Language for geocoding results and provider texts.
    pub language: String,
    pub timeout: Duration,
    /// Sent on every request; Nominatim rejects anonymous clients.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            open_meteo_url: "https://api.open-meteo.com".into(),
            air_quality_url: "https://air-quality-api.open-meteo.com".into(),
            geocoding_url: "https://geocoding-api.open-meteo.com".into(),
            nominatim_url: "https://nominatim.openstreetmap.org".into(),
            aemet_url: "https://opendata.aemet.es/opendata".into(),
            weatherapi_url: "https://api.weatherapi.com".into(),
            aemet_api_key: None,
            weatherapi_key: None,
            language: "es".into(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("AerisApp/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl UpstreamConfig {
    /// Point every service at the same base URL.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            open_meteo_url: base.clone(),
            air_quality_url: base.clone(),
            geocoding_url: base.clone(),
            nominatim_url: base.clone(),
            aemet_url: base.clone(),
            weatherapi_url: base,
            ..Self::default()
        }
    }
}
