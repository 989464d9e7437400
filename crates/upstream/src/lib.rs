//! HTTP clients for the third-party services Aeris depends on.
//!
//! - [`geocoding::Geocoder`]: Open-Meteo forward/reverse geocoding and
//!   Nominatim reverse geocoding.
//! - [`open_meteo::OpenMeteoSource`], [`aemet::AemetSource`],
//!   [`weatherapi::WeatherApiSource`]: forecast providers, each mapping its
//!   own schema into an [`aeris_core::forecast::ForecastSeries`].
//! - [`air_quality::AirQualityClient`]: air quality and pollen.
//! - [`chain::SourceChain`]: ordered fallback across providers.

pub mod aemet;
pub mod air_quality;
pub mod chain;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod open_meteo;
pub mod source;
pub mod weatherapi;

pub use chain::SourceChain;
pub use config::UpstreamConfig;
pub use error::UpstreamError;
pub use source::WeatherSource;
