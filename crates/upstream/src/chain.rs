//! Ordered fallback across forecast providers.

use std::sync::Arc;

use aeris_core::forecast::ForecastSeries;
use aeris_core::source::SourceKind;
use aeris_core::types::GeoPoint;

use crate::aemet::AemetSource;
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::open_meteo::OpenMeteoSource;
use crate::source::WeatherSource;
use crate::weatherapi::WeatherApiSource;

/// Providers tried in order until one succeeds.
#[derive(Clone)]
pub struct SourceChain {
    sources: Vec<Arc<dyn WeatherSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Arc<dyn WeatherSource>>) -> Self {
        Self { sources }
    }

    /// Build the providers named in `kinds`, in that order.
    ///
    /// Providers whose API key is missing are skipped with a warning.
    pub fn from_config(
        client: &reqwest::Client,
        config: &UpstreamConfig,
        kinds: &[SourceKind],
    ) -> Self {
        let mut sources: Vec<Arc<dyn WeatherSource>> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let built: Result<Arc<dyn WeatherSource>, UpstreamError> = match kind {
                SourceKind::OpenMeteo => Ok(Arc::new(OpenMeteoSource::new(client.clone(), config))),
                SourceKind::Aemet => AemetSource::new(client.clone(), config)
                    .map(|s| Arc::new(s) as Arc<dyn WeatherSource>),
                SourceKind::WeatherApi => WeatherApiSource::new(client.clone(), config)
                    .map(|s| Arc::new(s) as Arc<dyn WeatherSource>),
            };
            match built {
                Ok(source) => sources.push(source),
                Err(e) => tracing::warn!(source = %kind, error = %e, "Weather source disabled"),
            }
        }
        Self::new(sources)
    }

    pub fn kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether a configured source of `kind` can serve `point`.
    pub fn serves(&self, kind: SourceKind, point: GeoPoint) -> bool {
        self.sources
            .iter()
            .any(|s| s.kind() == kind && s.covers(point))
    }

    /// Sources in the order they will be tried: `preferred` first if it is
    /// configured, then the rest in configured order.
    pub fn ordered(&self, preferred: Option<SourceKind>) -> Vec<&Arc<dyn WeatherSource>> {
        let mut ordered: Vec<_> = self.sources.iter().collect();
        if let Some(kind) = preferred {
            // Stable sort keeps the configured order for everything else.
            ordered.sort_by_key(|s| s.kind() != kind);
        }
        ordered
    }

    /// Forecast from the first source that succeeds.
    pub async fn forecast(
        &self,
        point: GeoPoint,
        preferred: Option<SourceKind>,
    ) -> Result<ForecastSeries, UpstreamError> {
        let mut failures = Vec::new();
        for source in self.ordered(preferred) {
            let kind = source.kind();
            match source.forecast(point).await {
                Ok(series) => {
                    if !failures.is_empty() {
                        tracing::info!(source = %kind, failed = failures.len(), "Forecast served by fallback source");
                    }
                    return Ok(series);
                }
                Err(e) => {
                    tracing::warn!(source = %kind, error = %e, "Weather source failed");
                    failures.push(format!("{kind}: {e}"));
                }
            }
        }
        Err(UpstreamError::AllSourcesFailed(failures))
    }
}
