//! The forecast provider abstraction.

use aeris_core::forecast::ForecastSeries;
use aeris_core::source::SourceKind;
use aeris_core::types::GeoPoint;
use async_trait::async_trait;

use crate::error::UpstreamError;

/// A third-party forecast provider.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Whether the provider has data for `point` at all.
    fn covers(&self, _point: GeoPoint) -> bool {
        true
    }

    /// Fetch the forecast for a point, mapped into common units and WMO
    /// condition codes.
    async fn forecast(&self, point: GeoPoint) -> Result<ForecastSeries, UpstreamError>;
}
