//! Weather cache rows.

use aeris_core::forecast::WeatherReport;
use aeris_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `weather_cache` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeatherCacheEntry {
    pub location_id: String,
    /// Serialized [`WeatherReport`].
    pub data: String,
    /// Provider that produced the report.
    pub source: String,
    pub updated_at: Timestamp,
}

impl WeatherCacheEntry {
    pub fn report(&self) -> Result<WeatherReport, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}
