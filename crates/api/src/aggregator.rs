//! Cache-or-fetch assembly of the weather report.

use aeris_core::forecast::WeatherReport;
use aeris_core::location::ResolvedLocation;
use aeris_core::normalize::{build_report, ReportContext};
use aeris_core::source::SourceKind;
use aeris_core::types::Timestamp;
use aeris_db::repositories::WeatherCacheRepo;
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Serve the report for `location` from the cache when fresh, otherwise
/// fetch, normalize and cache it.
///
/// A cached report from a different provider than `preferred` is treated
/// as stale, unless `preferred` cannot cover the point and would only fall
/// through to the others anyway.
pub async fn weather_report(
    state: &AppState,
    location: &ResolvedLocation,
    preferred: Option<SourceKind>,
) -> AppResult<WeatherReport> {
    let now = Utc::now();
    let preferred = preferred.filter(|kind| state.sources.serves(*kind, location.point));

    if let Some(mut report) = cached_report(state, location, preferred, now).await? {
        if let Some(name) = location.name_override() {
            report.location.name = name.to_string();
        }
        tracing::debug!(location_id = %location.id, "Weather served from cache");
        return Ok(report);
    }

    let point = location.point;
    let (series, air, pollen) = tokio::join!(
        state.sources.forecast(point, preferred),
        state.air.air_quality(point),
        state.air.pollen(point),
    );
    let series = series?;
    let air = air.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Air quality unavailable");
        Default::default()
    });
    let pollen = pollen.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Pollen unavailable");
        Default::default()
    });

    let report = build_report(
        &series,
        ReportContext {
            name: location.display_name(),
            region: &location.region,
            point,
            air,
            pollen,
        },
    );

    let data = serde_json::to_string(&report)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize report: {e}")))?;
    WeatherCacheRepo::upsert(&state.pool, &location.id, &data, report.source.as_str(), now).await?;

    tracing::info!(
        location_id = %location.id,
        source = %report.source,
        "Weather fetched and cached"
    );
    Ok(report)
}

async fn cached_report(
    state: &AppState,
    location: &ResolvedLocation,
    preferred: Option<SourceKind>,
    now: Timestamp,
) -> AppResult<Option<WeatherReport>> {
    let ttl = state.config.cache_ttl();
    let Some(entry) = WeatherCacheRepo::find_fresh(&state.pool, &location.id, ttl, now).await? else {
        return Ok(None);
    };

    if preferred.is_some_and(|kind| kind.as_str() != entry.source) {
        return Ok(None);
    }

    match entry.report() {
        Ok(report) => Ok(Some(report)),
        Err(e) => {
            tracing::warn!(location_id = %location.id, error = %e, "Discarding unreadable cache row");
            Ok(None)
        }
    }
}
