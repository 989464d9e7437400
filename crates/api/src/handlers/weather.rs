//! Handler for the canonical weather report.

use aeris_core::forecast::WeatherReport;
use aeris_core::source::SourceKind;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::aggregator::weather_report;
use crate::error::{AppError, AppResult};
use crate::resolver::{resolve, NameHints};
use crate::state::AppState;

/// Optional display hints and provider override.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherParams {
    pub name: Option<String>,
    pub region: Option<String>,
    pub source: Option<String>,
}

/// GET /api/weather/{id}
///
/// `id` is a `lat,lon` pair, a municipality code or a place name. Returns
/// the bare report rather than a `{ "data": ... }` envelope.
pub async fn get_weather(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<WeatherParams>,
) -> AppResult<Json<WeatherReport>> {
    let preferred = params
        .source
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<SourceKind>)
        .transpose()?;
    if let Some(kind) = preferred {
        if !state.sources.kinds().contains(&kind) {
            return Err(AppError::BadRequest(format!(
                "Weather source '{kind}' is not enabled"
            )));
        }
    }

    let hints = NameHints {
        name: params.name.as_deref(),
        region: params.region.as_deref(),
    };
    let location = resolve(&state, &id, hints).await?;
    let report = weather_report(&state, &location, preferred).await?;

    Ok(Json(report))
}
