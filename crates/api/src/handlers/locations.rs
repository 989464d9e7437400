use aeris_core::error::CoreError;
use aeris_core::geo::nearest_city;
use aeris_core::types::GeoPoint;
use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;

#[derive(Debug, Deserialize)]
pub struct NearestParams {
    pub lat: f64,
    pub lon: f64,
}

/// A static city and its distance from the queried point.
#[derive(Debug, Serialize)]
pub struct NearestCity {
    pub code: &'static str,
    pub name: &'static str,
    pub region: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub timezone: &'static str,
    pub distance_km: f64,
}

/// GET /api/locations/nearest?lat&lon
pub async fn nearest(Query(params): Query<NearestParams>) -> AppResult<Json<DataResponse<NearestCity>>> {
    let point = GeoPoint::new(params.lat, params.lon);
    if !point.is_valid() {
        return Err(CoreError::Validation(format!(
            "Coordinates out of range: {},{}",
            params.lat, params.lon
        ))
        .into());
    }

    let (city, distance_km) =
        nearest_city(point).ok_or_else(|| CoreError::Internal("City list is empty".into()))?;

    Ok(Json(DataResponse {
        data: NearestCity {
            code: city.code,
            name: city.name,
            region: city.region,
            lat: city.lat,
            lon: city.lon,
            timezone: city.timezone.name(),
            distance_km: (distance_km * 10.0).round() / 10.0,
        },
    }))
}
