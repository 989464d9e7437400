//! Turn a raw location id into a [`ResolvedLocation`].
//!
//! Coordinates are named through a chain of reverse geocoders, ending with
//! the static city list and finally the generic "Tu ubicación" label. Names
//! are forward geocoded. Municipality codes come from the static list.

use aeris_core::error::CoreError;
use aeris_core::geo::{city_by_code, nearest_city_within};
use aeris_core::location::{
    canonical_id, current_location_label, is_placeholder_name, join_region, LocationQuery,
    ResolvedLocation,
};
use aeris_core::types::GeoPoint;

use crate::error::AppResult;
use crate::state::AppState;

/// Static cities further away than this are not used to name a position.
pub const NEAREST_CITY_MAX_KM: f64 = 25.0;

/// Display hints sent by the front-end alongside the id.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameHints<'a> {
    pub name: Option<&'a str>,
    pub region: Option<&'a str>,
}

impl<'a> NameHints<'a> {
    /// The forced name, unless it is one of the placeholders.
    fn name(&self) -> Option<&'a str> {
        self.name.map(str::trim).filter(|n| !is_placeholder_name(n))
    }

    fn region_or(&self, fallback: String) -> String {
        match self.region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(region) => region.to_string(),
            None => fallback,
        }
    }
}

pub async fn resolve(state: &AppState, raw_id: &str, hints: NameHints<'_>) -> AppResult<ResolvedLocation> {
    match LocationQuery::parse(raw_id)? {
        LocationQuery::Coordinates(point) => Ok(resolve_point(state, point, hints).await),
        LocationQuery::Municipality(code) => {
            let city = city_by_code(&code).ok_or(CoreError::NotFound {
                entity: "Municipality",
                id: code.clone(),
            })?;
            Ok(ResolvedLocation {
                id: code,
                name: Some(hints.name().unwrap_or(city.name).to_string()),
                region: hints.region_or(city.region.to_string()),
                point: city.point(),
            })
        }
        LocationQuery::Name(name) => {
            let place = state.geocoder.search(&name).await?.ok_or(CoreError::NotFound {
                entity: "Location",
                id: name.clone(),
            })?;
            let point = place.point();
            Ok(ResolvedLocation {
                id: canonical_id(point),
                name: Some(hints.name().unwrap_or(&place.name).to_string()),
                region: hints.region_or(join_region([
                    place.admin1.as_deref(),
                    place.country.as_deref(),
                ])),
                point,
            })
        }
    }
}

async fn resolve_point(state: &AppState, point: GeoPoint, hints: NameHints<'_>) -> ResolvedLocation {
    let id = canonical_id(point);

    if let Some(name) = hints.name() {
        return ResolvedLocation {
            id,
            name: Some(name.to_string()),
            region: hints.region_or(String::new()),
            point,
        };
    }

    // A region found while naming the point replaces the forced one.
    let (name, region) = name_point(state, point).await;
    let region = if region.is_empty() { hints.region_or(region) } else { region };
    ResolvedLocation {
        id,
        name: Some(name),
        region,
        point,
    }
}

/// Reverse geocode a position into a "Tu ubicación (...)" label and a region.
async fn name_point(state: &AppState, point: GeoPoint) -> (String, String) {
    match state.geocoder.reverse(point).await {
        Ok(Some(place)) => {
            return (
                current_location_label(Some(&place.name)),
                join_region([place.admin1.as_deref(), place.country.as_deref()]),
            );
        }
        Ok(None) => tracing::debug!(lat = point.lat, lon = point.lon, "Open-Meteo reverse geocoding found nothing"),
        Err(e) => tracing::warn!(error = %e, "Open-Meteo reverse geocoding failed"),
    }

    match state.geocoder.reverse_nominatim(point).await {
        Ok(Some(place)) if place.place.is_some() => {
            return (
                current_location_label(place.place.as_deref()),
                join_region([place.state.as_deref(), place.country.as_deref()]),
            );
        }
        Ok(_) => tracing::debug!(lat = point.lat, lon = point.lon, "Nominatim found no place"),
        Err(e) => tracing::warn!(error = %e, "Nominatim reverse geocoding failed"),
    }

    if let Some((city, distance_km)) = nearest_city_within(point, NEAREST_CITY_MAX_KM) {
        tracing::debug!(city = city.name, distance_km, "Named position after nearest static city");
        return (current_location_label(Some(city.name)), city.region.to_string());
    }

    (current_location_label(None), String::new())
}
