//! Location identifiers and the naming heuristics applied to them.
//!
//! A location id arriving on `/api/weather/{id}` is either a coordinate pair
//! (`"40.41,-3.70"`), a five-digit INE municipality code (`"28079"`) or a
//! free-text place name (`"Madrid"`).

use crate::error::CoreError;
use crate::types::GeoPoint;

/// Label used when the user's own position could not be named.
pub const CURRENT_LOCATION: &str = "Tu ubicación";

/// Names the front-end sends when it has no real place name. Receiving one
/// of these forces reverse geocoding.
const PLACEHOLDER_NAMES: [&str; 8] = [
    "undefined",
    "null",
    "Ubicación",
    "Tu ubicación",
    "Ubicación detectada",
    "Ubicación Detectada",
    "",
    "My Location",
];

/// A parsed location id.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(GeoPoint),
    Municipality(String),
    Name(String),
}

impl LocationQuery {
    /// Classify a raw location id.
    ///
    /// Text containing a comma is only treated as coordinates when both
    /// halves are valid numbers, so `"Santiago, Chile"` stays a name.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::Validation("Location id must not be empty".into()));
        }

        if let Some((lat, lon)) = raw.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                let point = GeoPoint::new(lat, lon);
                if !point.is_valid() {
                    return Err(CoreError::Validation(format!(
                        "Coordinates out of range: {raw}"
                    )));
                }
                return Ok(LocationQuery::Coordinates(point));
            }
        }

        if raw.len() == 5 && raw.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(LocationQuery::Municipality(raw.to_string()));
        }

        Ok(LocationQuery::Name(raw.to_string()))
    }
}

/// Cache key for a coordinate pair. Four decimals (~11 m) keeps one cache
/// row per place regardless of how many digits the client sends.
pub fn canonical_id(point: GeoPoint) -> String {
    format!("{:.4},{:.4}", point.lat, point.lon)
}

pub fn is_placeholder_name(name: &str) -> bool {
    PLACEHOLDER_NAMES.contains(&name)
}

/// `"Tu ubicación (Place)"`, or plain `"Tu ubicación"` without a place.
pub fn current_location_label(place: Option<&str>) -> String {
    match place.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => format!("{CURRENT_LOCATION} ({p})"),
        None => CURRENT_LOCATION.to_string(),
    }
}

/// Join the non-empty parts with `", "`.
pub fn join_region<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A location after geocoding, ready to be forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Cache key: canonical coordinates or a municipality code.
    pub id: String,
    /// Display name, if one is known.
    pub name: Option<String>,
    pub region: String,
    pub point: GeoPoint,
}

impl ResolvedLocation {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(CURRENT_LOCATION)
    }

    /// The name that should replace a cached document's name, if any.
    ///
    /// The generic [`CURRENT_LOCATION`] label never overrides a cached name.
    pub fn name_override(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| *n != CURRENT_LOCATION)
    }
}
