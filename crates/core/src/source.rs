//! Identifiers for the upstream weather providers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A third-party forecast provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "open-meteo")]
    OpenMeteo,
    #[serde(rename = "aemet")]
    Aemet,
    #[serde(rename = "weatherapi")]
    WeatherApi,
}

impl SourceKind {
    /// Every known provider, in the default fallback order.
    pub const ALL: [SourceKind; 3] = [SourceKind::OpenMeteo, SourceKind::Aemet, SourceKind::WeatherApi];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::OpenMeteo => "open-meteo",
            SourceKind::Aemet => "aemet",
            SourceKind::WeatherApi => "weatherapi",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open-meteo" | "openmeteo" => Ok(SourceKind::OpenMeteo),
            "aemet" => Ok(SourceKind::Aemet),
            "weatherapi" | "weather-api" => Ok(SourceKind::WeatherApi),
            other => Err(CoreError::Validation(format!(
                "Unknown weather source '{other}'"
            ))),
        }
    }
}

/// Parse a comma-separated provider list, keeping the first occurrence of
/// each provider.
///
/// ```
/// use aeris_core::source::{parse_source_list, SourceKind};
///
/// let order = parse_source_list("aemet, open-meteo,aemet").unwrap();
/// assert_eq!(order, vec![SourceKind::Aemet, SourceKind::OpenMeteo]);
/// ```
pub fn parse_source_list(raw: &str) -> Result<Vec<SourceKind>, CoreError> {
    let mut order = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let kind: SourceKind = part.parse()?;
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    if order.is_empty() {
        return Err(CoreError::Validation(
            "At least one weather source must be configured".into(),
        ));
    }
    Ok(order)
}
