//! WMO weather interpretation codes (WW) as used by Open-Meteo.
//!
//! See <https://open-meteo.com/en/docs#weathervariables>.

use serde::Serialize;

/// Code used when a provider reports a condition we cannot map.
pub const UNKNOWN_CODE: i32 = -1;

/// Display text and Bootstrap icon class for a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub text: &'static str,
    pub icon: &'static str,
}

const fn d(text: &'static str, icon: &'static str) -> Decoded {
    Decoded { text, icon }
}

/// Decode a WMO code. Clear and partly-cloudy skies have night variants.
pub fn decode_wmo(code: i32, is_day: bool) -> Decoded {
    match (code, is_day) {
        (0, true) => d("Despejado", "bi-sun-fill"),
        (0, false) => d("Despejado", "bi-moon-stars-fill"),
        (1, true) => d("Mayormente despejado", "bi-cloud-sun-fill"),
        (1, false) => d("Mayormente despejado", "bi-cloud-moon-fill"),
        (2, true) => d("Parcialmente nublado", "bi-cloud-sun-fill"),
        (2, false) => d("Parcialmente nublado", "bi-cloud-moon-fill"),
        (3, _) => d("Nublado", "bi-clouds-fill"),
        (45, _) => d("Niebla", "bi-cloud-fog2-fill"),
        (48, _) => d("Niebla con escarcha", "bi-cloud-fog2-fill"),
        (51, _) => d("Llovizna ligera", "bi-cloud-drizzle-fill"),
        (53, _) => d("Llovizna", "bi-cloud-drizzle-fill"),
        (55, _) => d("Llovizna intensa", "bi-cloud-drizzle-fill"),
        (56 | 57, _) => d("Llovizna helada", "bi-cloud-sleet-fill"),
        (61, _) => d("Lluvia ligera", "bi-cloud-rain-fill"),
        (63, _) => d("Lluvia", "bi-cloud-rain-fill"),
        (65, _) => d("Lluvia intensa", "bi-cloud-rain-heavy-fill"),
        (66 | 67, _) => d("Lluvia helada", "bi-cloud-sleet-fill"),
        (71, _) => d("Nevada ligera", "bi-cloud-snow-fill"),
        (73, _) => d("Nevada", "bi-cloud-snow-fill"),
        (75, _) => d("Nevada intensa", "bi-cloud-snow-fill"),
        (77, _) => d("Granos de nieve", "bi-snow"),
        (80, _) => d("Chubascos ligeros", "bi-cloud-rain-fill"),
        (81, _) => d("Chubascos", "bi-cloud-rain-fill"),
        (82, _) => d("Chubascos fuertes", "bi-cloud-rain-heavy-fill"),
        (85 | 86, _) => d("Chubascos de nieve", "bi-cloud-snow-fill"),
        (95, _) => d("Tormenta", "bi-cloud-lightning-rain-fill"),
        (96 | 99, _) => d("Tormenta con granizo", "bi-cloud-hail-fill"),
        _ => d("Desconocido", "bi-cloud-fill"),
    }
}

/// Whether the code denotes a thunderstorm.
pub fn is_storm(code: i32) -> bool {
    (95..=99).contains(&code)
}
