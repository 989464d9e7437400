//! AEMET `estadoCielo` sky-state codes.
//!
//! Codes are two digits with an optional `n` suffix for night, e.g. `"12"`
//! (poco nuboso) or `"11n"` (despejado, de noche).

/// Map an AEMET sky code to `(wmo_code, is_day)`. Returns `None` for empty
/// or unrecognised codes.
pub fn aemet_sky_to_wmo(code: &str) -> Option<(i32, bool)> {
    let code = code.trim();
    let (base, is_day) = match code.strip_suffix('n') {
        Some(base) => (base, false),
        None => (code, true),
    };

    let wmo = match base.parse::<u8>().ok()? {
        11 => 0,
        12 | 17 => 1,
        13 => 2,
        14..=16 => 3,
        // Intervalos nubosos / nuboso / muy nuboso / cubierto con lluvia
        23 => 80,
        24 => 61,
        25 | 26 => 63,
        // ... con nieve
        33 => 85,
        34 => 71,
        35 | 36 => 73,
        // ... con lluvia escasa
        43 => 80,
        44..=46 => 61,
        // ... con tormenta, con o sin lluvia escasa
        51..=54 | 61..=64 => 95,
        // ... con nieve escasa
        71..=74 => 71,
        // Niebla, bruma, calima
        81..=83 => 45,
        _ => return None,
    };

    Some((wmo, is_day))
}
