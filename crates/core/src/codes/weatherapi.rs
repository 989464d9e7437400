//! WeatherAPI.com condition codes.
//!
//! See <https://www.weatherapi.com/docs/weather_conditions.json>.

/// Map a WeatherAPI condition code to a WMO code.
pub fn weatherapi_to_wmo(code: i32) -> Option<i32> {
    let wmo = match code {
        1000 => 0,
        1003 => 2,
        1006 | 1009 => 3,
        1030 | 1135 => 45,
        1147 => 48,
        1063 | 1240 => 80,
        1243 => 81,
        1246 => 82,
        1066 | 1255 => 85,
        1258 => 86,
        1069 | 1198 | 1204 | 1249 => 66,
        1201 | 1207 | 1252 => 67,
        1072 | 1168 => 56,
        1171 => 57,
        1150 => 51,
        1153 => 53,
        1180 | 1183 => 61,
        1186 | 1189 => 63,
        1192 | 1195 => 65,
        1210 | 1213 => 71,
        1114 | 1216 | 1219 => 73,
        1117 | 1222 | 1225 => 75,
        1237 | 1261 | 1264 => 77,
        1087 | 1273 | 1276 | 1279 => 95,
        1282 => 99,
        _ => return None,
    };
    Some(wmo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sunny_and_overcast() {
        assert_eq!(weatherapi_to_wmo(1000), Some(0));
        assert_eq!(weatherapi_to_wmo(1009), Some(3));
    }

    #[test]
    fn thunder_codes() {
        assert_eq!(weatherapi_to_wmo(1087), Some(95));
        assert_eq!(weatherapi_to_wmo(1282), Some(99));
    }

    #[test]
    fn unknown_code() {
        assert_eq!(weatherapi_to_wmo(4242), None);
    }
}
