//! Great-circle distance and the static city list used for
//! nearest-neighbour lookups and AEMET municipality codes.

use chrono_tz::Tz;

use crate::types::GeoPoint;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A city from the static list, keyed by its INE municipality code.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub code: &'static str,
    pub name: &'static str,
    pub region: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub timezone: Tz,
}

impl City {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

macro_rules! city {
    ($code:literal, $name:literal, $region:literal, $lat:literal, $lon:literal) => {
        city!($code, $name, $region, $lat, $lon, chrono_tz::Europe::Madrid)
    };
    ($code:literal, $name:literal, $region:literal, $lat:literal, $lon:literal, $tz:expr) => {
        City {
            code: $code,
            name: $name,
            region: $region,
            lat: $lat,
            lon: $lon,
            timezone: $tz,
        }
    };
}

/// Provincial capitals and major cities.
pub static CITIES: &[City] = &[
    city!("28079", "Madrid", "Comunidad de Madrid", 40.4168, -3.7038),
    city!("08019", "Barcelona", "Cataluña", 41.3874, 2.1686),
    city!("46250", "Valencia", "Comunitat Valenciana", 39.4699, -0.3763),
    city!("41091", "Sevilla", "Andalucía", 37.3891, -5.9845),
    city!("50297", "Zaragoza", "Aragón", 41.6488, -0.8891),
    city!("29067", "Málaga", "Andalucía", 36.7213, -4.4214),
    city!("30030", "Murcia", "Región de Murcia", 37.9922, -1.1307),
    city!("07040", "Palma", "Illes Balears", 39.5696, 2.6502),
    city!("35016", "Las Palmas de Gran Canaria", "Canarias", 28.1235, -15.4363, chrono_tz::Atlantic::Canary),
    city!("38038", "Santa Cruz de Tenerife", "Canarias", 28.4636, -16.2518, chrono_tz::Atlantic::Canary),
    city!("48020", "Bilbao", "País Vasco", 43.2630, -2.9350),
    city!("20069", "Donostia / San Sebastián", "País Vasco", 43.3183, -1.9812),
    city!("01059", "Vitoria-Gasteiz", "País Vasco", 42.8467, -2.6716),
    city!("03014", "Alicante", "Comunitat Valenciana", 38.3452, -0.4810),
    city!("12040", "Castelló de la Plana", "Comunitat Valenciana", 39.9864, -0.0513),
    city!("14021", "Córdoba", "Andalucía", 37.8882, -4.7794),
    city!("18087", "Granada", "Andalucía", 37.1773, -3.5986),
    city!("11012", "Cádiz", "Andalucía", 36.5271, -6.2886),
    city!("04013", "Almería", "Andalucía", 36.8340, -2.4637),
    city!("21041", "Huelva", "Andalucía", 37.2614, -6.9447),
    city!("23050", "Jaén", "Andalucía", 37.7796, -3.7849),
    city!("47186", "Valladolid", "Castilla y León", 41.6523, -4.7245),
    city!("37274", "Salamanca", "Castilla y León", 40.9701, -5.6635),
    city!("09059", "Burgos", "Castilla y León", 42.3439, -3.6969),
    city!("24089", "León", "Castilla y León", 42.5987, -5.5671),
    city!("42173", "Soria", "Castilla y León", 41.7640, -2.4688),
    city!("40194", "Segovia", "Castilla y León", 40.9429, -4.1088),
    city!("05019", "Ávila", "Castilla y León", 40.6565, -4.6818),
    city!("49275", "Zamora", "Castilla y León", 41.5033, -5.7446),
    city!("34120", "Palencia", "Castilla y León", 42.0095, -4.5288),
    city!("45168", "Toledo", "Castilla-La Mancha", 39.8628, -4.0273),
    city!("02003", "Albacete", "Castilla-La Mancha", 38.9943, -1.8585),
    city!("16078", "Cuenca", "Castilla-La Mancha", 40.0704, -2.1374),
    city!("19130", "Guadalajara", "Castilla-La Mancha", 40.6329, -3.1669),
    city!("13034", "Ciudad Real", "Castilla-La Mancha", 38.9848, -3.9274),
    city!("36057", "Vigo", "Galicia", 42.2406, -8.7207),
    city!("15030", "A Coruña", "Galicia", 43.3623, -8.4115),
    city!("15078", "Santiago de Compostela", "Galicia", 42.8782, -8.5448),
    city!("27028", "Lugo", "Galicia", 43.0097, -7.5568),
    city!("32054", "Ourense", "Galicia", 42.3358, -7.8639),
    city!("36038", "Pontevedra", "Galicia", 42.4310, -8.6446),
    city!("33024", "Gijón", "Principado de Asturias", 43.5322, -5.6611),
    city!("33044", "Oviedo", "Principado de Asturias", 43.3614, -5.8593),
    city!("39075", "Santander", "Cantabria", 43.4623, -3.8099),
    city!("31201", "Pamplona", "Comunidad Foral de Navarra", 42.8125, -1.6458),
    city!("26089", "Logroño", "La Rioja", 42.4627, -2.4450),
    city!("43148", "Tarragona", "Cataluña", 41.1189, 1.2445),
    city!("25120", "Lleida", "Cataluña", 41.6176, 0.6200),
    city!("17079", "Girona", "Cataluña", 41.9794, 2.8214),
    city!("22125", "Huesca", "Aragón", 42.1401, -0.4089),
    city!("44216", "Teruel", "Aragón", 40.3456, -1.1065),
    city!("06015", "Badajoz", "Extremadura", 38.8794, -6.9707),
    city!("10037", "Cáceres", "Extremadura", 39.4753, -6.3724),
    city!("51001", "Ceuta", "Ceuta", 35.8894, -5.3213),
    city!("52001", "Melilla", "Melilla", 35.2923, -2.9381),
];

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// The closest city in [`CITIES`] and its distance in kilometres.
pub fn nearest_city(point: GeoPoint) -> Option<(&'static City, f64)> {
    CITIES
        .iter()
        .map(|c| (c, haversine_km(point, c.point())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Like [`nearest_city`], but only when the city is within `max_km`.
pub fn nearest_city_within(point: GeoPoint, max_km: f64) -> Option<(&'static City, f64)> {
    nearest_city(point).filter(|(_, d)| *d <= max_km)
}

pub fn city_by_code(code: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(40.4168, -3.7038);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn madrid_to_barcelona() {
        let madrid = city_by_code("28079").unwrap().point();
        let barcelona = city_by_code("08019").unwrap().point();
        let d = haversine_km(madrid, barcelona);
        assert!((500.0..510.0).contains(&d), "got {d}");
        assert!((haversine_km(barcelona, madrid) - d).abs() < 1e-9);
    }

    #[test]
    fn nearest_city_to_getafe_is_madrid() {
        let (city, d) = nearest_city(GeoPoint::new(40.3057, -3.7329)).unwrap();
        assert_eq!(city.name, "Madrid");
        assert!(d < 15.0);
    }

    #[test]
    fn nearest_within_rejects_far_points() {
        // Paris
        assert!(nearest_city_within(GeoPoint::new(48.8566, 2.3522), 40.0).is_none());
    }

    #[test]
    fn canary_cities_use_canary_time() {
        let city = city_by_code("35016").unwrap();
        assert_eq!(city.timezone, chrono_tz::Atlantic::Canary);
    }

    #[test]
    fn codes_are_unique_five_digit_strings() {
        for (i, c) in CITIES.iter().enumerate() {
            assert_eq!(c.code.len(), 5, "{}", c.name);
            assert!(c.code.bytes().all(|b| b.is_ascii_digit()));
            assert!(CITIES[i + 1..].iter().all(|o| o.code != c.code), "{}", c.code);
        }
    }
}
