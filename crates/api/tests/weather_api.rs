//! Integration tests for `GET /api/weather/{id}` with upstream services
//! mocked by wiremock.

mod common;

use aeris_core::source::SourceKind;
use aeris_db::repositories::WeatherCacheRepo;
use axum::http::StatusCode;
use common::{body_json, build_test_app, get, test_config, test_pool};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "timezone": "Europe/Madrid",
        "current": {
            "time": "2025-03-01T10:15", "temperature_2m": 14.2, "relative_humidity_2m": 61,
            "apparent_temperature": 12.9, "is_day": 1, "precipitation": 0.0,
            "weather_code": 3, "wind_speed_10m": 11.3, "cloud_cover": 90
        },
        "hourly": {
            "time": ["2025-03-01T10:00", "2025-03-01T11:00"],
            "temperature_2m": [14.0, 15.1],
            "precipitation_probability": [20, 55],
            "precipitation": [0.0, 0.6],
            "weather_code": [3, 61],
            "is_day": [1, 1]
        },
        "daily": {
            "time": ["2025-03-01"],
            "weather_code": [61],
            "temperature_2m_max": [16.1],
            "temperature_2m_min": [6.4],
            "sunrise": ["2025-03-01T07:45"],
            "sunset": ["2025-03-01T18:50"],
            "uv_index_max": [3.4],
            "precipitation_probability_max": [60]
        },
        "minutely_15": {
            "time": ["2025-03-01T10:15", "2025-03-01T10:30"],
            "precipitation": [0.0, 0.2]
        }
    })
}

fn air_body() -> serde_json::Value {
    serde_json::json!({
        "current": {
            "time": "2025-03-01T10:00",
            "us_aqi": 42, "pm2_5": 8.1, "pm10": 15.0,
            "grass_pollen": 12.0, "olive_pollen": 3.5, "ragweed_pollen": null
        }
    })
}

/// Mount the forecast and air-quality mocks; the forecast must be hit
/// exactly `forecast_calls` times.
async fn mount_weather(server: &MockServer, forecast_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(forecast_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(200).set_body_json(air_body()))
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, name: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn weatherapi_body() -> serde_json::Value {
    serde_json::json!({
        "location": {"tz_id": "Europe/Madrid", "localtime": "2025-03-01 10:15"},
        "current": {
            "temp_c": 18.0, "feelslike_c": 17.0, "humidity": 55, "wind_kph": 8.0,
            "cloud": 10, "is_day": 1, "condition": {"code": 1000}
        },
        "forecast": {"forecastday": [{
            "date": "2025-03-01",
            "day": {"maxtemp_c": 20.0, "mintemp_c": 8.0, "daily_chance_of_rain": 0,
                    "uv": 5.0, "condition": {"code": 1000}},
            "astro": {"sunrise": "07:45 AM", "sunset": "06:50 PM"},
            "hour": [{"time": "2025-03-01 10:00", "temp_c": 18.0, "chance_of_rain": 0,
                      "precip_mm": 0.0, "is_day": 1, "condition": {"code": 1000}}]
        }]},
        "alerts": {"alert": []}
    })
}

fn sevilla() -> serde_json::Value {
    serde_json::json!({
        "results": [{
            "name": "Sevilla", "latitude": 37.38283, "longitude": -5.97317,
            "admin1": "Andalucía", "country": "España"
        }]
    })
}

// ---------------------------------------------------------------------------
// Test: A place name is geocoded, forecast, normalized and cached
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_weather_by_name() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;
    mount_search(&server, "Sevilla", sevilla()).await;

    let pool = test_pool().await;
    let app = build_test_app(pool.clone(), test_config(&server.uri()), None);

    let response = get(&app, "/api/weather/Sevilla").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["location"]["name"], "Sevilla");
    assert_eq!(json["location"]["region"], "Andalucía, España");
    assert_eq!(json["location"]["timezone"], "Europe/Madrid");
    assert_eq!(json["source"], "open-meteo");
    assert_eq!(json["current"]["temp"], 14);
    assert_eq!(json["current"]["desc"], "Nublado");
    assert_eq!(json["current"]["aqi"], 42.0);
    assert_eq!(json["current"]["uv"], 3.4);
    assert_eq!(json["pollen"]["grass"], 12.0);
    assert_eq!(json["pollen"]["ragweed"], 0.0);
    assert_eq!(json["hourly"].as_array().unwrap().len(), 2);
    assert_eq!(json["daily"][0]["fecha"], "2025-03-01");

    let cached = WeatherCacheRepo::find(&pool, "37.3828,-5.9732").await.unwrap().unwrap();
    assert_eq!(cached.source, "open-meteo");
}

// ---------------------------------------------------------------------------
// Test: A second request inside the TTL is served from the cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_weather_is_cached() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;
    mount_search(&server, "Sevilla", sevilla()).await;

    let pool = test_pool().await;
    let app = build_test_app(pool.clone(), test_config(&server.uri()), None);

    let first = body_json(get(&app, "/api/weather/Sevilla").await).await;
    let second = body_json(get(&app, "/api/weather/Sevilla").await).await;

    assert_eq!(first, second);
    assert_eq!(WeatherCacheRepo::count(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Test: A cache hit takes the name the client asked for
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cache_hit_uses_forced_name() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let first = body_json(get(&app, "/api/weather/40.4168,-3.7038?name=Casa&region=Madrid").await).await;
    assert_eq!(first["location"]["name"], "Casa");
    assert_eq!(first["location"]["region"], "Madrid");

    let second = body_json(get(&app, "/api/weather/40.41680,-3.70380?name=Oficina").await).await;
    assert_eq!(second["location"]["name"], "Oficina");
}

// ---------------------------------------------------------------------------
// Test: A name that cannot be geocoded is a 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unknown_name_is_not_found() {
    let server = MockServer::start().await;
    mount_weather(&server, 0).await;
    mount_search(&server, "Xyzzy", serde_json::json!({"generationtime_ms": 0.2})).await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let response = get(&app, "/api/weather/Xyzzy").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: Placeholder names trigger Open-Meteo reverse geocoding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_coordinates_reverse_geocoded() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"name": "Getafe", "latitude": 40.30, "longitude": -3.73,
                         "admin1": "Madrid", "country": "España"}]
        })))
        .mount(&server)
        .await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let json = body_json(get(&app, "/api/weather/40.3,-3.73?name=undefined").await).await;
    assert_eq!(json["location"]["name"], "Tu ubicación (Getafe)");
    assert_eq!(json["location"]["region"], "Madrid, España");
}

// ---------------------------------------------------------------------------
// Test: A reverse geocoded region replaces the forced one
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_reverse_geocoded_region_wins() {
    let server = MockServer::start().await;
    mount_weather(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .and(query_param("latitude", "40.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"name": "Getafe", "latitude": 40.30, "longitude": -3.73,
                         "admin1": "Madrid", "country": "España"}]
        })))
        .mount(&server)
        .await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let json = body_json(get(&app, "/api/weather/40.3,-3.73?name=undefined&region=Foo").await).await;
    assert_eq!(json["location"]["name"], "Tu ubicación (Getafe)");
    assert_eq!(json["location"]["region"], "Madrid, España");

    // Nothing to name the point with: the forced region stays.
    let json = body_json(get(&app, "/api/weather/0.0,0.0?region=Foo").await).await;
    assert_eq!(json["location"]["name"], "Tu ubicación");
    assert_eq!(json["location"]["region"], "Foo");
}

// ---------------------------------------------------------------------------
// Test: Nominatim is used when Open-Meteo reverse geocoding fails
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_coordinates_fall_back_to_nominatim() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": {"town": "Alcorcón", "state": "Comunidad de Madrid", "country": "España"}
        })))
        .mount(&server)
        .await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let json = body_json(get(&app, "/api/weather/40.35,-3.82").await).await;
    assert_eq!(json["location"]["name"], "Tu ubicación (Alcorcón)");
    assert_eq!(json["location"]["region"], "Comunidad de Madrid, España");
}

// ---------------------------------------------------------------------------
// Test: The static city list names positions when geocoders fail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_coordinates_fall_back_to_static_city() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let json = body_json(get(&app, "/api/weather/40.42,-3.70").await).await;
    assert_eq!(json["location"]["name"], "Tu ubicación (Madrid)");
    assert_eq!(json["location"]["region"], "Comunidad de Madrid");
}

// ---------------------------------------------------------------------------
// Test: Far from every known city the generic label is used
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_coordinates_without_any_name() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let json = body_json(get(&app, "/api/weather/0.0,0.0").await).await;
    assert_eq!(json["location"]["name"], "Tu ubicación");
}

// ---------------------------------------------------------------------------
// Test: Municipality codes come from the static city list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_weather_by_municipality_code() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;

    let pool = test_pool().await;
    let app = build_test_app(pool.clone(), test_config(&server.uri()), None);

    let json = body_json(get(&app, "/api/weather/28079").await).await;
    assert_eq!(json["location"]["name"], "Madrid");
    assert!(WeatherCacheRepo::find(&pool, "28079").await.unwrap().is_some());

    let response = get(&app, "/api/weather/99999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: Missing air quality does not fail the report
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_air_quality_failure_defaults_to_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let response = get(&app, "/api/weather/40.4168,-3.7038?name=Casa").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["current"]["aqi"], 0.0);
    assert_eq!(json["pollen"]["grass"], 0.0);
}

// ---------------------------------------------------------------------------
// Test: Every forecast source failing is a 502
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_all_sources_failing_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let pool = test_pool().await;
    let app = build_test_app(pool.clone(), test_config(&server.uri()), None);

    let response = get(&app, "/api/weather/40.4168,-3.7038?name=Casa").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");
    assert_eq!(WeatherCacheRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Test: Unknown source names and bad coordinates are 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_invalid_requests() {
    let server = MockServer::start().await;
    mount_weather(&server, 0).await;

    let app = build_test_app(test_pool().await, test_config(&server.uri()), None);

    let response = get(&app, "/api/weather/Madrid?source=darksky").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = get(&app, "/api/weather/95.0,0.0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: Asking for a source that is not enabled is a 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_disabled_source_is_rejected() {
    let server = MockServer::start().await;
    mount_weather(&server, 0).await;

    let pool = test_pool().await;
    let app = build_test_app(pool.clone(), test_config(&server.uri()), None);

    let response = get(&app, "/api/weather/40.4168,-3.7038?name=Casa&source=aemet").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("aemet"));
    assert_eq!(WeatherCacheRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Test: A preferred source that cannot cover the point does not defeat the cache
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_uncovered_preferred_source_uses_cache() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;

    let mut config = test_config(&server.uri());
    config.sources = vec![SourceKind::Aemet, SourceKind::OpenMeteo];
    config.upstream.aemet_api_key = Some("aemet-key".into());

    let pool = test_pool().await;
    let app = build_test_app(pool.clone(), config, None);

    // Paris is outside every AEMET municipality.
    let uri = "/api/weather/48.8566,2.3522?name=Casa&source=aemet";
    for _ in 0..3 {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["source"], "open-meteo");
    }

    assert_eq!(WeatherCacheRepo::count(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Test: A preferred source refetches a report cached from another provider
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_preferred_source_replaces_cached_report() {
    let server = MockServer::start().await;
    mount_weather(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("key", "wa-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weatherapi_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.sources = vec![SourceKind::OpenMeteo, SourceKind::WeatherApi];
    config.upstream.weatherapi_key = Some("wa-key".into());

    let pool = test_pool().await;
    let app = build_test_app(pool.clone(), config, None);

    let first = body_json(get(&app, "/api/weather/40.4168,-3.7038?name=Casa").await).await;
    assert_eq!(first["source"], "open-meteo");

    let uri = "/api/weather/40.4168,-3.7038?name=Casa&source=weatherapi";
    let second = body_json(get(&app, uri).await).await;
    assert_eq!(second["source"], "weatherapi");
    assert_eq!(second["current"]["temp"], 18);

    // Now cached under the preferred provider.
    let third = body_json(get(&app, uri).await).await;
    assert_eq!(third, second);

    let cached = WeatherCacheRepo::find(&pool, "40.4168,-3.7038").await.unwrap().unwrap();
    assert_eq!(cached.source, "weatherapi");
    assert_eq!(WeatherCacheRepo::count(&pool).await.unwrap(), 1);
}
