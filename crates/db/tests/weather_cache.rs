//! Integration tests for `WeatherCacheRepo`.

use aeris_db::repositories::WeatherCacheRepo;
use chrono::{Duration, TimeZone, Utc};
use sqlx::SqlitePool;

fn t(hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_then_find(pool: SqlitePool) {
    aeris_db::health_check(&pool).await.unwrap();

    let entry = WeatherCacheRepo::upsert(&pool, "28079", r#"{"a":1}"#, "open-meteo", t(10))
        .await
        .unwrap();
    assert_eq!(entry.location_id, "28079");
    assert_eq!(entry.updated_at, t(10));

    let found = WeatherCacheRepo::find(&pool, "28079").await.unwrap().unwrap();
    assert_eq!(found.data, r#"{"a":1}"#);
    assert_eq!(found.source, "open-meteo");

    assert!(WeatherCacheRepo::find(&pool, "08019").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_replaces_existing_row(pool: SqlitePool) {
    WeatherCacheRepo::upsert(&pool, "40.4168,-3.7038", "{}", "open-meteo", t(10))
        .await
        .unwrap();
    WeatherCacheRepo::upsert(&pool, "40.4168,-3.7038", r#"{"v":2}"#, "aemet", t(11))
        .await
        .unwrap();

    assert_eq!(WeatherCacheRepo::count(&pool).await.unwrap(), 1);
    let found = WeatherCacheRepo::find(&pool, "40.4168,-3.7038")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.source, "aemet");
    assert_eq!(found.updated_at, t(11));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_fresh_respects_cutoff(pool: SqlitePool) {
    WeatherCacheRepo::upsert(&pool, "28079", "{}", "open-meteo", t(10))
        .await
        .unwrap();

    let ttl = Duration::minutes(5);
    let fresh = WeatherCacheRepo::find_fresh(&pool, "28079", ttl, t(10) + Duration::minutes(4))
        .await
        .unwrap();
    assert!(fresh.is_some());

    let stale = WeatherCacheRepo::find_fresh(&pool, "28079", ttl, t(10) + Duration::minutes(5))
        .await
        .unwrap();
    assert!(stale.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_older_than(pool: SqlitePool) {
    WeatherCacheRepo::upsert(&pool, "old", "{}", "open-meteo", t(1)).await.unwrap();
    WeatherCacheRepo::upsert(&pool, "new", "{}", "open-meteo", t(20)).await.unwrap();

    let removed = WeatherCacheRepo::delete_older_than(&pool, t(12)).await.unwrap();
    assert_eq!(removed, 1);
    assert!(WeatherCacheRepo::find(&pool, "old").await.unwrap().is_none());
    assert!(WeatherCacheRepo::find(&pool, "new").await.unwrap().is_some());
}
