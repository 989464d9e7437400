//! Repository for the `weather_cache` table.

use aeris_core::types::Timestamp;
use chrono::Duration;
use sqlx::SqlitePool;

use crate::models::weather_cache::WeatherCacheEntry;

/// Column list for `weather_cache` SELECT queries.
const COLUMNS: &str = "location_id, data, source, updated_at";

/// Provides query operations for cached weather reports.
pub struct WeatherCacheRepo;

impl WeatherCacheRepo {
    /// Look up the cached report for a location, regardless of age.
    pub async fn find(
        pool: &SqlitePool,
        location_id: &str,
    ) -> Result<Option<WeatherCacheEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM weather_cache WHERE location_id = ?");
        sqlx::query_as::<_, WeatherCacheEntry>(&query)
            .bind(location_id)
            .fetch_optional(pool)
            .await
    }

    /// Look up the cached report for a location if it is younger than `ttl`.
    pub async fn find_fresh(
        pool: &SqlitePool,
        location_id: &str,
        ttl: Duration,
        now: Timestamp,
    ) -> Result<Option<WeatherCacheEntry>, sqlx::Error> {
        let since = now - ttl;
        let query = format!(
            "SELECT {COLUMNS} FROM weather_cache \
             WHERE location_id = ? AND updated_at > ?"
        );
        sqlx::query_as::<_, WeatherCacheEntry>(&query)
            .bind(location_id)
            .bind(since)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the report for a location.
    pub async fn upsert(
        pool: &SqlitePool,
        location_id: &str,
        data: &str,
        source: &str,
        updated_at: Timestamp,
    ) -> Result<WeatherCacheEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO weather_cache (location_id, data, source, updated_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (location_id) DO UPDATE SET \
                 data = excluded.data, \
                 source = excluded.source, \
                 updated_at = excluded.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WeatherCacheEntry>(&query)
            .bind(location_id)
            .bind(data)
            .bind(source)
            .bind(updated_at)
            .fetch_one(pool)
            .await
    }

    /// Delete entries last updated before `cutoff`. Returns the number removed.
    pub async fn delete_older_than(
        pool: &SqlitePool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM weather_cache WHERE updated_at < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM weather_cache")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
