//! Repository for the `subscriptions` table.

use aeris_core::types::Timestamp;
use sqlx::SqlitePool;

use crate::models::subscription::{CreateSubscription, Subscription};

/// Column list for `subscriptions` SELECT queries.
const COLUMNS: &str = "\
    endpoint, p256dh, auth, lat, lon, city, \
    last_notification, last_message, created_at, updated_at";

/// Provides query operations for Web Push subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Register a subscription, or refresh keys and position of an existing
    /// one. Notification history survives a refresh.
    pub async fn upsert(
        pool: &SqlitePool,
        input: &CreateSubscription,
        now: Timestamp,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions \
                 (endpoint, p256dh, auth, lat, lon, city, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (endpoint) DO UPDATE SET \
                 p256dh = excluded.p256dh, \
                 auth = excluded.auth, \
                 lat = excluded.lat, \
                 lon = excluded.lon, \
                 city = excluded.city, \
                 updated_at = excluded.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(&input.endpoint)
            .bind(&input.p256dh)
            .bind(&input.auth)
            .bind(input.lat)
            .bind(input.lon)
            .bind(&input.city)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &SqlitePool,
        endpoint: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE endpoint = ?");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(endpoint)
            .fetch_optional(pool)
            .await
    }

    /// All subscriptions, oldest first.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions ORDER BY created_at, endpoint");
        sqlx::query_as::<_, Subscription>(&query)
            .fetch_all(pool)
            .await
    }

    /// Remove a subscription. Returns `true` if a row was deleted.
    pub async fn delete(pool: &SqlitePool, endpoint: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE endpoint = ?")
            .bind(endpoint)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record that a notification was sent. Returns `false` if the
    /// subscription no longer exists.
    pub async fn mark_notified(
        pool: &SqlitePool,
        endpoint: &str,
        at: Timestamp,
        message: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions \
             SET last_notification = ?, last_message = ?, updated_at = ? \
             WHERE endpoint = ?",
        )
        .bind(at)
        .bind(message)
        .bind(at)
        .bind(endpoint)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
