//! Web Push subscription rows and DTOs.

use aeris_core::types::{GeoPoint, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
    pub last_notification: Option<Timestamp>,
    pub last_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// DTO for registering (or refreshing) a subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
}
