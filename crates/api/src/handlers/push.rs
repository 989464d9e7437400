//! Handlers for Web Push subscriptions.
//!
//! Every endpoint answers 503 while VAPID keys are not configured, since a
//! stored subscription could never be notified.

use std::sync::Arc;

use aeris_core::error::CoreError;
use aeris_core::types::Timestamp;
use aeris_db::models::subscription::{CreateSubscription, Subscription};
use aeris_db::repositories::SubscriptionRepo;
use aeris_push::vapid::audience;
use aeris_push::VapidSigner;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// `PushSubscription.toJSON()` plus the position to watch.
#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(url)]
    pub endpoint: String,
    #[validate(nested)]
    pub keys: SubscriptionKeys,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    #[validate(length(max = 120))]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubscriptionKeys {
    #[validate(length(min = 1))]
    pub p256dh: String,
    #[validate(length(min = 1))]
    pub auth: String,
}

#[derive(Debug, Deserialize)]
pub struct EndpointRequest {
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct PublicKeyResponse {
    pub public_key: String,
}

/// What the client sees of its stored subscription.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub endpoint: String,
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
    pub created_at: Timestamp,
}

impl From<Subscription> for SubscriptionView {
    fn from(s: Subscription) -> Self {
        Self {
            endpoint: s.endpoint,
            lat: s.lat,
            lon: s.lon,
            city: s.city,
            created_at: s.created_at,
        }
    }
}

/// The message behind the last payload-less push.
#[derive(Debug, Serialize)]
pub struct LatestMessage {
    pub message: Option<String>,
    pub sent_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_push(state: &AppState) -> AppResult<&Arc<VapidSigner>> {
    state
        .vapid
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("Push notifications are not configured".into()))
}

fn subscription_not_found(endpoint: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Subscription",
        id: endpoint.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/push/public-key
pub async fn public_key(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PublicKeyResponse>>> {
    let signer = require_push(&state)?;
    Ok(Json(DataResponse {
        data: PublicKeyResponse {
            public_key: signer.public_key().to_string(),
        },
    }))
}

/// POST /api/push/subscribe
///
/// Re-subscribing the same endpoint updates keys and position but keeps
/// the notification history, so the throttle survives a refresh.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(input): Json<SubscribeRequest>,
) -> AppResult<impl IntoResponse> {
    require_push(&state)?;
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    audience(&input.endpoint).map_err(|e| CoreError::Validation(e.to_string()))?;

    let create = CreateSubscription {
        endpoint: input.endpoint,
        p256dh: input.keys.p256dh,
        auth: input.keys.auth,
        lat: input.lat,
        lon: input.lon,
        city: input.city.filter(|c| !c.trim().is_empty()),
    };
    let subscription = SubscriptionRepo::upsert(&state.pool, &create, Utc::now()).await?;
    tracing::info!(city = ?subscription.city, "Push subscription stored");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubscriptionView::from(subscription),
        }),
    ))
}

/// POST /api/push/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(input): Json<EndpointRequest>,
) -> AppResult<StatusCode> {
    require_push(&state)?;
    if !SubscriptionRepo::delete(&state.pool, &input.endpoint).await? {
        return Err(subscription_not_found(&input.endpoint));
    }
    tracing::info!("Push subscription removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/push/latest?endpoint
///
/// Called by the service worker when a push arrives.
pub async fn latest(
    State(state): State<AppState>,
    Query(input): Query<EndpointRequest>,
) -> AppResult<Json<DataResponse<LatestMessage>>> {
    require_push(&state)?;
    let subscription = SubscriptionRepo::find(&state.pool, &input.endpoint)
        .await?
        .ok_or_else(|| subscription_not_found(&input.endpoint))?;

    Ok(Json(DataResponse {
        data: LatestMessage {
            message: subscription.last_message,
            sent_at: subscription.last_notification,
        },
    }))
}
