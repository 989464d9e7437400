//! Errors from push delivery.

use aeris_upstream::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The HTTP request to the push service failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The push service no longer knows the subscription (404/410).
    #[error("Subscription expired (HTTP {0})")]
    Gone(u16),

    /// The push service refused the message.
    #[error("Push service returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid push endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("VAPID signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid VAPID configuration: {0}")]
    Config(String),

    #[error("Nowcast unavailable: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
