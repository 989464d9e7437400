//! Delivery of payload-less Web Push messages.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::PushError;
use crate::vapid::VapidSigner;

/// HTTP request timeout for a single push.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Seconds the push service keeps an undelivered message. Rain warnings
/// are stale after one check interval.
pub const DEFAULT_TTL_SECS: u32 = 900;

/// Something that can wake a subscriber's service worker.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn notify(&self, endpoint: &str) -> Result<(), PushError>;
}

/// Sends VAPID-authenticated pushes over HTTP.
pub struct PushSender {
    client: reqwest::Client,
    signer: Arc<VapidSigner>,
    ttl_secs: u32,
}

impl PushSender {
    pub fn new(signer: Arc<VapidSigner>) -> Result<Self, PushError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            signer,
            ttl_secs: DEFAULT_TTL_SECS,
        })
    }

    pub fn with_ttl(mut self, ttl_secs: u32) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

#[async_trait]
impl PushTransport for PushSender {
    async fn notify(&self, endpoint: &str) -> Result<(), PushError> {
        let authorization = self.signer.authorization(endpoint, Utc::now())?;

        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header("TTL", self.ttl_secs.to_string())
            .header("Urgency", "high")
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status.as_u16() {
            code @ (404 | 410) => Err(PushError::Gone(code)),
            code => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                Err(PushError::Rejected { status: code, body })
            }
        }
    }
}
