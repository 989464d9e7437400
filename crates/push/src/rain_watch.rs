//! Periodic rain check for push subscribers.
//!
//! [`RainWatch`] runs as a background task. Every interval it walks the
//! subscriptions, fetches the 15-minute precipitation nowcast for each one
//! and wakes the subscriber when rain is imminent, at most once per
//! cooldown window.

use std::sync::Arc;
use std::time::Duration;

use aeris_core::rain::{rain_message, should_notify, upcoming_rain};
use aeris_core::types::{GeoPoint, Timestamp};
use aeris_db::models::subscription::Subscription;
use aeris_db::repositories::SubscriptionRepo;
use aeris_db::DbPool;
use aeris_upstream::open_meteo::{NowcastSeries, OpenMeteoSource};
use aeris_upstream::UpstreamError;
use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::error::PushError;
use crate::sender::PushTransport;

/// Source of short-range precipitation forecasts.
#[async_trait]
pub trait NowcastProvider: Send + Sync {
    async fn nowcast(&self, point: GeoPoint) -> Result<NowcastSeries, UpstreamError>;
}

#[async_trait]
impl NowcastProvider for OpenMeteoSource {
    async fn nowcast(&self, point: GeoPoint) -> Result<NowcastSeries, UpstreamError> {
        self.fetch_nowcast(point).await
    }
}

#[derive(Debug, Clone)]
pub struct RainWatchConfig {
    /// Time between two passes over all subscriptions.
    pub interval: Duration,
    /// Minimum time between two notifications to the same subscriber.
    pub cooldown: chrono::Duration,
    /// How far ahead the nowcast is searched for rain.
    pub horizon: chrono::Duration,
}

impl Default for RainWatchConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(900),
            cooldown: chrono::Duration::hours(1),
            horizon: chrono::Duration::minutes(60),
        }
    }
}

/// What happened to one subscription during a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Notified too recently.
    Throttled,
    /// No rain within the horizon.
    Dry,
    /// A push was sent with this message.
    Notified(String),
    /// The push service reported the subscription gone; it was deleted.
    Removed,
}

/// Totals for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub checked: usize,
    pub notified: usize,
    pub throttled: usize,
    pub removed: usize,
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// RainWatch
// ---------------------------------------------------------------------------

/// Background service notifying subscribers of imminent rain.
pub struct RainWatch {
    pool: DbPool,
    nowcast: Arc<dyn NowcastProvider>,
    transport: Arc<dyn PushTransport>,
    config: RainWatchConfig,
}

impl RainWatch {
    pub fn new(
        pool: DbPool,
        nowcast: Arc<dyn NowcastProvider>,
        transport: Arc<dyn PushTransport>,
        config: RainWatchConfig,
    ) -> Self {
        Self {
            pool,
            nowcast,
            transport,
            config,
        }
    }

    /// Run the rain watch loop.
    ///
    /// The first pass runs immediately. The loop exits gracefully when the
    /// provided [`CancellationToken`] is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            cooldown_secs = self.config.cooldown.num_seconds(),
            "Rain watch started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Rain watch cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.run_pass(Utc::now()).await {
                        Ok(summary) if summary.checked > 0 => {
                            tracing::info!(
                                checked = summary.checked,
                                notified = summary.notified,
                                throttled = summary.throttled,
                                removed = summary.removed,
                                failed = summary.failed,
                                "Rain watch pass complete"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "Rain watch pass failed"),
                    }
                }
            }
        }
    }

    /// Check every subscription once.
    pub async fn run_pass(&self, now: Timestamp) -> Result<PassSummary, sqlx::Error> {
        let subscriptions = SubscriptionRepo::list_all(&self.pool).await?;
        let mut summary = PassSummary::default();

        for subscription in &subscriptions {
            summary.checked += 1;
            match self.check(subscription, now).await {
                Ok(CheckOutcome::Throttled) => summary.throttled += 1,
                Ok(CheckOutcome::Dry) => {}
                Ok(CheckOutcome::Notified(_)) => summary.notified += 1,
                Ok(CheckOutcome::Removed) => summary.removed += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        endpoint = %subscription.endpoint,
                        error = %e,
                        "Rain check failed for subscription"
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Check a single subscription.
    ///
    /// The message is recorded before the push goes out so the service
    /// worker finds it when it wakes up; a failed attempt still counts
    /// towards the cooldown.
    pub async fn check(
        &self,
        subscription: &Subscription,
        now: Timestamp,
    ) -> Result<CheckOutcome, PushError> {
        if !should_notify(subscription.last_notification, now, self.config.cooldown) {
            return Ok(CheckOutcome::Throttled);
        }

        let series = self.nowcast.nowcast(subscription.point()).await?;
        let Some(outlook) = upcoming_rain(series.now, &series.samples, self.config.horizon) else {
            return Ok(CheckOutcome::Dry);
        };

        let message = rain_message(subscription.city.as_deref(), &outlook);
        SubscriptionRepo::mark_notified(&self.pool, &subscription.endpoint, now, &message).await?;

        match self.transport.notify(&subscription.endpoint).await {
            Ok(()) => {
                tracing::debug!(endpoint = %subscription.endpoint, %message, "Rain notification sent");
                Ok(CheckOutcome::Notified(message))
            }
            Err(PushError::Gone(status)) => {
                SubscriptionRepo::delete(&self.pool, &subscription.endpoint).await?;
                tracing::info!(endpoint = %subscription.endpoint, status, "Removed expired subscription");
                Ok(CheckOutcome::Removed)
            }
            Err(e) => Err(e),
        }
    }
}
