//! Integration tests for `RainWatch` with fake nowcast and transport.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use aeris_core::forecast::QuarterSample;
use aeris_core::types::GeoPoint;
use aeris_db::models::subscription::CreateSubscription;
use aeris_db::repositories::SubscriptionRepo;
use aeris_push::rain_watch::{CheckOutcome, PassSummary};
use aeris_push::{NowcastProvider, PushError, PushTransport, RainWatch, RainWatchConfig};
use aeris_upstream::open_meteo::NowcastSeries;
use aeris_upstream::UpstreamError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

fn local(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Rain at 10:30 everywhere north of 40°, dry elsewhere; fails at lat 0.
struct FakeNowcast;

#[async_trait]
impl NowcastProvider for FakeNowcast {
    async fn nowcast(&self, point: GeoPoint) -> Result<NowcastSeries, UpstreamError> {
        if point.lat == 0.0 {
            return Err(UpstreamError::NotCovered { service: "fake" });
        }
        let rain = if point.lat > 40.0 { 0.5 } else { 0.0 };
        Ok(NowcastSeries {
            now: local(10, 0),
            samples: vec![
                QuarterSample { time: local(10, 0), precipitation: 0.0 },
                QuarterSample { time: local(10, 15), precipitation: 0.0 },
                QuarterSample { time: local(10, 30), precipitation: rain },
            ],
        })
    }
}

#[derive(Default)]
struct FakeTransport {
    sent: Mutex<Vec<String>>,
    gone: HashSet<String>,
}

#[async_trait]
impl PushTransport for FakeTransport {
    async fn notify(&self, endpoint: &str) -> Result<(), PushError> {
        if self.gone.contains(endpoint) {
            return Err(PushError::Gone(410));
        }
        self.sent.lock().unwrap().push(endpoint.to_string());
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

async fn subscribe(pool: &SqlitePool, endpoint: &str, lat: f64, city: Option<&str>) {
    let input = CreateSubscription {
        endpoint: endpoint.to_string(),
        p256dh: "key".into(),
        auth: "auth".into(),
        lat,
        lon: -3.7,
        city: city.map(str::to_string),
    };
    SubscriptionRepo::upsert(pool, &input, now() - Duration::days(1))
        .await
        .unwrap();
}

fn watch(pool: &SqlitePool, transport: Arc<FakeTransport>) -> RainWatch {
    RainWatch::new(
        pool.clone(),
        Arc::new(FakeNowcast),
        transport,
        RainWatchConfig::default(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rain_triggers_notification_and_records_message(pool: SqlitePool) {
    subscribe(&pool, "https://push.test/wet", 40.4, Some("Madrid")).await;
    let transport = Arc::new(FakeTransport::default());

    let sub = SubscriptionRepo::find(&pool, "https://push.test/wet")
        .await
        .unwrap()
        .unwrap();
    let outcome = watch(&pool, transport.clone()).check(&sub, now()).await.unwrap();

    let expected = "Lluvia en Madrid en unos 30 minutos (0.5 mm).";
    assert_eq!(outcome, CheckOutcome::Notified(expected.to_string()));
    assert_eq!(*transport.sent.lock().unwrap(), vec!["https://push.test/wet"]);

    let stored = SubscriptionRepo::find(&pool, "https://push.test/wet")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.last_notification, Some(now()));
    assert_eq!(stored.last_message.as_deref(), Some(expected));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_pass_within_cooldown_is_throttled(pool: SqlitePool) {
    subscribe(&pool, "https://push.test/wet", 40.4, None).await;
    let transport = Arc::new(FakeTransport::default());
    let watch = watch(&pool, transport.clone());

    let first = watch.run_pass(now()).await.unwrap();
    assert_eq!(first.notified, 1);

    let second = watch.run_pass(now() + Duration::minutes(15)).await.unwrap();
    assert_eq!(
        second,
        PassSummary { checked: 1, throttled: 1, ..PassSummary::default() }
    );

    let third = watch.run_pass(now() + Duration::hours(1)).await.unwrap();
    assert_eq!(third.notified, 1);
    assert_eq!(transport.sent.lock().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dry_forecast_sends_nothing(pool: SqlitePool) {
    subscribe(&pool, "https://push.test/dry", 37.4, Some("Sevilla")).await;
    let transport = Arc::new(FakeTransport::default());

    let summary = watch(&pool, transport.clone()).run_pass(now()).await.unwrap();

    assert_eq!(summary, PassSummary { checked: 1, ..PassSummary::default() });
    assert!(transport.sent.lock().unwrap().is_empty());
    let stored = SubscriptionRepo::find(&pool, "https://push.test/dry")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_notification.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_gone_subscription_is_deleted(pool: SqlitePool) {
    subscribe(&pool, "https://push.test/gone", 40.4, None).await;
    let transport = Arc::new(FakeTransport {
        gone: HashSet::from(["https://push.test/gone".to_string()]),
        ..FakeTransport::default()
    });

    let summary = watch(&pool, transport).run_pass(now()).await.unwrap();

    assert_eq!(summary.removed, 1);
    assert_eq!(SubscriptionRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_one_failure_does_not_stop_the_pass(pool: SqlitePool) {
    subscribe(&pool, "https://push.test/broken", 0.0, None).await;
    subscribe(&pool, "https://push.test/wet", 40.4, None).await;
    let transport = Arc::new(FakeTransport::default());

    let summary = watch(&pool, transport.clone()).run_pass(now()).await.unwrap();

    assert_eq!(summary.checked, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.notified, 1);
    assert_eq!(*transport.sent.lock().unwrap(), vec!["https://push.test/wet"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_stops_on_cancel(pool: SqlitePool) {
    let watch = watch(&pool, Arc::new(FakeTransport::default()));
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();
    // Returns promptly instead of looping forever.
    watch.run(cancel).await;
}
