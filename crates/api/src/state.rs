use std::sync::Arc;

use aeris_push::VapidSigner;
use aeris_upstream::air_quality::AirQualityClient;
use aeris_upstream::geocoding::Geocoder;
use aeris_upstream::SourceChain;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: aeris_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Forward and reverse geocoding.
    pub geocoder: Arc<Geocoder>,
    /// Forecast providers in fallback order.
    pub sources: SourceChain,
    /// Air quality and pollen.
    pub air: Arc<AirQualityClient>,
    /// VAPID signer; `None` when push is not configured.
    pub vapid: Option<Arc<VapidSigner>>,
}

impl AppState {
    /// Wire the upstream clients from `config`, sharing one HTTP client.
    pub fn new(
        pool: aeris_db::DbPool,
        config: ServerConfig,
        http: reqwest::Client,
        vapid: Option<Arc<VapidSigner>>,
    ) -> Self {
        let geocoder = Arc::new(Geocoder::new(http.clone(), &config.upstream));
        let sources = SourceChain::from_config(&http, &config.upstream, &config.sources);
        let air = Arc::new(AirQualityClient::new(http, &config.upstream));

        Self {
            pool,
            config: Arc::new(config),
            geocoder,
            sources,
            air,
            vapid,
        }
    }
}
