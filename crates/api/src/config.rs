use std::path::PathBuf;
use std::time::Duration;

use aeris_core::source::{parse_source_list, SourceKind};
use aeris_push::{PushError, VapidSigner};
use aeris_upstream::UpstreamConfig;

/// Bounds for the weather cache freshness window, in seconds.
pub const MIN_CACHE_TTL_SECS: u64 = 300;
pub const MAX_CACHE_TTL_SECS: u64 = 1800;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite URL (default: `sqlite://aeris.db`).
    pub database_url: String,
    /// Directory holding the front-end, served for every unmatched path.
    pub static_dir: PathBuf,
    /// Weather cache freshness window, clamped to 5–30 minutes.
    pub cache_ttl_secs: u64,
    /// Cache rows older than this are purged (default: `24`).
    pub cache_retention_hours: i64,
    /// Forecast providers in fallback order.
    pub sources: Vec<SourceKind>,
    /// Upstream URLs, keys and timeouts.
    pub upstream: UpstreamConfig,
    /// Web Push settings; `None` disables push.
    pub push: Option<PushConfig>,
    /// Seconds between rain watch passes (default: `900`).
    pub rain_check_interval_secs: u64,
    /// Minimum seconds between two notifications to one subscriber (default: `3600`).
    pub notify_cooldown_secs: i64,
}

/// VAPID key material for Web Push.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// PKCS#8 PEM file with the P-256 private key.
    pub private_key_path: PathBuf,
    /// Uncompressed public key, base64url.
    pub public_key: String,
    /// `mailto:` or `https:` contact.
    pub subject: String,
}

impl PushConfig {
    /// Read the private key and build a signer.
    pub fn load_signer(&self) -> Result<VapidSigner, PushError> {
        let pem = std::fs::read(&self.private_key_path).map_err(|e| {
            PushError::Config(format!(
                "cannot read {}: {e}",
                self.private_key_path.display()
            ))
        })?;
        VapidSigner::from_pem(&pem, self.public_key.clone(), self.subject.clone())
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                          |
    /// |----------------------------|----------------------------------|
    /// | `HOST`                     | `0.0.0.0`                        |
    /// | `PORT`                     | `3000`                           |
    /// | `CORS_ORIGINS`             | `http://localhost:3000`          |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                             |
    /// | `DATABASE_URL`             | `sqlite://aeris.db`              |
    /// | `STATIC_DIR`               | `public`                         |
    /// | `CACHE_TTL_SECS`           | `300` (clamped to 300–1800)      |
    /// | `CACHE_RETENTION_HOURS`    | `24`                             |
    /// | `WEATHER_SOURCES`          | `open-meteo,aemet,weatherapi`    |
    /// | `AEMET_API_KEY`            | unset (AEMET disabled)           |
    /// | `WEATHERAPI_KEY`           | unset (WeatherAPI disabled)      |
    /// | `UPSTREAM_TIMEOUT_SECS`    | `10`                             |
    /// | `GEOCODING_LANGUAGE`       | `es`                             |
    /// | `VAPID_PRIVATE_KEY_PATH`   | unset (push disabled)            |
    /// | `VAPID_PUBLIC_KEY`         | unset (push disabled)            |
    /// | `VAPID_SUBJECT`            | unset (push disabled)            |
    /// | `RAIN_CHECK_INTERVAL_SECS` | `900`                            |
    /// | `NOTIFY_COOLDOWN_SECS`     | `3600`                           |
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable does not parse or `WEATHER_SOURCES`
    /// names an unknown provider.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://aeris.db".into());

        let static_dir = std::env::var("STATIC_DIR")
            .unwrap_or_else(|_| "public".into())
            .into();

        let requested_ttl: u64 = std::env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| MIN_CACHE_TTL_SECS.to_string())
            .parse()
            .expect("CACHE_TTL_SECS must be a valid u64");
        let cache_ttl_secs = clamp_cache_ttl(requested_ttl);
        if cache_ttl_secs != requested_ttl {
            tracing::warn!(requested_ttl, cache_ttl_secs, "CACHE_TTL_SECS out of range, clamped");
        }

        let cache_retention_hours: i64 = std::env::var("CACHE_RETENTION_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("CACHE_RETENTION_HOURS must be a valid i64");

        let sources = parse_source_list(
            &std::env::var("WEATHER_SOURCES")
                .unwrap_or_else(|_| "open-meteo,aemet,weatherapi".into()),
        )
        .unwrap_or_else(|e| panic!("Invalid WEATHER_SOURCES: {e}"));

        let upstream_timeout_secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("UPSTREAM_TIMEOUT_SECS must be a valid u64");

        let upstream = UpstreamConfig {
            aemet_api_key: non_empty_var("AEMET_API_KEY"),
            weatherapi_key: non_empty_var("WEATHERAPI_KEY"),
            language: std::env::var("GEOCODING_LANGUAGE").unwrap_or_else(|_| "es".into()),
            timeout: Duration::from_secs(upstream_timeout_secs),
            ..UpstreamConfig::default()
        };

        let push = match (
            non_empty_var("VAPID_PRIVATE_KEY_PATH"),
            non_empty_var("VAPID_PUBLIC_KEY"),
            non_empty_var("VAPID_SUBJECT"),
        ) {
            (Some(path), Some(public_key), Some(subject)) => Some(PushConfig {
                private_key_path: path.into(),
                public_key,
                subject,
            }),
            (None, None, None) => None,
            _ => {
                tracing::warn!("Incomplete VAPID configuration, push notifications disabled");
                None
            }
        };

        let rain_check_interval_secs = positive_secs(
            "RAIN_CHECK_INTERVAL_SECS",
            std::env::var("RAIN_CHECK_INTERVAL_SECS")
                .unwrap_or_else(|_| "900".into())
                .parse()
                .expect("RAIN_CHECK_INTERVAL_SECS must be a valid u64"),
        );

        let notify_cooldown_secs: i64 = std::env::var("NOTIFY_COOLDOWN_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("NOTIFY_COOLDOWN_SECS must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            static_dir,
            cache_ttl_secs,
            cache_retention_hours,
            sources,
            upstream,
            push,
            rain_check_interval_secs,
            notify_cooldown_secs,
        }
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs as i64)
    }
}

pub fn clamp_cache_ttl(secs: u64) -> u64 {
    secs.clamp(MIN_CACHE_TTL_SECS, MAX_CACHE_TTL_SECS)
}

/// Periodic tasks cannot tick every zero seconds.
fn positive_secs(name: &str, secs: u64) -> u64 {
    if secs == 0 {
        panic!("{name} must be greater than zero");
    }
    secs
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_ttl_is_clamped() {
        assert_eq!(clamp_cache_ttl(60), 300);
        assert_eq!(clamp_cache_ttl(600), 600);
        assert_eq!(clamp_cache_ttl(7200), 1800);
    }

    #[test]
    fn positive_secs_passes_through() {
        assert_eq!(positive_secs("RAIN_CHECK_INTERVAL_SECS", 900), 900);
    }

    #[test]
    #[should_panic(expected = "RAIN_CHECK_INTERVAL_SECS must be greater than zero")]
    fn zero_interval_is_rejected() {
        positive_secs("RAIN_CHECK_INTERVAL_SECS", 0);
    }

    #[test]
    fn missing_key_file_is_a_config_error() {
        let push = PushConfig {
            private_key_path: "/nonexistent/vapid.pem".into(),
            public_key: "BKey".into(),
            subject: "mailto:ops@aeris.test".into(),
        };
        assert!(matches!(push.load_signer(), Err(PushError::Config(_))));
    }
}
