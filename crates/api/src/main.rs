use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aeris_api::background::cache_retention;
use aeris_api::config::ServerConfig;
use aeris_api::router::build_app_router;
use aeris_api::state::AppState;
use aeris_push::{PushSender, RainWatch, RainWatchConfig};
use aeris_upstream::open_meteo::OpenMeteoSource;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aeris_api=debug,aeris_push=debug,aeris_upstream=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        cache_ttl_secs = config.cache_ttl_secs,
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = aeris_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open database");
    tracing::info!("Database connection pool created");

    aeris_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    aeris_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Upstream clients ---
    let http = aeris_upstream::http::build_client(&config.upstream)
        .expect("Failed to build upstream HTTP client");

    // --- Web Push ---
    let vapid = config.push.as_ref().map(|push| {
        Arc::new(
            push.load_signer()
                .unwrap_or_else(|e| panic!("Invalid VAPID configuration: {e}")),
        )
    });
    if vapid.is_none() {
        tracing::info!("VAPID keys not configured, push notifications disabled");
    }

    let cancel = CancellationToken::new();

    // Spawn cache retention (purges stale weather rows hourly).
    let retention_handle = tokio::spawn(cache_retention::run(
        pool.clone(),
        config.cache_retention_hours,
        cancel.clone(),
    ));

    // Spawn rain watch (only when push is configured).
    let rain_handle = vapid.as_ref().map(|signer| {
        let sender = PushSender::new(Arc::clone(signer)).expect("Failed to build push client");
        let nowcast = OpenMeteoSource::new(http.clone(), &config.upstream);
        let watch = RainWatch::new(
            pool.clone(),
            Arc::new(nowcast),
            Arc::new(sender),
            RainWatchConfig {
                interval: Duration::from_secs(config.rain_check_interval_secs),
                cooldown: chrono::Duration::seconds(config.notify_cooldown_secs),
                ..RainWatchConfig::default()
            },
        );
        let cancel = cancel.clone();
        tokio::spawn(async move {
            watch.run(cancel).await;
        })
    });

    // --- App state ---
    let state = AppState::new(pool, config.clone(), http, vapid);
    if state.sources.is_empty() {
        tracing::warn!("No weather source available, every forecast request will fail");
    }

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    if let Some(handle) = rain_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    tracing::info!("Background jobs stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
