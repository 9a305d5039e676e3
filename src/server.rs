//! HTTP server initialization and runtime setup.
//!
//! Wires the database pool, Redis, the click worker, and the Axum server
//! lifecycle together.

use crate::application::services::RedirectService;
use crate::config::Config;
use crate::domain::click_producer::ClickProducer;
use crate::domain::click_worker::{ClickWorker, WorkerConfig};
use crate::infrastructure::cache::{CacheService, ClickStream, RedisCache};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use crate::metrics;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Budget for the startup database connection check.
const STORE_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the HTTP server with the given configuration.
///
/// Startup is fail-fast: an unreachable database or Redis aborts the process
/// before the listener binds, so a booted instance is a working instance.
///
/// # Shutdown
///
/// On `SIGTERM` / Ctrl-C the server stops accepting connections and waits
/// for in-flight requests. The click worker is then signalled to stop and
/// drains its buffer to the store before the process exits.
///
/// # Errors
///
/// Returns an error if the database connection, migration, Redis connection,
/// consumer-group creation, or server bind fails.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_open_conns)
        // sqlx has no max-idle knob; keeping this many connections warm is
        // the closest equivalent.
        .min_connections(config.db_max_idle_conns.min(config.db_max_open_conns))
        .acquire_timeout(STORE_PING_TIMEOUT)
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let cache = Arc::new(
        RedisCache::connect(
            &config.redis_addr,
            &config.redis_key_prefix,
            config.negative_cache_ttl,
            config.redis_dial_timeout,
            config.redis_rw_timeout,
        )
        .await?,
    );

    let metrics_handle = metrics::install_recorder()?;

    let pool = Arc::new(pool);
    let links = Arc::new(PgLinkRepository::new(pool.clone()));
    let clicks = Arc::new(PgClickRepository::new(pool.clone()));

    let worker = ClickWorker::start(
        cache.clone() as Arc<dyn ClickStream>,
        clicks,
        WorkerConfig {
            stream_name: config.stream_name.clone(),
            group: config.stream_group.clone(),
            consumer: "worker-1".to_string(),
            batch_size: config.worker_batch_size,
            flush_interval: config.worker_flush_interval,
        },
    )
    .await?;
    tracing::info!("Click worker started");

    let redirects = Arc::new(RedirectService::new(
        cache.clone() as Arc<dyn CacheService>,
        links,
    ));
    let producer = ClickProducer::new(cache as Arc<dyn ClickStream>, config.stream_name.clone());

    let state = AppState::new(
        redirects,
        producer,
        config.redirect_status_code,
        config.behind_proxy,
    );
    let app = app_router(state, metrics_handle);

    let addr: SocketAddr = config.http_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("HTTP server stopped, draining click worker...");
    worker.shutdown().await;
    tracing::info!("Click worker stopped, shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C (all platforms) or SIGTERM (Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
