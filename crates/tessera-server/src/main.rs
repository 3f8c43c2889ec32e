//! # Tessera Server
//!
//! Main entry point. Loads configuration, wires the services and serves the
//! REST API until Ctrl+C or SIGTERM.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use tessera_config::{AppConfig, ConfigLoader, ObservabilityConfig};
use tessera_core::{TesseraError, TesseraResult};
use tessera_repository::create_pool;
use tessera_rest::{
    create_router,
    middleware::{register_http_metrics, ClientRateLimiter},
    RouterExtras,
};
use tessera_server::{di::ServiceContainer, startup};
use tessera_service::{create_redis_pool, metrics::register_metrics};
use tokio::signal;
use tracing::{debug, error, info, warn};

/// How often idle rate-limiter entries are dropped.
const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let config = match ConfigLoader::from_default_location() {
        Ok(loader) => loader.into_config(),
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.observability);
    startup::print_banner();

    info!("Starting Tessera Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> TesseraResult<()> {
    let metrics = install_metrics_recorder(&config.observability)?;

    let db_pool = create_pool(&config.database).await?;
    if config.database.run_migrations {
        db_pool.run_migrations().await?;
    }

    let cache_pool = create_redis_pool(&config.redis)?;

    let container = ServiceContainer::builder()
        .with_database_pool(db_pool.clone())
        .with_cache_pool(cache_pool)
        .build()?;

    let rate_limiter = config
        .rate_limit
        .enabled
        .then(|| ClientRateLimiter::per_minute(config.rate_limit.requests_per_minute));
    if let Some(limiter) = rate_limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                limiter.retain_recent();
                debug!(clients = limiter.tracked_clients(), "Rate limiter state swept");
            }
        });
    }

    let router = create_router(
        container.app_state(),
        &config,
        RouterExtras {
            metrics,
            rate_limiter,
        },
    );

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TesseraError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    startup::print_startup_info(
        &addr,
        config
            .observability
            .metrics_enabled
            .then_some(config.observability.metrics_path.as_str()),
    );

    let served = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| TesseraError::Internal(format!("REST server error: {}", e)));

    db_pool.close().await;
    served?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_logging(config: &ObservabilityConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

fn install_metrics_recorder(config: &ObservabilityConfig) -> TesseraResult<Option<PrometheusHandle>> {
    if !config.metrics_enabled {
        info!("Metrics disabled");
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TesseraError::Internal(format!("Failed to install metrics recorder: {}", e)))?;

    register_metrics();
    register_http_metrics();

    info!("Prometheus metrics exposed at {}", config.metrics_path);
    Ok(Some(handle))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
