//! Main application router.

use crate::{
    controllers::{health_controller, home_controller, user_controller},
    middleware::{
        basic_auth_middleware, logging_middleware, metrics_middleware, rate_limit_middleware,
        BasicAuthState, ClientRateLimiter,
    },
    openapi::ApiDoc,
    responses::AppError,
    state::AppState,
};
use axum::{middleware, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tessera_config::{AppConfig, ServerConfig};
use tessera_core::TesseraError;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;

/// Optional pieces of the router that depend on process-wide setup.
#[derive(Clone, Default)]
pub struct RouterExtras {
    /// Prometheus handle backing the metrics endpoint.
    pub metrics: Option<PrometheusHandle>,
    /// Shared per-IP limiter. Built from config when absent.
    pub rate_limiter: Option<ClientRateLimiter>,
}

/// Creates the main application router.
///
/// Layers are listed innermost first.
pub fn create_router(state: AppState, config: &AppConfig, extras: RouterExtras) -> Router {
    let mut users = user_controller::router();
    if config.security.basic_auth_enabled {
        users = users.route_layer(middleware::from_fn_with_state(
            BasicAuthState::from_config(&config.security),
            basic_auth_middleware,
        ));
    }

    let mut router = Router::new()
        .merge(home_controller::router())
        .merge(health_controller::router())
        .nest("/users", users)
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(not_found)
        .with_state(state);

    if let Some(handle) = extras.metrics.filter(|_| config.observability.metrics_enabled) {
        router = router.route(
            &config.observability.metrics_path,
            get(move || std::future::ready(handle.render())),
        );
    }

    if config.rate_limit.enabled {
        let limiter = extras
            .rate_limiter
            .unwrap_or_else(|| ClientRateLimiter::per_minute(config.rate_limit.requests_per_minute));
        router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    // Rejected and timed-out requests are still logged and counted.
    let router = router
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(create_cors_layer(&config.server))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    info!("Router created with REST endpoints and OpenAPI at /api-docs/openapi.json");
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }

    if server_config.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<_> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> AppError {
    AppError(TesseraError::not_found("Route", "requested path"))
}
