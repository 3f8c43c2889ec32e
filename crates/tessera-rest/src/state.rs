//! Application state for Axum handlers.

use std::sync::Arc;
use tessera_core::HealthCheck;
use tessera_service::UserService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    /// Components consulted by the readiness check.
    pub health_checks: Arc<Vec<Arc<dyn HealthCheck>>>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(user_service: Arc<dyn UserService>, health_checks: Vec<Arc<dyn HealthCheck>>) -> Self {
        Self {
            user_service,
            health_checks: Arc::new(health_checks),
        }
    }
}
