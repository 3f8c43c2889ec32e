//! Dependency wiring.
//!
//! [`ServiceContainer`] owns the `Arc<dyn ...>` handles the transport layer
//! needs. It is assembled once at startup through [`ServiceContainerBuilder`]:
//!
//! ```text
//! DatabasePool ──> PgUserRepository ──┐
//!                                     ├──> UserServiceImpl
//! Option<Pool> ──> RedisCacheService ─┘
//! ```

use deadpool_redis::Pool;
use std::sync::Arc;
use tessera_core::{HealthCheck, TesseraError, TesseraResult};
use tessera_repository::{DatabasePool, PgUserRepository, UserRepository};
use tessera_rest::AppState;
use tessera_service::{CacheInterface, RedisCacheService, UserService, UserServiceImpl};
use tracing::info;

/// Resolved application services.
#[derive(Clone)]
pub struct ServiceContainer {
    user_service: Arc<dyn UserService>,
    health_checks: Vec<Arc<dyn HealthCheck>>,
}

impl ServiceContainer {
    /// Starts a new builder.
    #[must_use]
    pub fn builder() -> ServiceContainerBuilder {
        ServiceContainerBuilder::default()
    }

    /// Returns the user service.
    #[must_use]
    pub fn user_service(&self) -> Arc<dyn UserService> {
        Arc::clone(&self.user_service)
    }

    /// Returns the components checked by the readiness check.
    #[must_use]
    pub fn health_checks(&self) -> Vec<Arc<dyn HealthCheck>> {
        self.health_checks.clone()
    }

    /// Builds the handler state for the router.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        AppState::new(self.user_service(), self.health_checks())
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.health_checks.iter().map(|check| check.name()).collect();
        f.debug_struct("ServiceContainer")
            .field("health_checks", &names)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ServiceContainer`].
///
/// A database pool or an explicit repository is required. Without a Redis
/// pool the cache runs disabled.
#[derive(Default)]
pub struct ServiceContainerBuilder {
    database_pool: Option<Arc<DatabasePool>>,
    cache_pool: Option<Pool>,
    user_repository: Option<Arc<dyn UserRepository>>,
    cache: Option<Arc<dyn CacheInterface>>,
}

impl ServiceContainerBuilder {
    /// Sets the PostgreSQL pool backing the repository.
    #[must_use]
    pub fn with_database_pool(mut self, pool: Arc<DatabasePool>) -> Self {
        self.database_pool = Some(pool);
        self
    }

    /// Sets the Redis pool. `None` disables caching.
    #[must_use]
    pub fn with_cache_pool(mut self, pool: Option<Pool>) -> Self {
        self.cache_pool = pool;
        self
    }

    /// Overrides the repository.
    #[must_use]
    pub fn with_user_repository(mut self, repository: Arc<dyn UserRepository>) -> Self {
        self.user_repository = Some(repository);
        self
    }

    /// Overrides the cache. An overridden cache is not health checked.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheInterface>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Wires the services together.
    pub fn build(self) -> TesseraResult<ServiceContainer> {
        let mut health_checks: Vec<Arc<dyn HealthCheck>> = Vec::new();

        let user_repository: Arc<dyn UserRepository> = match (self.user_repository, self.database_pool) {
            (Some(repository), pool) => {
                if let Some(pool) = pool {
                    health_checks.push(pool);
                }
                repository
            }
            (None, Some(pool)) => {
                health_checks.push(pool.clone());
                Arc::new(PgUserRepository::new(pool))
            }
            (None, None) => {
                return Err(TesseraError::Configuration(
                    "a database pool or user repository is required".to_string(),
                ))
            }
        };

        let cache: Arc<dyn CacheInterface> = if let Some(cache) = self.cache {
            cache
        } else {
            let redis = Arc::new(
                self.cache_pool
                    .map_or_else(RedisCacheService::disabled, RedisCacheService::new),
            );
            health_checks.push(redis.clone());
            redis
        };

        info!(cache_enabled = cache.is_enabled(), "Service container built");

        Ok(ServiceContainer {
            user_service: Arc::new(UserServiceImpl::new(user_repository, cache)),
            health_checks,
        })
    }
}
