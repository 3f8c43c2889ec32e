//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use std::time::Duration;
use tessera_config::RedisConfig;
use tessera_core::{HealthCheck, HealthStatus, TesseraError, TesseraResult};
use tracing::{debug, info};

/// Redis-based cache service.
///
/// Without a pool the service is a no-op cache: every lookup misses and
/// every write succeeds without storing anything.
#[derive(Clone)]
pub struct RedisCacheService {
    pool: Option<Pool>,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op cache service (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    async fn get_conn(&self) -> TesseraResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                TesseraError::Cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(TesseraError::Cache("Cache is disabled".to_string())),
        }
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> TesseraResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            TesseraError::Cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> TesseraResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await.map_err(|e| {
            TesseraError::Cache(format!("Failed to set key '{}': {}", key, e))
        })?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> TesseraResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            TesseraError::Cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }
}

#[async_trait]
impl HealthCheck for RedisCacheService {
    fn name(&self) -> &str {
        "cache"
    }

    /// The service keeps working without its cache, so a broken cache is
    /// `Degraded` and never `Unhealthy`.
    async fn check(&self) -> HealthStatus {
        if !self.is_enabled() {
            return HealthStatus::Degraded("Cache is disabled".to_string());
        }

        let mut conn = match self.get_conn().await {
            Ok(conn) => conn,
            Err(e) => return HealthStatus::Degraded(e.to_string()),
        };

        let pong: Result<String, _> = deadpool_redis::redis::cmd("PING")
            .query_async(&mut conn)
            .await;

        match pong {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Degraded(format!("PING failed: {}", e)),
        }
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Creates a Redis connection pool, or `None` when Redis is disabled.
///
/// Connections are opened lazily, so an unreachable Redis does not stop the
/// process from starting.
pub fn create_redis_pool(config: &RedisConfig) -> TesseraResult<Option<Pool>> {
    if !config.enabled {
        info!("Redis cache disabled");
        return Ok(None);
    }

    info!("Creating Redis connection pool...");

    let pool = Config::from_url(&config.url)
        .builder()
        .map_err(|e| TesseraError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .wait_timeout(Some(config.connect_timeout()))
        .create_timeout(Some(config.connect_timeout()))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| TesseraError::Cache(format!("Failed to create Redis pool: {}", e)))?;

    info!("Redis connection pool created (max size {})", config.pool_size);
    Ok(Some(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache_is_a_no_op() {
        let cache = RedisCacheService::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.get_raw("all_users").await.unwrap(), None);
        cache
            .set_raw("all_users", "[]", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(!cache.delete("all_users").await.unwrap());
    }

    #[tokio::test]
    async fn test_disabled_cache_reports_degraded() {
        let cache = RedisCacheService::disabled();
        assert!(matches!(cache.check().await, HealthStatus::Degraded(_)));
        assert_eq!(cache.name(), "cache");
    }

    #[test]
    fn test_create_pool_disabled_returns_none() {
        let config = RedisConfig {
            enabled: false,
            ..RedisConfig::default()
        };
        assert!(create_redis_pool(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_pool_is_lazy() {
        let pool = create_redis_pool(&RedisConfig::default()).unwrap();
        assert!(pool.is_some());
    }
}
